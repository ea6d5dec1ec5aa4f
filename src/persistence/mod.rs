//! 持久化：历史记录的带标签 JSON 编解码与文件存储

mod codec;
mod store;

pub use codec::{decode_messages, encode_messages};
pub use store::ConversationPersistence;
