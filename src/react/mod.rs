//! 编排层：后端编码、ReAct 调用、监听器、静态提示词

pub mod encoder;
pub mod events;
pub mod loop_;
pub mod prompts;

pub use encoder::{encode_for_backend, ReasonResponse};
pub use events::{MessageListener, SendOptions, TextListener};
