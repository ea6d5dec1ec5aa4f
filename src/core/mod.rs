//! 核心：错误类型与 Agent 构建器

pub mod builder;
pub mod error;

pub use builder::AgentBuilder;
pub use error::AgentError;
