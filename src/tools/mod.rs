//! 工具调度：工具 trait、有序注册表、按序执行器

pub mod echo;
pub mod executor;
pub mod registry;

pub use echo::EchoTool;
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry};
