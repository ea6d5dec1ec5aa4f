//! Bee ReAct - 基于推理/行动循环的对话智能体编排器
//!
//! 模块划分：
//! - **agent**: Agent 运行时（一次 send 走完 CollectContext → ReasonAct → AnswerUser）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、Agent 构建器
//! - **llm**: 推理后端抽象（LlmClient、模型构建器、结构化输出解析、Mock）
//! - **message**: 消息模型、访问者、会话状态折叠
//! - **observability**: tracing 初始化
//! - **persistence**: 历史的 JSON 编解码与文件存储
//! - **react**: 后端编码、监听器、提示词、ReAct 步骤
//! - **skills**: 技能选择器、驻留衰减、技能目录加载
//! - **tools**: 工具注册表与执行器

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod message;
pub mod observability;
pub mod persistence;
pub mod react;
pub mod skills;
pub mod tools;

pub use agent::Agent;
pub use core::{AgentBuilder, AgentError};
pub use message::{Message, MessageVisitor, Skill};
pub use react::SendOptions;
pub use tools::{Tool, ToolRegistry};
