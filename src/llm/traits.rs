//! LLM 客户端抽象（Model pipeline 接缝）
//!
//! 真正的模型调用由外部实现：本 crate 只依赖 LlmClient（complete 非流式 / complete_stream 流式）
//! 以及两个构建器：推理模型（ReAct + 最终回答）与技能相关性模型。

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 发送给后端的单条消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 后端错误；编排器不做重试，原样上抛
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

/// 期望的结构化输出形状（schemars 生成的 JSON Schema）
pub type ResponseShape = serde_json::Value;

/// 文本块流
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// LLM 客户端 trait：非流式完成与流式完成（返回文本块流）
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// 流式完成，返回文本块流
    async fn complete_stream(&self, messages: &[ChatMessage]) -> Result<TextStream, LlmError>;
}

/// 推理模型构建器。
///
/// `response_shape` 为 Some 时模型应返回符合该 schema 的 JSON（ReAct 步骤）；
/// 为 None 时返回自由文本（最终回答，走流式）。
pub trait ReasoningModelBuilder: Send + Sync {
    fn build_reasoning_model(&self, response_shape: Option<ResponseShape>) -> Arc<dyn LlmClient>;
}

/// 技能相关性模型构建器；未配置时选择器退化为 NoSkillSelector
pub trait SkillRelevanceModelBuilder: Send + Sync {
    fn build_skill_relevance_model(&self, response_shape: ResponseShape) -> Arc<dyn LlmClient>;
}
