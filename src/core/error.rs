//! Agent 错误类型
//!
//! 只有无法在本地恢复的错误才会出现在这里：后端调用失败、结构化输出无法解析、
//! 历史记录损坏（未知消息类型）、配置加载失败。缺失工具 / 工具报错不会成为 AgentError，
//! 它们在调度器内被转换为文本形式的 ToolResponse。

use thiserror::Error;

use crate::llm::LlmError;

/// 对话一轮中可能出现的致命错误；出现即中止当前轮次，已追加的消息保留
#[derive(Error, Debug)]
pub enum AgentError {
    /// 推理后端（Model pipeline）返回的错误，原样透传
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    /// 解码持久化记录时遇到无法识别的 kind：版本不匹配或数据损坏
    #[error("Unknown message kind: {0}")]
    UnknownMessageKind(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        AgentError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_is_wrapped_verbatim() {
        let err: AgentError = LlmError::Request("backend down".to_string()).into();
        assert!(matches!(err, AgentError::Llm(LlmError::Request(_))));
        assert!(err.to_string().contains("backend down"));
    }

    #[test]
    fn test_unknown_kind_display() {
        let err = AgentError::UnknownMessageKind("telepathy".to_string());
        assert_eq!(err.to_string(), "Unknown message kind: telepathy");
    }
}
