//! Echo 工具（测试用）

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::tools::Tool;

/// Echo 工具：回显 `text` 参数；没有 `text` 时回显第一个参数的值
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> Vec<String> {
        vec![
            "Echo text back (for testing).".to_string(),
            "Args: {\"text\": \"message\"}".to_string(),
        ]
    }

    async fn call(&self, args: Map<String, Value>) -> Result<String, String> {
        let value = args
            .get("text")
            .or_else(|| args.values().next())
            .ok_or_else(|| "echo needs one argument".to_string())?;
        Ok(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_prefers_text() {
        let mut args = Map::new();
        args.insert("a".into(), Value::from("first"));
        args.insert("text".into(), Value::from("hello"));
        assert_eq!(EchoTool.call(args).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_echo_non_string_and_empty() {
        let mut args = Map::new();
        args.insert("n".into(), Value::from(42));
        assert_eq!(EchoTool.call(args).await.unwrap(), "42");
        assert!(EchoTool.call(Map::new()).await.is_err());
    }
}
