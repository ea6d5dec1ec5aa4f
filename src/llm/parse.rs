//! 结构化输出解析：从后端文本中提取 JSON 并反序列化

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

use crate::core::AgentError;
use crate::llm::ResponseShape;

/// 提取 JSON 块（```json ... ``` 或首个 `{` 到最后一个 `}`），找不到时原样返回
pub fn extract_json_block(output: &str) -> &str {
    let trimmed = output.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim());
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// 解析结构化回复：整段能直接解析时不做提取（字符串里可能出现 ``` 或花括号），
/// 否则再尝试代码块 / 花括号提取；失败时返回 JsonParseError（携带原文便于排查）
pub fn parse_structured<T: DeserializeOwned>(output: &str) -> Result<T, AgentError> {
    let trimmed = output.trim();
    if let Ok(parsed) = serde_json::from_str(trimmed) {
        return Ok(parsed);
    }
    let json_str = extract_json_block(trimmed);
    serde_json::from_str(json_str)
        .map_err(|e| AgentError::JsonParseError(format!("{}: {}", e, json_str)))
}

/// 生成类型 T 的 JSON Schema，作为构建模型时的 response shape
pub fn response_shape<T: JsonSchema>() -> ResponseShape {
    serde_json::to_value(schema_for!(T)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Keys {
        keys: Vec<String>,
    }

    #[test]
    fn test_extract_fenced_block() {
        let out = "Sure:\n```json\n{\"keys\": [\"a\"]}\n```\nbye";
        assert_eq!(extract_json_block(out), "{\"keys\": [\"a\"]}");
    }

    #[test]
    fn test_extract_bare_object_with_prose() {
        let out = "here you go {\"keys\": []} done";
        assert_eq!(extract_json_block(out), "{\"keys\": []}");
    }

    #[test]
    fn test_parse_structured_error_keeps_text() {
        let err = parse_structured::<Keys>("not json at all").unwrap_err();
        match err {
            AgentError::JsonParseError(msg) => assert!(msg.contains("not json at all")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fence_inside_string_value_is_kept() {
        let out = r#"{"keys": ["use a ```json block", "{brace}"]}"#;
        let parsed = parse_structured::<Keys>(out).unwrap();
        assert_eq!(parsed.keys, vec!["use a ```json block", "{brace}"]);
    }

    #[test]
    fn test_fenced_reply_still_parses() {
        let parsed = parse_structured::<Keys>("```json\n{\"keys\": [\"a\"]}\n```").unwrap();
        assert_eq!(parsed.keys, vec!["a"]);
    }

    #[test]
    fn test_response_shape_mentions_fields() {
        let shape = response_shape::<Keys>();
        assert!(shape.to_string().contains("keys"));
    }
}
