//! 工具执行器
//!
//! 持有 ToolRegistry，按数组顺序逐个执行一条 ToolCalls 消息中的全部调用。
//! 缺失工具与工具报错都转为文本结果返回给后端，不会中止本轮；每次调用输出结构化审计日志（JSON）。

use std::time::Instant;

use crate::message::{ToolCall, ToolResponse};
use crate::tools::ToolRegistry;

/// 工具执行器：缺失 / 失败在本地恢复为文本 ToolResponse
pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.registry
    }

    /// 依次执行，结果与调用一一对应
    pub async fn dispatch(&self, calls: &[ToolCall]) -> Vec<ToolResponse> {
        let mut responses = Vec::with_capacity(calls.len());
        for call in calls {
            responses.push(self.execute(call).await);
        }
        responses
    }

    /// 执行单个调用；输出 JSON 审计日志
    pub async fn execute(&self, call: &ToolCall) -> ToolResponse {
        let Some(tool) = self.registry.get(&call.tool_name) else {
            tracing::warn!(tool = %call.tool_name, "requested tool is not configured");
            return ToolResponse::new(format!(
                "Could not find tool with name '{}'",
                call.tool_name
            ));
        };

        let start = Instant::now();
        let args = call.args_map();
        let args_preview = args_preview(&serde_json::Value::Object(args.clone()));
        let result = tool.call(args).await;

        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": call.tool_name,
            "ok": result.is_ok(),
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(content) => ToolResponse::new(content),
            Err(e) => {
                tracing::warn!(tool = %call.tool_name, error = %e, "tool call failed");
                ToolResponse::new(format!("There was an error calling the tool: {}", e))
            }
        }
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
