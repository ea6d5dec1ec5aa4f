//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / call），由 ToolRegistry 按注册顺序保存。
//! 查找按名称精确匹配，重名时取第一个注册的工具（宽松处理，不告警）。

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::message::{AvailableToolDefinition, ConversationState, Message};

/// 工具 trait：名称、描述（若干条要点，供后端理解用法与参数）、异步调用
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（对应 tool_calls 中的 tool_name）
    fn name(&self) -> &str;

    /// 简短的要点式描述，包括需要哪些参数
    fn description(&self) -> Vec<String>;

    /// 执行工具；args 为后端输出参数的 JSON 解码结果
    async fn call(&self, args: Map<String, Value>) -> Result<String, String>;
}

/// 有序工具集
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.push(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    /// 移除所有同名工具，返回是否有工具被移除
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.tools.len();
        self.tools.retain(|t| t.name() != name);
        self.tools.len() != before
    }

    /// 第一个同名工具
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 可序列化的工具定义列表（用于 ToolDefsChanged 宣告）
    pub fn definitions(&self) -> Vec<AvailableToolDefinition> {
        self.tools
            .iter()
            .map(|t| AvailableToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
            })
            .collect()
    }

    /// 与历史中最近一次宣告的工具集比较（只比较名称集合，忽略描述）；从未宣告视为已变化
    pub fn has_changed_since(&self, history: &[Message]) -> bool {
        let Some(announced) = ConversationState::fold(history).tool_defs else {
            return true;
        };
        let current: HashSet<&str> = self.tools.iter().map(|t| t.name()).collect();
        let previous: HashSet<&str> = announced.iter().map(|d| d.name.as_str()).collect();
        current != previous
    }
}
