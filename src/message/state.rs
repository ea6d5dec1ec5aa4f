//! 状态折叠：从历史推导当前人格、驻留技能、已宣告工具集与当前阶段

use super::{
    AgentMode, AvailableToolDefinition, InsertedSkill, Message, MessageVisitor, Notification,
    ToolCall, ToolResponse,
};

/// 折叠历史得到的当前状态；每个字段取最近一条相关消息
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationState {
    pub personality: Option<String>,
    /// 最近一条 SkillResidency 记录的技能
    pub resident_skills: Vec<InsertedSkill>,
    /// 最近一次宣告的工具集；None 表示从未宣告
    pub tool_defs: Option<Vec<AvailableToolDefinition>>,
    pub mode: Option<AgentMode>,
}

impl ConversationState {
    pub fn fold(messages: &[Message]) -> Self {
        let mut state = Self::default();
        super::visit_messages(&mut state, messages);
        state
    }
}

impl MessageVisitor for ConversationState {
    fn visit_system(&mut self, _template: &str) {}

    fn visit_user(&mut self, _content: &str) {}

    fn visit_agent(&mut self, _content: &str) {}

    fn visit_tool_calls(&mut self, _reasoning: &str, _tool_calls: &[ToolCall]) {}

    fn visit_tool_response(&mut self, _responses: &[ToolResponse]) {}

    fn visit_mode_switch(&mut self, mode: AgentMode) {
        self.mode = Some(mode);
    }

    fn visit_notification(&mut self, _notification: &Notification) {}

    fn visit_skill_residency(&mut self, skills: &[InsertedSkill]) {
        self.resident_skills = skills.to_vec();
    }

    fn visit_tool_defs(&mut self, tools: &[AvailableToolDefinition]) {
        self.tool_defs = Some(tools.to_vec());
    }

    fn visit_personality(&mut self, personality: &str) {
        self.personality = Some(personality.to_string());
    }
}

/// 最近一条 SkillResidency 的技能；从未记录时为空
pub fn last_residency(messages: &[Message]) -> &[InsertedSkill] {
    recent_residencies(messages).next().unwrap_or(&[])
}

/// 从新到旧依次返回每条 SkillResidency 的技能
pub fn recent_residencies(messages: &[Message]) -> impl Iterator<Item = &[InsertedSkill]> + '_ {
    messages.iter().rev().filter_map(|m| match m {
        Message::SkillResidency { skills } => Some(skills.as_slice()),
        _ => None,
    })
}
