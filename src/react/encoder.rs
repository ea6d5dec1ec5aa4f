//! 历史 → 后端消息编码
//!
//! 系统模板以整段历史折叠出的最新人格与驻留技能渲染；CollectContext 阶段切换、
//! SkillResidency、Personality 不直接发给后端。ToolCalls 以 ReAct JSON 回放为 assistant 消息。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;
use crate::message::{
    visit_messages, AgentMode, AvailableToolDefinition, ConversationState, InsertedSkill, Message,
    MessageVisitor, Notification, ToolCall, ToolResponse,
};
use crate::react::prompts::{
    render_system_prompt, ANSWER_USER_INSTRUCTION, DEFAULT_PERSONALITY, REASON_ACT_INSTRUCTION,
    TOOL_RESPONSE_SEPARATOR,
};

/// ReAct 阶段后端的结构化回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReasonResponse {
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// 按 visitor 逐条生成后端消息
struct BackendEncoder {
    personality: String,
    resident_skills: Vec<InsertedSkill>,
    out: Vec<ChatMessage>,
}

impl MessageVisitor for BackendEncoder {
    fn visit_system(&mut self, template: &str) {
        let prompt = render_system_prompt(template, &self.personality, &self.resident_skills);
        self.out.push(ChatMessage::system(prompt));
    }

    fn visit_user(&mut self, content: &str) {
        self.out.push(ChatMessage::user(content));
    }

    fn visit_agent(&mut self, content: &str) {
        self.out.push(ChatMessage::assistant(content));
    }

    fn visit_tool_calls(&mut self, reasoning: &str, tool_calls: &[ToolCall]) {
        let replay = ReasonResponse {
            reasoning: reasoning.to_string(),
            tool_calls: tool_calls.to_vec(),
        };
        let content = serde_json::to_string_pretty(&replay).unwrap_or_else(|_| reasoning.to_string());
        self.out.push(ChatMessage::assistant(content));
    }

    fn visit_tool_response(&mut self, responses: &[ToolResponse]) {
        let results: Vec<&str> = responses.iter().map(|r| r.response.as_str()).collect();
        self.out.push(ChatMessage::system(format!(
            "Tool Responses:{}{}",
            TOOL_RESPONSE_SEPARATOR,
            results.join(TOOL_RESPONSE_SEPARATOR)
        )));
    }

    fn visit_mode_switch(&mut self, mode: AgentMode) {
        match mode {
            AgentMode::ReasonAct => self.out.push(ChatMessage::system(REASON_ACT_INSTRUCTION)),
            AgentMode::AnswerUser => self.out.push(ChatMessage::system(ANSWER_USER_INSTRUCTION)),
            // 仅用于审计，不告知后端
            AgentMode::CollectContext => {}
        }
    }

    fn visit_notification(&mut self, notification: &Notification) {
        self.out.push(ChatMessage::system(format!(
            "**Notification of type '{}'**\n{}",
            notification.kind, notification.content
        )));
    }

    fn visit_skill_residency(&mut self, _skills: &[InsertedSkill]) {}

    fn visit_tool_defs(&mut self, tools: &[AvailableToolDefinition]) {
        if tools.is_empty() {
            self.out.push(ChatMessage::system(
                "The available tools have changed, there are now no tools available.",
            ));
            return;
        }
        let listing: Vec<String> = tools
            .iter()
            .map(|t| {
                let mut s = format!("- Tool `{}`", t.name);
                for line in &t.description {
                    s.push_str(&format!("\n  - {}", line));
                }
                s
            })
            .collect();
        self.out.push(ChatMessage::system(format!(
            "The available tools have changed, here are the current available tools:\n{}",
            listing.join("\n")
        )));
    }

    fn visit_personality(&mut self, _personality: &str) {}
}

/// 编码完整历史
pub fn encode_for_backend(messages: &[Message]) -> Vec<ChatMessage> {
    let state = ConversationState::fold(messages);
    let mut encoder = BackendEncoder {
        personality: state
            .personality
            .unwrap_or_else(|| DEFAULT_PERSONALITY.to_string()),
        resident_skills: state.resident_skills,
        out: Vec::with_capacity(messages.len()),
    };
    visit_messages(&mut encoder, messages);
    encoder.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::message::Skill;

    #[test]
    fn test_system_uses_latest_state() {
        let history = vec![
            Message::personality("old"),
            Message::system("{{personality}}{{skills}}"),
            Message::SkillResidency {
                skills: vec![InsertedSkill::fresh(Skill::new("k", "SKILL BODY"))],
            },
            Message::personality("new"),
        ];
        let out = encode_for_backend(&history);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, Role::System);
        assert!(out[0].content.starts_with("new"));
        assert!(out[0].content.contains("SKILL BODY"));
    }

    #[test]
    fn test_hidden_kinds_are_omitted() {
        let history = vec![
            Message::mode_switch(AgentMode::CollectContext),
            Message::SkillResidency { skills: vec![] },
            Message::personality("p"),
            Message::mode_switch(AgentMode::ReasonAct),
            Message::mode_switch(AgentMode::AnswerUser),
        ];
        let out = encode_for_backend(&history);
        assert_eq!(out.len(), 2);
        assert!(out[0].content.contains("reason-action mode"));
        assert!(out[1].content.contains("final answer mode"));
    }

    #[test]
    fn test_tool_traffic_encoding() {
        let history = vec![
            Message::ToolCalls {
                reasoning: "look it up".into(),
                tool_calls: vec![ToolCall::new("echo").with_arg("x", "y")],
            },
            Message::ToolResponse {
                responses: vec![ToolResponse::new("one"), ToolResponse::new("two")],
            },
        ];
        let out = encode_for_backend(&history);
        assert_eq!(out[0].role, Role::Assistant);
        let replay: ReasonResponse = serde_json::from_str(&out[0].content).unwrap();
        assert_eq!(replay.tool_calls[0].tool_name, "echo");
        assert_eq!(
            out[1].content,
            "Tool Responses:\n==========\none\n==========\ntwo"
        );
    }

    #[test]
    fn test_tool_defs_and_notifications() {
        let history = vec![
            Message::ToolDefsChanged {
                tools: vec![AvailableToolDefinition {
                    name: "echo".into(),
                    description: vec!["repeats".into()],
                }],
            },
            Message::ToolDefsChanged { tools: vec![] },
            Message::Notification(Notification::new("reminder", "drink water")),
        ];
        let out = encode_for_backend(&history);
        assert!(out[0].content.contains("- Tool `echo`\n  - repeats"));
        assert!(out[1].content.contains("no tools available"));
        assert_eq!(out[2].content, "**Notification of type 'reminder'**\ndrink water");
    }

    #[test]
    fn test_reason_response_missing_fields_default() {
        let step: ReasonResponse = crate::llm::parse_structured(r#"{"tool_calls": []}"#).unwrap();
        assert_eq!(step.reasoning, "");
        assert!(step.tool_calls.is_empty());

        let step: ReasonResponse = crate::llm::parse_structured(
            r#"{"tool_calls": [{"tool_name": "echo", "tool_args": [{"arg_name": "x"}]}]}"#,
        )
        .unwrap();
        assert_eq!(step.tool_calls[0].tool_args[0].arg_value, serde_json::Value::Null);
    }
}
