//! 历史记录编解码：JSON 数组，每条记录带 `kind` 判别字段，只包含该类型相关的字段

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::message::{
    visit_messages, AgentMode, AvailableToolDefinition, InsertedSkill, Message, MessageVisitor,
    Notification, ToolCall, ToolResponse,
};

/// 可识别的 kind；解码时遇到其他值直接报错
const KNOWN_KINDS: &[&str] = &[
    "system",
    "user",
    "agent",
    "tool_calls",
    "tool_response",
    "mode_switch",
    "notification",
    "skills",
    "available_tools",
    "personality",
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum MessageRecord {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Agent {
        content: String,
    },
    ToolCalls {
        reasoning: String,
        tool_calls: Vec<ToolCall>,
    },
    ToolResponse {
        responses: Vec<ToolResponse>,
    },
    ModeSwitch {
        mode: AgentMode,
    },
    Notification {
        notification_kind: String,
        content: String,
    },
    Skills {
        skills: Vec<InsertedSkill>,
    },
    AvailableTools {
        available_tools: Vec<AvailableToolDefinition>,
    },
    Personality {
        personality: String,
    },
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        match record {
            MessageRecord::System { content } => Message::System { template: content },
            MessageRecord::User { content } => Message::User { content },
            MessageRecord::Agent { content } => Message::Agent { content },
            MessageRecord::ToolCalls {
                reasoning,
                tool_calls,
            } => Message::ToolCalls {
                reasoning,
                tool_calls,
            },
            MessageRecord::ToolResponse { responses } => Message::ToolResponse { responses },
            MessageRecord::ModeSwitch { mode } => Message::ModeSwitch { mode },
            MessageRecord::Notification {
                notification_kind,
                content,
            } => Message::Notification(Notification {
                kind: notification_kind,
                content,
            }),
            MessageRecord::Skills { skills } => Message::SkillResidency { skills },
            MessageRecord::AvailableTools { available_tools } => Message::ToolDefsChanged {
                tools: available_tools,
            },
            MessageRecord::Personality { personality } => Message::Personality { personality },
        }
    }
}

/// 把历史折叠为记录列表
#[derive(Default)]
struct RecordEncoder {
    records: Vec<MessageRecord>,
}

impl MessageVisitor for RecordEncoder {
    fn visit_system(&mut self, template: &str) {
        self.records.push(MessageRecord::System {
            content: template.to_string(),
        });
    }

    fn visit_user(&mut self, content: &str) {
        self.records.push(MessageRecord::User {
            content: content.to_string(),
        });
    }

    fn visit_agent(&mut self, content: &str) {
        self.records.push(MessageRecord::Agent {
            content: content.to_string(),
        });
    }

    fn visit_tool_calls(&mut self, reasoning: &str, tool_calls: &[ToolCall]) {
        self.records.push(MessageRecord::ToolCalls {
            reasoning: reasoning.to_string(),
            tool_calls: tool_calls.to_vec(),
        });
    }

    fn visit_tool_response(&mut self, responses: &[ToolResponse]) {
        self.records.push(MessageRecord::ToolResponse {
            responses: responses.to_vec(),
        });
    }

    fn visit_mode_switch(&mut self, mode: AgentMode) {
        self.records.push(MessageRecord::ModeSwitch { mode });
    }

    fn visit_notification(&mut self, notification: &Notification) {
        self.records.push(MessageRecord::Notification {
            notification_kind: notification.kind.clone(),
            content: notification.content.clone(),
        });
    }

    fn visit_skill_residency(&mut self, skills: &[InsertedSkill]) {
        self.records.push(MessageRecord::Skills {
            skills: skills.to_vec(),
        });
    }

    fn visit_tool_defs(&mut self, tools: &[AvailableToolDefinition]) {
        self.records.push(MessageRecord::AvailableTools {
            available_tools: tools.to_vec(),
        });
    }

    fn visit_personality(&mut self, personality: &str) {
        self.records.push(MessageRecord::Personality {
            personality: personality.to_string(),
        });
    }
}

/// 编码历史为 JSON 写入 writer
pub fn encode_messages<W: Write>(writer: W, messages: &[Message]) -> Result<(), AgentError> {
    let mut encoder = RecordEncoder::default();
    visit_messages(&mut encoder, messages);
    serde_json::to_writer(writer, &encoder.records)?;
    Ok(())
}

/// 从 reader 解码 encode_messages 写出的 JSON；未知或缺失的 kind 为致命错误
pub fn decode_messages<R: Read>(reader: R) -> Result<Vec<Message>, AgentError> {
    let raw: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    raw.into_iter()
        .map(|value| {
            let kind = value.get("kind").and_then(|k| k.as_str()).unwrap_or_default();
            if !KNOWN_KINDS.contains(&kind) {
                return Err(AgentError::UnknownMessageKind(kind.to_string()));
            }
            let record: MessageRecord = serde_json::from_value(value)?;
            Ok(record.into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Skill, REMAIN_FOREVER};
    use serde_json::json;

    fn every_kind() -> Vec<Message> {
        vec![
            Message::personality("Your name is Bee."),
            Message::system("You are {{personality}}"),
            Message::ToolDefsChanged {
                tools: vec![AvailableToolDefinition {
                    name: "echo".into(),
                    description: vec!["line one".into(), "line two".into()],
                }],
            },
            Message::Notification(Notification::new("calendar", "meeting at 3")),
            Message::user("hi"),
            Message::mode_switch(AgentMode::CollectContext),
            Message::SkillResidency {
                skills: vec![
                    InsertedSkill {
                        skill: Skill::new("w", "weather body").with_when("weather").with_remain_for(2),
                        now_remain_for: 1,
                    },
                    InsertedSkill::forever(Skill::new("p", "pinned")),
                ],
            },
            Message::mode_switch(AgentMode::ReasonAct),
            Message::ToolCalls {
                reasoning: "need to echo".into(),
                tool_calls: vec![ToolCall::new("echo")
                    .with_arg("x", "y")
                    .with_arg("n", 1.5)
                    .with_arg("obj", json!({"nested": [1, null, true]}))],
            },
            Message::ToolResponse {
                responses: vec![ToolResponse::new("y")],
            },
            Message::ToolCalls {
                reasoning: "done".into(),
                tool_calls: vec![],
            },
            Message::mode_switch(AgentMode::AnswerUser),
            Message::agent("final"),
        ]
    }

    #[test]
    fn test_round_trip_every_kind() {
        let history = every_kind();
        let mut buf = Vec::new();
        encode_messages(&mut buf, &history).unwrap();
        let decoded = decode_messages(buf.as_slice()).unwrap();
        assert_eq!(decoded, history);
    }

    #[test]
    fn test_records_carry_only_relevant_fields() {
        let mut buf = Vec::new();
        encode_messages(
            &mut buf,
            &[
                Message::mode_switch(AgentMode::ReasonAct),
                Message::ToolDefsChanged { tools: vec![] },
            ],
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(
            value,
            json!([
                {"kind": "mode_switch", "mode": "reason_act"},
                {"kind": "available_tools", "available_tools": []}
            ])
        );
    }

    #[test]
    fn test_forever_counter_survives() {
        let history = vec![Message::SkillResidency {
            skills: vec![InsertedSkill::forever(Skill::new("p", "c"))],
        }];
        let mut buf = Vec::new();
        encode_messages(&mut buf, &history).unwrap();
        let decoded = decode_messages(buf.as_slice()).unwrap();
        match &decoded[0] {
            Message::SkillResidency { skills } => assert_eq!(skills[0].now_remain_for, REMAIN_FOREVER),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_fatal() {
        let input = r#"[{"kind": "user", "content": "a"}, {"kind": "telepathy", "content": "b"}]"#;
        let err = decode_messages(input.as_bytes()).unwrap_err();
        assert!(matches!(err, AgentError::UnknownMessageKind(k) if k == "telepathy"));
    }

    #[test]
    fn test_missing_kind_is_fatal() {
        let err = decode_messages(r#"[{"content": "a"}]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, AgentError::UnknownMessageKind(_)));
    }
}
