//! Agent 运行时
//!
//! 一次 send 同步走完一轮状态机：
//! 工具集变化宣告 → 通知 → 用户消息 → [CollectContext：技能驻留] → ReasonAct 循环 → AnswerUser 最终回答。
//! 历史只追加不修改；任一后端调用失败立即中止本轮，已追加的消息保留。
//! `send` 需要 `&mut self`，同一个 Agent 无法并发跑两轮。

use std::sync::Arc;

use crate::core::{AgentBuilder, AgentError};
use crate::llm::ReasoningModelBuilder;
use crate::message::{AgentMode, Message, Skill};
use crate::react::events::Listeners;
use crate::react::loop_::{final_answer, reason_act_step};
use crate::react::{MessageListener, SendOptions, TextListener};
use crate::skills::{next_residency, SkillSelector};
use crate::tools::{Tool, ToolExecutor, ToolRegistry};

/// ReAct 智能体：持有对话历史、工具集、技能目录与选择器
pub struct Agent {
    pub(crate) messages: Vec<Message>,
    pub(crate) model_builder: Arc<dyn ReasoningModelBuilder>,
    pub(crate) executor: ToolExecutor,
    pub(crate) skill_selector: Box<dyn SkillSelector>,
    /// 动态技能目录（有适用条件的技能）；为空时跳过 CollectContext
    pub(crate) dynamic_skills: Vec<Skill>,
    pub(crate) max_react_steps: Option<usize>,
    pub(crate) message_listeners: Vec<Arc<dyn MessageListener>>,
    pub(crate) text_listeners: Vec<Arc<dyn TextListener>>,
}

impl Agent {
    pub fn builder(model_builder: Arc<dyn ReasoningModelBuilder>) -> AgentBuilder {
        AgentBuilder::new(model_builder)
    }

    /// 完整对话历史（按追加顺序）
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    /// 添加工具；下一轮开始时会宣告工具集变化
    pub fn register_tool(&mut self, tool: impl Tool + 'static) {
        self.executor.registry_mut().register(tool);
    }

    /// 移除同名工具；下一轮开始时会宣告工具集变化
    pub fn remove_tool(&mut self, name: &str) -> bool {
        self.executor.registry_mut().remove(name)
    }

    /// 处理一条用户消息，返回最终回答
    pub async fn send(&mut self, text: &str, options: SendOptions) -> Result<String, AgentError> {
        let SendOptions {
            message_listeners,
            text_listeners,
            notifications,
        } = options;
        let listeners = Listeners::new(
            self.message_listeners.iter().cloned().chain(message_listeners).collect(),
            self.text_listeners.iter().cloned().chain(text_listeners).collect(),
        );
        tracing::info!(history_len = self.messages.len(), "turn started");

        if self.executor.registry().has_changed_since(&self.messages) {
            let tools = self.executor.registry().definitions();
            tracing::debug!(tools = ?self.executor.registry().tool_names(), "announcing tool definitions");
            self.push(&listeners, Message::ToolDefsChanged { tools });
        }

        for n in notifications {
            self.push(&listeners, Message::Notification(n));
        }
        self.push(&listeners, Message::user(text));

        if !self.dynamic_skills.is_empty() {
            self.push(&listeners, Message::mode_switch(AgentMode::CollectContext));
            let skills = next_residency(
                self.skill_selector.as_ref(),
                &self.dynamic_skills,
                &self.messages,
            )
            .await?;
            tracing::debug!(
                resident = ?skills.iter().map(|s| s.key()).collect::<Vec<_>>(),
                "skill residency"
            );
            self.push(&listeners, Message::SkillResidency { skills });
        }

        self.push(&listeners, Message::mode_switch(AgentMode::ReasonAct));
        let mut steps = 0usize;
        loop {
            let step = reason_act_step(self.model_builder.as_ref(), &self.messages).await?;
            let calls = step.tool_calls;
            let done = calls.is_empty();
            self.push(
                &listeners,
                Message::ToolCalls {
                    reasoning: step.reasoning,
                    tool_calls: calls.clone(),
                },
            );
            if done {
                break;
            }

            let responses = self.executor.dispatch(&calls).await;
            self.push(&listeners, Message::ToolResponse { responses });

            steps += 1;
            if let Some(max) = self.max_react_steps {
                if steps >= max {
                    tracing::warn!(max_steps = max, "ReAct step limit reached, answering with what we have");
                    break;
                }
            }
        }

        self.push(&listeners, Message::mode_switch(AgentMode::AnswerUser));
        let answer = final_answer(self.model_builder.as_ref(), &self.messages, &listeners).await?;
        self.push(&listeners, Message::agent(answer.clone()));
        tracing::info!(react_steps = steps, answer_chars = answer.chars().count(), "turn finished");
        Ok(answer)
    }

    fn push(&mut self, listeners: &Listeners, message: Message) {
        listeners.message(&message);
        self.messages.push(message);
    }
}
