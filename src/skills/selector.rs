//! 技能选择器
//!
//! 策略组合（组合顺序固定）：
//! - [`NoSkillSelector`]：未配置相关性后端时使用，从不选择
//! - [`LlmSkillSelector`]：把候选技能（仅 key + 适用条件）与最近对话交给相关性模型判断
//! - [`AntiRepeatSelector`]：包裹内层选择器，剔除最近 N 条驻留记录中出现过的技能

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::AgentError;
use crate::llm::{parse_structured, response_shape, ChatMessage, SkillRelevanceModelBuilder};
use crate::message::{recent_residencies, Message, Skill};

/// 相关性模型查看的最近 user/agent 消息条数
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

const RELEVANCE_SYSTEM_PROMPT: &str = r#"You are a fast AI who decides if any "skills" are relevant to an agent's conversation.
- You will list all skill keys in your response that you think might be relevant to the current turn in the conversation (the last message).
- This means any skills that may help an agent continue the conversation should be included.
- Prefer recall over precision.
- It may be the case that none are relevant, in that case respond with an empty list.
- You will respond with a json object with a key "relevant_skill_keys", which is a list of string keys that exactly match the keys of the provided skills."#;

/// 从目录中挑选本轮新插入的技能
#[async_trait]
pub trait SkillSelector: Send + Sync {
    async fn select_skills(
        &self,
        catalog: &[Skill],
        history: &[Message],
    ) -> Result<Vec<Skill>, AgentError>;
}

/// 空选择器
#[derive(Debug, Default)]
pub struct NoSkillSelector;

#[async_trait]
impl SkillSelector for NoSkillSelector {
    async fn select_skills(&self, _: &[Skill], _: &[Message]) -> Result<Vec<Skill>, AgentError> {
        Ok(Vec::new())
    }
}

/// 相关性模型的结构化输出
#[derive(Debug, Deserialize, JsonSchema)]
struct RelevanceResponse {
    relevant_skill_keys: Vec<String>,
}

/// 由相关性模型驱动的选择器；模型每次调用时构建
pub struct LlmSkillSelector {
    model_builder: Arc<dyn SkillRelevanceModelBuilder>,
    history_window: usize,
}

impl LlmSkillSelector {
    pub fn new(model_builder: Arc<dyn SkillRelevanceModelBuilder>) -> Self {
        Self {
            model_builder,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// 拼装相关性判断的输入：最近对话 + 候选技能（不含技能正文）
    fn build_messages(&self, catalog: &[Skill], history: &[Message]) -> Vec<ChatMessage> {
        let mut conv: Vec<String> = history
            .iter()
            .filter_map(|m| match m {
                Message::User { content } => Some(format!("<user-message>{}</user-message>", content)),
                Message::Agent { content } => {
                    Some(format!("<agent-message>{}</agent-message>", content))
                }
                _ => None,
            })
            .collect();
        if conv.len() > self.history_window {
            conv.drain(..conv.len() - self.history_window);
        }
        let candidates: Vec<String> = catalog
            .iter()
            .map(|s| format!(r#"<skill key="{}">{}</skill>"#, s.key, s.when))
            .collect();
        let user_prompt = format!(
            "Here is the conversation and messages:\n\n{}\n\n{}",
            conv.join("\n"),
            candidates.join("\n")
        );
        vec![
            ChatMessage::system(RELEVANCE_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ]
    }
}

#[async_trait]
impl SkillSelector for LlmSkillSelector {
    async fn select_skills(
        &self,
        catalog: &[Skill],
        history: &[Message],
    ) -> Result<Vec<Skill>, AgentError> {
        if catalog.is_empty() {
            return Ok(Vec::new());
        }
        let model = self
            .model_builder
            .build_skill_relevance_model(response_shape::<RelevanceResponse>());
        let output = model.complete(&self.build_messages(catalog, history)).await?;
        let parsed: RelevanceResponse = parse_structured(&output)?;

        let lookup: HashMap<&str, &Skill> = catalog.iter().map(|s| (s.key.as_str(), s)).collect();
        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for key in parsed.relevant_skill_keys {
            match lookup.get(key.as_str()) {
                Some(skill) if seen.insert(key.clone()) => selected.push((*skill).clone()),
                Some(_) => {}
                None => tracing::debug!(key = %key, "relevance model returned unknown skill key, dropped"),
            }
        }
        Ok(selected)
    }
}

/// 防重复装饰器：最近 n 条 SkillResidency 中出现过的技能不参与本轮挑选
pub struct AntiRepeatSelector {
    n: usize,
    inner: Box<dyn SkillSelector>,
}

impl AntiRepeatSelector {
    pub fn new(n: usize, inner: Box<dyn SkillSelector>) -> Self {
        Self { n, inner }
    }
}

#[async_trait]
impl SkillSelector for AntiRepeatSelector {
    async fn select_skills(
        &self,
        catalog: &[Skill],
        history: &[Message],
    ) -> Result<Vec<Skill>, AgentError> {
        let recent: HashSet<&str> = recent_residencies(history)
            .take(self.n)
            .flatten()
            .map(|s| s.key())
            .collect();
        let allowed: Vec<Skill> = catalog
            .iter()
            .filter(|s| !recent.contains(s.key.as_str()))
            .cloned()
            .collect();
        self.inner.select_skills(&allowed, history).await
    }
}

/// 组合选择器：无相关性后端 → NoSkillSelector；否则 LlmSkillSelector，dont_repeat_n > 0 时再包一层 AntiRepeat
pub fn build_skill_selector(
    model_builder: Option<Arc<dyn SkillRelevanceModelBuilder>>,
    dont_repeat_n: i64,
    history_window: usize,
) -> Box<dyn SkillSelector> {
    let Some(builder) = model_builder else {
        return Box::new(NoSkillSelector);
    };
    let selector: Box<dyn SkillSelector> =
        Box::new(LlmSkillSelector::new(builder).with_history_window(history_window));
    if dont_repeat_n > 0 {
        Box::new(AntiRepeatSelector::new(dont_repeat_n as usize, selector))
    } else {
        selector
    }
}
