//! Agent 构建器：统一的 Agent 初始化逻辑
//!
//! 新建（build）与从持久化历史恢复（restore）共用同一套工具、技能、选择器配置。

use std::sync::Arc;

use crate::agent::Agent;
use crate::config::AppConfig;
use crate::llm::{ReasoningModelBuilder, SkillRelevanceModelBuilder};
use crate::message::{last_residency, InsertedSkill, Message, Skill};
use crate::react::prompts::{DEFAULT_PERSONALITY, DEFAULT_SYSTEM_TEMPLATE};
use crate::react::{MessageListener, TextListener};
use crate::skills::{build_skill_selector, split_skills, SkillLoader, DEFAULT_HISTORY_WINDOW};
use crate::tools::{Tool, ToolExecutor, ToolRegistry};

/// Agent 构建器
pub struct AgentBuilder {
    model_builder: Arc<dyn ReasoningModelBuilder>,
    relevance_builder: Option<Arc<dyn SkillRelevanceModelBuilder>>,
    tools: ToolRegistry,
    skills: Vec<Skill>,
    personality: String,
    system_template: String,
    dont_repeat_turns: i64,
    history_window: usize,
    max_react_steps: Option<usize>,
    message_listeners: Vec<Arc<dyn MessageListener>>,
    text_listeners: Vec<Arc<dyn TextListener>>,
}

impl AgentBuilder {
    pub fn new(model_builder: Arc<dyn ReasoningModelBuilder>) -> Self {
        Self {
            model_builder,
            relevance_builder: None,
            tools: ToolRegistry::new(),
            skills: Vec::new(),
            personality: DEFAULT_PERSONALITY.to_string(),
            system_template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            dont_repeat_turns: 0,
            history_window: DEFAULT_HISTORY_WINDOW,
            max_react_steps: None,
            message_listeners: Vec::new(),
            text_listeners: Vec::new(),
        }
    }

    /// 按配置初始化：人格、步数上限、防重复窗口、技能目录
    ///
    /// 技能目录读取失败只记录告警，不阻止构建
    pub fn from_config(config: &AppConfig, model_builder: Arc<dyn ReasoningModelBuilder>) -> Self {
        let mut builder = Self::new(model_builder)
            .with_personality(config.agent.personality.clone())
            .with_anti_repeat(config.skills.dont_repeat_turns)
            .with_history_window(config.skills.history_window);
        builder.max_react_steps = config.agent.max_react_steps;

        if let Some(dir) = &config.skills.dir {
            match SkillLoader::new(dir).load_all() {
                Ok(skills) => {
                    tracing::info!(dir = %dir.display(), count = skills.len(), "skills loaded");
                    builder.skills.extend(skills);
                }
                Err(e) => tracing::warn!("Skill load from {} failed ({}), continuing without", dir.display(), e),
            }
        }
        builder
    }

    /// 启用基于模型的技能相关性选择；不设置时 CollectContext 只做衰减
    pub fn with_skill_relevance(mut self, builder: Arc<dyn SkillRelevanceModelBuilder>) -> Self {
        self.relevance_builder = Some(builder);
        self
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        for tool in tools {
            self.tools.register_arc(tool);
        }
        self
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = Skill>) -> Self {
        self.skills.extend(skills);
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    /// 系统提示词模板，可含 `{{personality}}` 与 `{{skills}}` 占位符
    pub fn with_system_template(mut self, template: impl Into<String>) -> Self {
        self.system_template = template.into();
        self
    }

    /// 最近 n 条驻留记录里出现过的技能不再入选；n <= 0 关闭
    pub fn with_anti_repeat(mut self, n: i64) -> Self {
        self.dont_repeat_turns = n;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_max_react_steps(mut self, max: usize) -> Self {
        self.max_react_steps = Some(max);
        self
    }

    pub fn with_message_listener(mut self, listener: impl MessageListener + 'static) -> Self {
        self.message_listeners.push(Arc::new(listener));
        self
    }

    pub fn with_text_listener(mut self, listener: impl TextListener + 'static) -> Self {
        self.text_listeners.push(Arc::new(listener));
        self
    }

    /// 新建 Agent：历史以 人格 → 系统模板 → 常驻技能 开头
    pub fn build(mut self) -> Agent {
        let (dynamic, persistent) = split_skills(std::mem::take(&mut self.skills));
        let messages = vec![
            Message::personality(self.personality.clone()),
            Message::system(self.system_template.clone()),
            Message::SkillResidency {
                skills: persistent.into_iter().map(InsertedSkill::forever).collect(),
            },
        ];
        self.finish(messages, dynamic)
    }

    /// 从持久化历史恢复：不改写任何旧消息；
    /// 配置中的常驻技能若不在最新驻留记录里，追加一条补齐后的驻留记录
    pub fn restore(mut self, mut messages: Vec<Message>) -> Agent {
        let (dynamic, persistent) = split_skills(std::mem::take(&mut self.skills));
        let resident = last_residency(&messages);
        let missing: Vec<InsertedSkill> = persistent
            .into_iter()
            .filter(|p| !resident.iter().any(|r| r.key() == p.key))
            .map(InsertedSkill::forever)
            .collect();

        if !missing.is_empty() {
            tracing::info!(
                missing = ?missing.iter().map(|s| s.key()).collect::<Vec<_>>(),
                "restoring persistent skills"
            );
            let mut skills = resident.to_vec();
            skills.extend(missing);
            messages.push(Message::SkillResidency { skills });
        }
        tracing::debug!(history_len = messages.len(), "agent restored");
        self.finish(messages, dynamic)
    }

    fn finish(self, messages: Vec<Message>, dynamic_skills: Vec<Skill>) -> Agent {
        let skill_selector = build_skill_selector(
            self.relevance_builder,
            self.dont_repeat_turns,
            self.history_window,
        );
        Agent {
            messages,
            model_builder: self.model_builder,
            executor: ToolExecutor::new(self.tools),
            skill_selector,
            dynamic_skills,
            max_react_steps: self.max_react_steps,
            message_listeners: self.message_listeners,
            text_listeners: self.text_listeners,
        }
    }
}
