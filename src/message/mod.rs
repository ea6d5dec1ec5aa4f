//! 消息模型：对话历史中可能出现的全部消息类型
//!
//! 历史是只追加的有序序列，顺序有语义（最近查询、技能衰减计数都依赖它）。
//! 所有消费方通过 [`MessageVisitor`] 逐类型处理消息：发给后端的编码、持久化记录、
//! 状态折叠（[`ConversationState`]）共用 [`visit_messages`] 这一遍历。
//! 新增消息类型时，每个 visitor 实现都会在编译期报错，必须补齐。

mod state;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use state::{last_residency, recent_residencies, ConversationState};

/// 常驻技能的「永久」剩余轮数哨兵值，衰减时不递减
pub const REMAIN_FOREVER: u32 = u32::MAX;

/// 可注入的知识片段
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// 唯一 key（建议 snake_case）
    pub key: String,
    /// 适用条件；为空表示始终适用（常驻技能）
    #[serde(default)]
    pub when: String,
    /// 选择器看不到，插入后对推理后端可见
    pub content: String,
    /// 插入之后继续驻留的轮数
    #[serde(default)]
    pub remain_for: u32,
}

impl Skill {
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            when: String::new(),
            content: content.into(),
            remain_for: 0,
        }
    }

    pub fn with_when(mut self, when: impl Into<String>) -> Self {
        self.when = when.into();
        self
    }

    pub fn with_remain_for(mut self, turns: u32) -> Self {
        self.remain_for = turns;
        self
    }

    /// 有适用条件的技能进入动态目录，由选择器按轮挑选
    pub fn is_conditional(&self) -> bool {
        !self.when.is_empty()
    }
}

/// 已插入对话的技能及其剩余驻留轮数；每轮由历史重新推导
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedSkill {
    #[serde(flatten)]
    pub skill: Skill,
    pub now_remain_for: u32,
}

impl InsertedSkill {
    /// 新选中：剩余轮数取技能自身的 remain_for
    pub fn fresh(skill: Skill) -> Self {
        let now_remain_for = skill.remain_for;
        Self {
            skill,
            now_remain_for,
        }
    }

    pub fn forever(skill: Skill) -> Self {
        Self {
            skill,
            now_remain_for: REMAIN_FOREVER,
        }
    }

    /// 进入下一轮：剩余为 0 的被丢弃，其余减 1，永久哨兵保持不变
    pub fn decayed(&self) -> Option<InsertedSkill> {
        match self.now_remain_for {
            0 => None,
            REMAIN_FOREVER => Some(self.clone()),
            n => Some(InsertedSkill {
                skill: self.skill.clone(),
                now_remain_for: n - 1,
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.skill.key
    }
}

/// 单个工具参数；值来自后端结构化输出的 JSON 解码，类型不定
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolCallArg {
    pub arg_name: String,
    /// 缺省为 null
    #[serde(default)]
    pub arg_value: Value,
}

/// 一次工具调用请求（字段名即后端 ReAct JSON 的字段名）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub tool_args: Vec<ToolCallArg>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.tool_args.push(ToolCallArg {
            arg_name: name.into(),
            arg_value: value.into(),
        });
        self
    }

    /// 参数列表转为 JSON 对象；同名参数后者覆盖前者
    pub fn args_map(&self) -> Map<String, Value> {
        self.tool_args
            .iter()
            .map(|a| (a.arg_name.clone(), a.arg_value.clone()))
            .collect()
    }
}

/// 单次工具调用的文本结果（成功输出或错误描述）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub response: String,
}

impl ToolResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// 智能体阶段：决定本轮对后端可见的指令
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    CollectContext,
    ReasonAct,
    AnswerUser,
}

/// 带外通知，在用户消息之前注入
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: String,
    pub content: String,
}

impl Notification {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
        }
    }
}

/// 工具的可序列化视图，用于宣告工具集变化
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableToolDefinition {
    pub name: String,
    pub description: Vec<String>,
}

/// 对话历史中的一条消息
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// 系统提示模板，编码时以当前人格与驻留技能渲染
    System { template: String },
    User { content: String },
    /// 最终回答（用户可见）
    Agent { content: String },
    /// 一次 ReAct 推理步骤；tool_calls 为空表示推理结束
    ToolCalls {
        reasoning: String,
        tool_calls: Vec<ToolCall>,
    },
    /// 一个 ToolCalls 消息对应的全部工具结果（按调用顺序）
    ToolResponse { responses: Vec<ToolResponse> },
    ModeSwitch { mode: AgentMode },
    Notification(Notification),
    /// 本轮驻留的技能集合
    SkillResidency { skills: Vec<InsertedSkill> },
    /// 工具集变化宣告
    ToolDefsChanged { tools: Vec<AvailableToolDefinition> },
    Personality { personality: String },
}

impl Message {
    pub fn system(template: impl Into<String>) -> Self {
        Message::System {
            template: template.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Message::Agent {
            content: content.into(),
        }
    }

    pub fn mode_switch(mode: AgentMode) -> Self {
        Message::ModeSwitch { mode }
    }

    pub fn personality(personality: impl Into<String>) -> Self {
        Message::Personality {
            personality: personality.into(),
        }
    }

    /// 按消息类型分派到 visitor 对应的方法，直接传入该类型的字段
    pub fn accept<V: MessageVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Message::System { template } => visitor.visit_system(template),
            Message::User { content } => visitor.visit_user(content),
            Message::Agent { content } => visitor.visit_agent(content),
            Message::ToolCalls {
                reasoning,
                tool_calls,
            } => visitor.visit_tool_calls(reasoning, tool_calls),
            Message::ToolResponse { responses } => visitor.visit_tool_response(responses),
            Message::ModeSwitch { mode } => visitor.visit_mode_switch(*mode),
            Message::Notification(n) => visitor.visit_notification(n),
            Message::SkillResidency { skills } => visitor.visit_skill_residency(skills),
            Message::ToolDefsChanged { tools } => visitor.visit_tool_defs(tools),
            Message::Personality { personality } => visitor.visit_personality(personality),
        }
    }
}

/// 每种消息类型一个方法；没有默认实现，新增类型必须在所有实现中处理
pub trait MessageVisitor {
    fn visit_system(&mut self, template: &str);
    fn visit_user(&mut self, content: &str);
    fn visit_agent(&mut self, content: &str);
    fn visit_tool_calls(&mut self, reasoning: &str, tool_calls: &[ToolCall]);
    fn visit_tool_response(&mut self, responses: &[ToolResponse]);
    fn visit_mode_switch(&mut self, mode: AgentMode);
    fn visit_notification(&mut self, notification: &Notification);
    fn visit_skill_residency(&mut self, skills: &[InsertedSkill]);
    fn visit_tool_defs(&mut self, tools: &[AvailableToolDefinition]);
    fn visit_personality(&mut self, personality: &str);
}

/// 按顺序遍历历史，逐条交给 visitor
pub fn visit_messages<V: MessageVisitor + ?Sized>(visitor: &mut V, messages: &[Message]) {
    for m in messages {
        m.accept(visitor);
    }
}
