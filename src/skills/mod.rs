//! 技能系统
//!
//! 技能（Skill）是可注入的知识片段：带可选的适用条件与按轮衰减的驻留期。
//! 每轮 CollectContext 阶段：上一轮驻留集合衰减一轮，再由选择器从动态目录中挑选新技能，
//! 结果作为一条 SkillResidency 消息写入历史。

mod loader;
mod residency;
mod selector;

pub use loader::{SkillLoader, SkillMeta};
pub use residency::{carry_forward, merge_residency, next_residency, split_skills};
pub use selector::{
    build_skill_selector, AntiRepeatSelector, LlmSkillSelector, NoSkillSelector, SkillSelector,
    DEFAULT_HISTORY_WINDOW,
};
