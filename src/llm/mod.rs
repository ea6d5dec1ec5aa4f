//! LLM 层：Model pipeline 抽象、结构化输出解析与 Mock 实现

pub mod mock;
pub mod parse;
pub mod traits;

pub use mock::{MockLlmClient, MockModelBuilder};
pub use parse::{extract_json_block, parse_structured, response_shape};
pub use traits::{
    ChatMessage, LlmClient, LlmError, ReasoningModelBuilder, ResponseShape, Role,
    SkillRelevanceModelBuilder, TextStream,
};
