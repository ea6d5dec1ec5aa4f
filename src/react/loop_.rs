//! ReAct 后端调用
//!
//! reason_act_step：结构化 JSON 推理一步（reasoning + tool_calls）；
//! final_answer：自由文本最终回答，文本块边到达边推给 TextListener。
//! 两者的后端错误都原样上抛，不做重试。

use std::sync::OnceLock;

use futures_util::StreamExt;

use crate::core::AgentError;
use crate::llm::{parse_structured, response_shape, ReasoningModelBuilder, ResponseShape};
use crate::message::Message;
use crate::react::encoder::{encode_for_backend, ReasonResponse};
use crate::react::events::Listeners;

fn reason_shape() -> ResponseShape {
    static SHAPE: OnceLock<ResponseShape> = OnceLock::new();
    SHAPE.get_or_init(response_shape::<ReasonResponse>).clone()
}

/// 请求一个 ReAct 步骤
pub(crate) async fn reason_act_step(
    model_builder: &dyn ReasoningModelBuilder,
    history: &[Message],
) -> Result<ReasonResponse, AgentError> {
    let model = model_builder.build_reasoning_model(Some(reason_shape()));
    let output = model.complete(&encode_for_backend(history)).await?;
    parse_structured(&output)
}

/// 请求最终回答（流式）
pub(crate) async fn final_answer(
    model_builder: &dyn ReasoningModelBuilder,
    history: &[Message],
    listeners: &Listeners,
) -> Result<String, AgentError> {
    let model = model_builder.build_reasoning_model(None);
    let mut stream = model.complete_stream(&encode_for_backend(history)).await?;
    listeners.stream_start();
    let mut answer = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        listeners.text_chunk(&chunk);
        answer.push_str(&chunk);
    }
    Ok(answer)
}
