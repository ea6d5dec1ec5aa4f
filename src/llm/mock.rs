//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按脚本依次返回预置回复，并记录每次调用收到的消息，便于断言 ReAct 流程的调用次数与内容。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::stream;

use crate::llm::{
    ChatMessage, LlmClient, LlmError, ReasoningModelBuilder, ResponseShape,
    SkillRelevanceModelBuilder, TextStream,
};

/// 流式回复时每段字符数
const CHUNK_CHARS: usize = 6;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// 脚本化客户端：complete / complete_stream 共用同一回复队列
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以一组回复初始化
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        for r in replies {
            client.push_reply(r);
        }
        client
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.replies).push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, err: LlmError) {
        lock(&self.replies).push_back(Err(err));
    }

    /// 每次调用收到的完整消息列表
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn next_reply(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        lock(&self.calls).push(messages.to_vec());
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Request("mock: no scripted reply left".to_string())))
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.next_reply(messages)
    }

    async fn complete_stream(&self, messages: &[ChatMessage]) -> Result<TextStream, LlmError> {
        let content = self.next_reply(messages)?;
        let chars: Vec<char> = content.chars().collect();
        let chunks: Vec<Result<String, LlmError>> = chars
            .chunks(CHUNK_CHARS)
            .map(|c| Ok(c.iter().collect()))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

/// Mock 构建器：推理模型与相关性模型各自固定为一个 MockLlmClient，并记录请求的 response shape
#[derive(Debug, Default)]
pub struct MockModelBuilder {
    pub reasoning: Arc<MockLlmClient>,
    pub relevance: Arc<MockLlmClient>,
    shapes: Mutex<Vec<Option<ResponseShape>>>,
}

impl MockModelBuilder {
    pub fn new(reasoning: MockLlmClient) -> Self {
        Self {
            reasoning: Arc::new(reasoning),
            ..Self::default()
        }
    }

    pub fn with_relevance(mut self, relevance: MockLlmClient) -> Self {
        self.relevance = Arc::new(relevance);
        self
    }

    /// 推理模型每次构建时请求的 shape（None 表示自由文本）
    pub fn reasoning_shapes(&self) -> Vec<Option<ResponseShape>> {
        lock(&self.shapes).clone()
    }
}

impl ReasoningModelBuilder for MockModelBuilder {
    fn build_reasoning_model(&self, response_shape: Option<ResponseShape>) -> Arc<dyn LlmClient> {
        lock(&self.shapes).push(response_shape);
        self.reasoning.clone()
    }
}

impl SkillRelevanceModelBuilder for MockModelBuilder {
    fn build_skill_relevance_model(&self, _response_shape: ResponseShape) -> Arc<dyn LlmClient> {
        self.relevance.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_replies_in_order_then_error() {
        let client = MockLlmClient::with_replies(["a", "b"]);
        let msgs = vec![ChatMessage::user("hi")];
        assert_eq!(client.complete(&msgs).await.unwrap(), "a");
        assert_eq!(client.complete(&msgs).await.unwrap(), "b");
        assert!(client.complete(&msgs).await.is_err());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_stream_chunks_reassemble() {
        let client = MockLlmClient::with_replies(["hello streaming world"]);
        let mut stream = client.complete_stream(&[]).await.unwrap();
        let mut out = String::new();
        let mut n = 0;
        while let Some(chunk) = stream.next().await {
            out.push_str(&chunk.unwrap());
            n += 1;
        }
        assert_eq!(out, "hello streaming world");
        assert!(n > 1);
    }
}
