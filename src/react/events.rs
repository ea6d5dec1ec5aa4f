//! 监听器与单轮发送选项
//!
//! 监听器是尽力而为的回调：没有返回值，不能影响对话流程。
//! MessageListener 收到每条新追加的历史消息；TextListener 收到最终回答的流式文本块。

use std::sync::Arc;

use crate::message::{Message, Notification};

/// 新消息监听器
pub trait MessageListener: Send + Sync {
    fn on_message(&self, message: &Message);
}

/// 最终回答文本块监听器
pub trait TextListener: Send + Sync {
    /// 流开始（每轮最多一次）
    ///
    /// 在后端的 `complete_stream` 返回文本流之后、第一个文本块之前调用，
    /// 而不是后端真正开始产出时；后端若在返回流之前就已开始生成，这段等待不会被通知。
    fn on_stream_start(&self) {}

    fn on_text_chunk(&self, chunk: &str);
}

impl<F> MessageListener for F
where
    F: Fn(&Message) + Send + Sync,
{
    fn on_message(&self, message: &Message) {
        self(message)
    }
}

impl<F> TextListener for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_text_chunk(&self, chunk: &str) {
        self(chunk)
    }
}

/// 单次 send 的附加选项：额外监听器、在用户消息前注入的通知
#[derive(Clone, Default)]
pub struct SendOptions {
    pub(crate) message_listeners: Vec<Arc<dyn MessageListener>>,
    pub(crate) text_listeners: Vec<Arc<dyn TextListener>>,
    pub(crate) notifications: Vec<Notification>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message_listener(mut self, listener: impl MessageListener + 'static) -> Self {
        self.message_listeners.push(Arc::new(listener));
        self
    }

    pub fn with_text_listener(mut self, listener: impl TextListener + 'static) -> Self {
        self.text_listeners.push(Arc::new(listener));
        self
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    pub fn with_notifications(mut self, notifications: impl IntoIterator<Item = Notification>) -> Self {
        self.notifications.extend(notifications);
        self
    }
}

/// 一轮内生效的全部监听器（Agent 级 + 本次 send）
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    messages: Vec<Arc<dyn MessageListener>>,
    text: Vec<Arc<dyn TextListener>>,
}

impl Listeners {
    pub(crate) fn new(
        messages: Vec<Arc<dyn MessageListener>>,
        text: Vec<Arc<dyn TextListener>>,
    ) -> Self {
        Self { messages, text }
    }

    pub(crate) fn message(&self, message: &Message) {
        for l in &self.messages {
            l.on_message(message);
        }
    }

    pub(crate) fn stream_start(&self) {
        for l in &self.text {
            l.on_stream_start();
        }
    }

    pub(crate) fn text_chunk(&self, chunk: &str) {
        for l in &self.text {
            l.on_text_chunk(chunk);
        }
    }
}
