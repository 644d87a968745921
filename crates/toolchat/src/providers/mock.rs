use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, ProviderReply, StopReason, Usage};

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _model: &str,
        _messages: &[Message],
        _tools: &[Tool],
        _max_tokens: i32,
    ) -> Result<ProviderReply> {
        let mut responses = self.responses.lock().unwrap();
        let message = if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Message::assistant().with_text("")
        } else {
            responses.remove(0)
        };

        let stop_reason = if message.tool_requests().is_empty() {
            StopReason::EndTurn
        } else {
            StopReason::ToolUse
        };

        Ok(ProviderReply {
            message,
            stop_reason,
            usage: Usage::default(),
        })
    }
}
