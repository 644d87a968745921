use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, ProviderReply, StopReason, Usage};
use super::configs::AnthropicProviderConfig;
use super::utils::{
    anthropic_response_to_message, messages_to_anthropic_spec, tools_to_anthropic_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

const ANTHROPIC_API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from ANTHROPIC_API_KEY and optional ANTHROPIC_HOST.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable is required"))?;
        let host =
            std::env::var("ANTHROPIC_HOST").unwrap_or_else(|_| ANTHROPIC_HOST.to_string());

        Self::new(AnthropicProviderConfig { host, api_key })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = data.get("usage");

        let input_tokens = usage
            .and_then(|u| u.get("input_tokens"))
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .and_then(|u| u.get("output_tokens"))
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => {
                let error_text = response.text().await?;
                Err(anyhow!("Request failed: {}", error_text))
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: i32,
    ) -> Result<ProviderReply> {
        let mut payload = json!({
            "model": model,
            "max_tokens": max_tokens,
            "messages": messages_to_anthropic_spec(messages),
        });

        let tools_spec = tools_to_anthropic_spec(tools)?;
        if !tools_spec.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), json!(tools_spec));
        }

        let response = self.post(payload).await?;

        let message = anthropic_response_to_message(&response)?;
        let stop_reason = StopReason::parse(response.get("stop_reason").and_then(|v| v.as_str()));
        let usage = Self::get_usage(&response);

        Ok(ProviderReply {
            message,
            stop_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server(response_body: Value) -> (MockServer, AnthropicProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test_api_key"))
            .and(header("anthropic-version", ANTHROPIC_API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let config = AnthropicProviderConfig {
            host: mock_server.uri(),
            api_key: "test_api_key".to_string(),
        };

        let provider = AnthropicProvider::new(config).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_complete_basic() -> Result<()> {
        let response_body = json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "text",
                "text": "Hello! How can I assist you today?"
            }],
            "model": ANTHROPIC_DEFAULT_MODEL,
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {
                "input_tokens": 12,
                "output_tokens": 15
            }
        });

        let (_, provider) = setup_mock_server(response_body).await;

        let messages = vec![Message::user().with_text("Hello?")];

        let reply = provider
            .complete(ANTHROPIC_DEFAULT_MODEL, &messages, &[], 4096)
            .await?;

        assert_eq!(
            reply.message.content[0].as_text(),
            Some("Hello! How can I assist you today?")
        );
        assert_eq!(reply.stop_reason, StopReason::EndTurn);
        assert_eq!(reply.usage.input_tokens, Some(12));
        assert_eq!(reply.usage.output_tokens, Some(15));
        assert_eq!(reply.usage.total_tokens, Some(27));

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_tool_use() -> Result<()> {
        let response_body = json!({
            "id": "msg_456",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me look that up."},
                {
                    "type": "tool_use",
                    "id": "toolu_1",
                    "name": "get_order",
                    "input": {"order_id": "O1"}
                }
            ],
            "model": ANTHROPIC_DEFAULT_MODEL,
            "stop_reason": "tool_use",
            "stop_sequence": null,
            "usage": {
                "input_tokens": 40,
                "output_tokens": 22
            }
        });

        let (_, provider) = setup_mock_server(response_body).await;

        let tool = Tool::new(
            "get_order",
            "Get order details by order ID",
            json!({
                "type": "object",
                "properties": {"order_id": {"type": "string"}},
                "required": ["order_id"]
            }),
        );
        let messages = vec![Message::user().with_text("What's in order O1?")];

        let reply = provider
            .complete(ANTHROPIC_DEFAULT_MODEL, &messages, &[tool], 4096)
            .await?;

        assert_eq!(reply.stop_reason, StopReason::ToolUse);
        let requests = reply.message.tool_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "toolu_1");
        assert_eq!(requests[0].call.name, "get_order");
        assert_eq!(requests[0].call.arguments.get("order_id"), Some("O1"));

        Ok(())
    }
}
