use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::models::message::{Message, MessageContent};
use crate::models::tool::{Arguments, Tool, ToolCall};

/// Convert internal Message format to the Anthropic Messages API
/// specification. Block order within each message is preserved.
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut content = Vec::new();
        for block in &message.content {
            match block {
                MessageContent::Text(text) => {
                    content.push(json!({
                        "type": "text",
                        "text": text.text,
                    }));
                }
                MessageContent::ToolRequest(request) => {
                    content.push(json!({
                        "type": "tool_use",
                        "id": request.id,
                        "name": request.call.name,
                        "input": arguments_to_json(&request.call.arguments),
                    }));
                }
                MessageContent::ToolResponse(response) => {
                    content.push(json!({
                        "type": "tool_result",
                        "tool_use_id": response.id,
                        "content": response.output,
                    }));
                }
            }
        }

        messages_spec.push(json!({
            "role": message.role,
            "content": content,
        }));
    }

    messages_spec
}

/// Convert internal Tool format to the Anthropic API tool specification
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.input_schema,
        }));
    }

    Ok(result)
}

/// Convert an Anthropic Messages API response body to the internal Message
/// format. Unrecognized block types are dropped.
pub fn anthropic_response_to_message(response: &Value) -> Result<Message> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid response format: missing content array"))?;

    let mut message = Message::assistant();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                let text = block.get("text").and_then(|t| t.as_str()).unwrap_or_default();
                message = message.with_text(text);
            }
            Some("tool_use") => {
                let id = block.get("id").and_then(|v| v.as_str()).unwrap_or_default();
                let name = block
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                let arguments = json_to_arguments(block.get("input"));
                message = message.with_tool_request(id, ToolCall::new(name, arguments));
            }
            _ => {}
        }
    }

    Ok(message)
}

/// Flatten a tool_use input object into the string-typed argument map.
/// Non-string values are rendered as their JSON text.
pub fn json_to_arguments(input: Option<&Value>) -> Arguments {
    match input.and_then(|v| v.as_object()) {
        Some(object) => object
            .iter()
            .map(|(name, value)| (name.clone(), value_to_string(value)))
            .collect(),
        None => Arguments::new(),
    }
}

/// Render the string-typed argument map as a plain JSON object.
fn arguments_to_json(arguments: &Arguments) -> Value {
    serde_json::to_value(arguments).unwrap_or(Value::Null)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
