use tracing::{debug, error, info};

use crate::errors::ToolResult;
use crate::models::message::Message;
use crate::models::tool::Arguments;
use crate::providers::base::{StopReason, Usage};

/// Side channel for reporting what the orchestrator is doing. Every method
/// defaults to a no-op and returns nothing, so a sink can never alter the
/// exchange it is watching.
pub trait Observer: Send + Sync {
    /// An outgoing request is about to be submitted.
    fn on_request(&self, _model: &str, _message_count: usize, _tool_count: usize) {}

    /// A reply arrived and was committed to history.
    fn on_reply(&self, _reply: &Message, _stop_reason: &StopReason, _usage: &Usage) {}

    /// One tool execution finished, successfully or not. Unknown tools are
    /// reported here too.
    fn on_tool_execution(&self, _name: &str, _arguments: &Arguments, _outcome: &ToolResult<String>) {
    }
}

/// Observer that reports through the `tracing` crate.
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_request(&self, model: &str, message_count: usize, tool_count: usize) {
        debug!(model, message_count, tool_count, "sending request");
    }

    fn on_reply(&self, reply: &Message, stop_reason: &StopReason, usage: &Usage) {
        info!(
            blocks = reply.content.len(),
            stop_reason = %stop_reason,
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            "received reply"
        );
    }

    fn on_tool_execution(&self, name: &str, arguments: &Arguments, outcome: &ToolResult<String>) {
        match outcome {
            Ok(output) => info!(tool = name, ?arguments, output = %output, "tool executed"),
            Err(e) => error!(tool = name, ?arguments, error = %e, "tool execution failed"),
        }
    }
}
