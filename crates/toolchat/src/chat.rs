use anyhow::Result;
use futures::stream::BoxStream;

use crate::errors::{ToolError, ToolResult};
use crate::models::message::{Message, ToolRequest};
use crate::observer::Observer;
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;
use crate::schema::ToolDef;

pub const DEFAULT_MAX_TOKENS: i32 = 4096;
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Controls how long [`Chat::tool_loop`] keeps going.
pub struct LoopConfig {
    max_steps: usize,
    continue_fn: Option<Box<dyn Fn(&Message) -> bool + Send + Sync>>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            continue_fn: None,
        }
    }
}

impl LoopConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of tool execution rounds. The initial model call is
    /// unconditional and does not count against this budget, so a cap of
    /// zero still produces one reply.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Stop the loop once the predicate returns false for the latest reply.
    pub fn continue_while<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.continue_fn = Some(Box::new(predicate));
        self
    }
}

/// A conversation with a model that can execute tools on its behalf.
///
/// Owns the full message history and the tool registry. History grows only
/// by committed request/reply pairs: if the provider call fails, the
/// prospective outgoing message is rolled back and the history is exactly
/// what it was before the call.
pub struct Chat {
    provider: Box<dyn Provider>,
    model: String,
    max_tokens: i32,
    registry: ToolRegistry,
    history: Vec<Message>,
    observer: Option<Box<dyn Observer>>,
}

impl Chat {
    /// Create a new Chat against the given provider and model
    pub fn new(provider: Box<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            registry: ToolRegistry::new(),
            history: Vec::new(),
            observer: None,
        }
    }

    /// Set the default per-call output token budget
    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Attach an observability sink
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Register a tool function. Fails on a name collision; see
    /// [`Chat::replace_tool`].
    pub fn register_tool(&mut self, def: ToolDef) -> ToolResult<()> {
        self.registry.register(def)
    }

    /// Register a tool function, overwriting any existing registration
    /// under the same name.
    pub fn replace_tool(&mut self, def: ToolDef) -> ToolResult<()> {
        self.registry.replace(def)
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Send a message and get a response.
    pub async fn send(&mut self, user_text: impl Into<String>) -> Result<Message> {
        self.send_with_budget(user_text, self.max_tokens).await
    }

    /// Send a message with an explicit output token budget for this call.
    pub async fn send_with_budget(
        &mut self,
        user_text: impl Into<String>,
        max_tokens: i32,
    ) -> Result<Message> {
        self.exchange(Message::user().with_text(user_text), max_tokens)
            .await
    }

    /// Submit one outgoing message together with the full history and tool
    /// schema snapshot. The outgoing message and the reply are committed to
    /// history as a pair, or not at all.
    async fn exchange(&mut self, outgoing: Message, max_tokens: i32) -> Result<Message> {
        self.history.push(outgoing);

        if let Some(observer) = &self.observer {
            observer.on_request(&self.model, self.history.len(), self.registry.len());
        }

        let reply = match self
            .provider
            .complete(
                &self.model,
                &self.history,
                self.registry.schemas(),
                max_tokens,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                self.history.pop();
                return Err(e);
            }
        };

        if let Some(observer) = &self.observer {
            observer.on_reply(&reply.message, &reply.stop_reason, &reply.usage);
        }

        self.history.push(reply.message.clone());
        Ok(reply.message)
    }

    /// Execute one tool request. Never fails: an unknown tool or a failing
    /// handler becomes an error text the model can react to.
    async fn dispatch(&self, request: &ToolRequest) -> String {
        let call = &request.call;

        let Some(def) = self.registry.resolve(&call.name) else {
            if let Some(observer) = &self.observer {
                let outcome = Err(ToolError::ToolNotFound(call.name.clone()));
                observer.on_tool_execution(&call.name, &call.arguments, &outcome);
            }
            return format!("Error: Unknown tool {}", call.name);
        };

        let outcome = def.invoke(call.arguments.clone()).await;
        if let Some(observer) = &self.observer {
            observer.on_tool_execution(&call.name, &call.arguments, &outcome);
        }

        match outcome {
            Ok(output) => output,
            Err(e) => format!("Error: {}", e),
        }
    }

    /// Execute a tool loop: send the message, execute any tools the reply
    /// asks for, resubmit, and repeat until the reply requests nothing, the
    /// continuation predicate says stop, or the step budget runs out.
    ///
    /// Returns a lazy stream of assistant replies, one per model call; at
    /// least one reply is always produced. Tool failures are folded into
    /// the conversation as error text; a provider failure ends the stream
    /// with the error.
    pub fn tool_loop<'a>(
        &'a mut self,
        user_text: impl Into<String>,
        config: LoopConfig,
    ) -> BoxStream<'a, Result<Message>> {
        let user_text = user_text.into();
        let max_tokens = self.max_tokens;

        Box::pin(async_stream::try_stream! {
            let mut reply = self.send_with_budget(user_text, max_tokens).await?;
            yield reply.clone();

            for _ in 0..config.max_steps {
                if let Some(continue_fn) = &config.continue_fn {
                    if !continue_fn(&reply) {
                        break;
                    }
                }

                let requests: Vec<ToolRequest> =
                    reply.tool_requests().into_iter().cloned().collect();
                if requests.is_empty() {
                    break;
                }

                // One user message answers every request of this round, in
                // request order.
                let mut results = Message::user();
                for request in &requests {
                    let output = self.dispatch(request).await;
                    results = results.with_tool_response(request.id.clone(), output);
                }

                reply = self.exchange(results, max_tokens).await?;
                yield reply.clone();
            }
        })
    }
}
