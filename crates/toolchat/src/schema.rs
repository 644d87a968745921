use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::json;

use crate::errors::ToolResult;
use crate::models::tool::{Arguments, Tool};

type Handler = Arc<dyn Fn(Arguments) -> BoxFuture<'static, ToolResult<String>> + Send + Sync>;

#[derive(Clone)]
struct Param {
    name: String,
    default: Option<String>,
}

/// Declaration of a callable tool: the metadata its advertised schema is
/// derived from, plus the handler itself. Parameters keep declaration
/// order; a parameter is required iff it has no default value.
#[derive(Clone)]
pub struct ToolDef {
    name: String,
    docs: Option<String>,
    params: Vec<Param>,
    handler: Handler,
}

impl ToolDef {
    pub fn new<S, F, Fut>(name: S, handler: F) -> Self
    where
        S: Into<String>,
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult<String>> + Send + 'static,
    {
        ToolDef {
            name: name.into(),
            docs: None,
            params: Vec::new(),
            handler: Arc::new(move |arguments| Box::pin(handler(arguments))),
        }
    }

    /// Attach documentation. The first line becomes the schema description.
    pub fn docs<S: Into<String>>(mut self, docs: S) -> Self {
        self.docs = Some(docs.into());
        self
    }

    /// Declare a required parameter.
    pub fn param<S: Into<String>>(mut self, name: S) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Declare an optional parameter with a default value.
    pub fn param_with_default<S, D>(mut self, name: S, default: D) -> Self
    where
        S: Into<String>,
        D: Into<String>,
    {
        self.params.push(Param {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Derive the schema advertised to the model. Pure function of the
    /// declaration; the handler is never invoked.
    pub fn schema(&self) -> Tool {
        let description = self
            .docs
            .as_deref()
            .and_then(|docs| docs.lines().next())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("Execute {}", self.name));

        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            properties.insert(param.name.clone(), json!({"type": "string"}));
            if param.default.is_none() {
                required.push(param.name.clone());
            }
        }

        Tool::new(
            &self.name,
            description,
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        )
    }

    /// Run the handler with the supplied arguments, filling in declared
    /// defaults for optional parameters the model left out.
    pub async fn invoke(&self, mut arguments: Arguments) -> ToolResult<String> {
        for param in &self.params {
            if let Some(default) = &param.default {
                if !arguments.contains(&param.name) {
                    arguments.insert(&param.name, default);
                }
            }
        }
        (self.handler)(arguments).await
    }
}

impl fmt::Debug for ToolDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDef")
            .field("name", &self.name)
            .field("docs", &self.docs)
            .field(
                "params",
                &self.params.iter().map(|p| &p.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
