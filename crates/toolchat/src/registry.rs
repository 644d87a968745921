use regex::Regex;
use std::collections::HashMap;

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::Tool;
use crate::schema::ToolDef;

fn is_valid_tool_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

/// Mapping from tool name to its declaration, plus the schema list
/// advertised to the model on every request. Registration is the only
/// place schemas are derived, so a bad declaration fails here rather than
/// mid-conversation.
pub struct ToolRegistry {
    tools: HashMap<String, ToolDef>,
    schemas: Vec<Tool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            schemas: Vec::new(),
        }
    }

    /// Register a new tool. Fails if the name is already taken; use
    /// [`ToolRegistry::replace`] to overwrite an existing registration.
    pub fn register(&mut self, def: ToolDef) -> ToolResult<()> {
        if !is_valid_tool_name(def.name()) {
            return Err(ToolError::InvalidName(format!(
                "'{}' must match [a-zA-Z0-9_-]+",
                def.name()
            )));
        }
        if self.tools.contains_key(def.name()) {
            return Err(ToolError::AlreadyRegistered(def.name().to_string()));
        }
        self.schemas.push(def.schema());
        self.tools.insert(def.name().to_string(), def);
        Ok(())
    }

    /// Overwrite a registration, updating the advertised schema entry in
    /// place. Behaves like [`ToolRegistry::register`] when the name is new.
    pub fn replace(&mut self, def: ToolDef) -> ToolResult<()> {
        if !is_valid_tool_name(def.name()) {
            return Err(ToolError::InvalidName(format!(
                "'{}' must match [a-zA-Z0-9_-]+",
                def.name()
            )));
        }
        match self.schemas.iter_mut().find(|s| s.name == def.name()) {
            Some(existing) => *existing = def.schema(),
            None => self.schemas.push(def.schema()),
        }
        self.tools.insert(def.name().to_string(), def);
        Ok(())
    }

    /// Get a tool by name
    pub fn resolve(&self, name: &str) -> Option<&ToolDef> {
        self.tools.get(name)
    }

    /// The schemas advertised to the model, in registration order.
    pub fn schemas(&self) -> &[Tool] {
        &self.schemas
    }

    /// Get tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::Arguments;

    fn tool(name: &str, reply: &'static str) -> ToolDef {
        ToolDef::new(name, move |_args: Arguments| async move {
            Ok(reply.to_string())
        })
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("datetime", "now")).unwrap();
        registry.register(tool("calculate", "4")).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("datetime").is_some());
        assert!(registry.resolve("calculate").is_some());
        assert!(registry.resolve("unknown").is_none());
        assert_eq!(registry.names(), vec!["datetime", "calculate"]);
    }

    #[test]
    fn test_register_rejects_collision() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("echo", "one")).unwrap();

        let result = registry.register(tool("echo", "two"));
        assert!(matches!(result, Err(ToolError::AlreadyRegistered(_))));
        assert_eq!(registry.schemas().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_overwrites_without_duplicating_schema() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("echo", "one")).unwrap();
        registry.replace(tool("echo", "two")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.schemas().len(), 1);
        let output = registry
            .resolve("echo")
            .unwrap()
            .invoke(Arguments::new())
            .await
            .unwrap();
        assert_eq!(output, "two");
    }

    #[test]
    fn test_schemas_len_matches_distinct_names() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("a", "1")).unwrap();
        registry.register(tool("b", "2")).unwrap();
        assert!(registry.register(tool("a", "3")).is_err());
        registry.replace(tool("b", "4")).unwrap();

        assert_eq!(registry.schemas().len(), registry.len());
    }

    #[test]
    fn test_register_rejects_invalid_name() {
        let mut registry = ToolRegistry::new();
        let result = registry.register(tool("not a name", "x"));
        assert!(matches!(result, Err(ToolError::InvalidName(_))));
        assert!(registry.is_empty());
    }
}
