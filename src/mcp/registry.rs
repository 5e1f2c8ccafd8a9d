// src/mcp/registry.rs

use crate::mcp::{
    protocol::ContentBlock,
    schema::{ParameterSchema, ValidatedArgs},
};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

pub type ToolResult = anyhow::Result<Vec<ContentBlock>>;
pub type ToolHandler = Arc<dyn Fn(ValidatedArgs) -> BoxFuture<'static, ToolResult> + Send + Sync>;
pub type OperationLabel = Arc<dyn Fn(&ValidatedArgs) -> String + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a tool named '{0}' is already registered")]
    DuplicateTool(String),
    #[error("no tool named '{0}' is registered")]
    NotFound(String),
}

/// A named operation exposed to the calling agent.
#[derive(Clone)]
pub struct ToolDefinition {
    name: String,
    description: String,
    schema: ParameterSchema,
    operation: OperationLabel,
    handler: ToolHandler,
}

impl ToolDefinition {
    /// `operation` is the phrase used in failure messages, as in
    /// "Failed to <operation>. Error: ...".
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ParameterSchema,
        operation: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(ValidatedArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        let operation = operation.into();
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            operation: Arc::new(move |_: &ValidatedArgs| operation.clone()),
            handler: Arc::new(move |args: ValidatedArgs| -> BoxFuture<'static, ToolResult> {
                Box::pin(handler(args))
            }),
        }
    }

    /// Replaces the static operation phrase with one derived from the arguments.
    pub fn with_operation_label<L>(mut self, label: L) -> Self
    where
        L: Fn(&ValidatedArgs) -> String + Send + Sync + 'static,
    {
        self.operation = Arc::new(label);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    pub fn operation(&self, args: &ValidatedArgs) -> String {
        (self.operation)(args)
    }

    pub fn call(&self, args: ValidatedArgs) -> BoxFuture<'static, ToolResult> {
        (self.handler)(args)
    }

    /// Entry for the `tools/list` catalog.
    pub fn advertisement(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.schema.to_json_schema(),
        })
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Registry of available tools.
///
/// Populated once at startup and read-only afterwards, so it is shared
/// behind an `Arc` without locking.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. An existing registration under the same name is left untouched.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), RegistryError> {
        if self.index.contains_key(definition.name()) {
            return Err(RegistryError::DuplicateTool(definition.name().to_string()));
        }
        self.index
            .insert(definition.name().to_string(), self.tools.len());
        self.tools.push(definition);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ToolDefinition, RegistryError> {
        self.index
            .get(name)
            .map(|&position| &self.tools[position])
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// All tools in registration order.
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolDefinition::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::schema::{ParamKind, ParamSpec};

    fn echo_tool(name: &str, description: &str) -> ToolDefinition {
        ToolDefinition::new(
            name,
            description,
            ParameterSchema::new().field("text", ParamSpec::required(ParamKind::String)),
            "echo text",
            |args: ValidatedArgs| async move {
                Ok(vec![ContentBlock::text(args.str("text").unwrap_or_default())])
            },
        )
    }

    #[test]
    fn test_lookup_returns_registered_definition() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo", "Echo text")).unwrap();

        let tool = registry.lookup("echo").unwrap();
        assert_eq!(tool.name(), "echo");
        assert_eq!(tool.description(), "Echo text");
        assert!(tool.schema().get("text").is_some());
    }

    #[test]
    fn test_lookup_unknown_name_fails() {
        let registry = ToolRegistry::new();
        assert_eq!(
            registry.lookup("missing").unwrap_err(),
            RegistryError::NotFound("missing".into())
        );
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo", "first")).unwrap();

        let err = registry.register(echo_tool("echo", "second")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("echo".into()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("echo").unwrap().description(), "first");
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(echo_tool(name, name)).unwrap();
        }
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_operation_label_uses_arguments() {
        let tool = echo_tool("echo", "Echo").with_operation_label(|args| {
            format!("echo '{}'", args.str("text").unwrap_or("?"))
        });
        let args = crate::mcp::schema::validate(tool.schema(), &json!({ "text": "hi" })).unwrap();
        assert_eq!(tool.operation(&args), "echo 'hi'");
    }

    #[tokio::test]
    async fn test_call_runs_handler() {
        let tool = echo_tool("echo", "Echo");
        let args = crate::mcp::schema::validate(tool.schema(), &json!({ "text": "hi" })).unwrap();
        let content = tool.call(args).await.unwrap();
        assert_eq!(content, vec![ContentBlock::text("hi")]);
    }
}
