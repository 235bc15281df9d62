//! MCP request and notification handlers.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::mcp::protocol::{Tool, ToolResult};

/// Handler for MCP tool calls.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> Tool;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: HashMap<String, Value>) -> Result<ToolResult>;
}

/// Registry of tool handlers.
pub struct McpHandler {
    tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl McpHandler {
    /// Create a new handler registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool handler.
    pub fn register<T: ToolHandler + 'static>(&mut self, handler: T) {
        let tool = handler.definition();
        self.tools.insert(tool.name.clone(), Arc::new(handler));
    }

    /// Get all registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tools.values().map(|h| h.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    /// Get the number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for McpHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to create a text content block.
pub fn text_content(text: impl Into<String>) -> crate::mcp::protocol::ContentBlock {
    crate::mcp::protocol::ContentBlock::Text { text: text.into() }
}

/// Helper to create a successful tool result.
pub fn success_result(text: impl Into<String>) -> ToolResult {
    ToolResult {
        content: vec![text_content(text)],
        is_error: false,
    }
}

/// Helper to extract a required string argument.
pub fn get_string_arg(args: &HashMap<String, Value>, name: &str) -> Result<String> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| Error::InvalidToolArguments(format!("Missing required argument: {}", name)))
}

/// Helper to extract an optional string argument. `null` counts as absent;
/// any other non-string value is rejected.
pub fn get_optional_string_arg(
    args: &HashMap<String, Value>,
    name: &str,
) -> Result<Option<String>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::invalid_parameter(format!(
            "Argument '{}' must be a string, got {}",
            name, other
        ))),
    }
}

/// Helper to extract an optional integer argument. `null` counts as absent;
/// any other non-integer value is rejected.
pub fn get_optional_int_arg(args: &HashMap<String, Value>, name: &str) -> Result<Option<i64>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| {
            Error::invalid_parameter(format!("Argument '{}' must be an integer, got {}", name, v))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct TestTool {
        name: String,
    }

    #[async_trait]
    impl ToolHandler for TestTool {
        fn definition(&self) -> Tool {
            Tool {
                name: self.name.clone(),
                description: format!("Test tool: {}", self.name),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "input": { "type": "string" }
                    }
                }),
            }
        }

        async fn execute(&self, args: HashMap<String, Value>) -> Result<ToolResult> {
            let input = get_optional_string_arg(&args, "input")?.unwrap_or_default();
            Ok(success_result(format!(
                "Executed {} with: {}",
                self.name, input
            )))
        }
    }

    #[test]
    fn test_handler_registration() {
        let mut handler = McpHandler::new();
        handler.register(TestTool {
            name: "test_tool".to_string(),
        });

        assert_eq!(handler.tool_count(), 1);
        assert!(handler.get_tool("test_tool").is_some());
        assert!(handler.get_tool("nonexistent").is_none());
    }

    #[test]
    fn test_handler_list_tools_sorted() {
        let mut handler = McpHandler::new();
        for name in ["tool_c", "tool_a", "tool_b"] {
            handler.register(TestTool {
                name: name.to_string(),
            });
        }

        let names: Vec<_> = handler.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["tool_a", "tool_b", "tool_c"]);
    }

    #[tokio::test]
    async fn test_tool_execution() {
        let mut handler = McpHandler::new();
        handler.register(TestTool {
            name: "echo".to_string(),
        });

        let tool = handler.get_tool("echo").unwrap();
        let mut args = HashMap::new();
        args.insert("input".to_string(), json!("hello"));

        let result = tool.execute(args).await.unwrap();
        assert!(!result.is_error);

        let crate::mcp::protocol::ContentBlock::Text { text } = &result.content[0];
        assert!(text.contains("Executed echo with: hello"));
    }

    #[test]
    fn test_get_string_arg() {
        let mut args = HashMap::new();
        args.insert("name".to_string(), json!("value"));

        assert_eq!(get_string_arg(&args, "name").unwrap(), "value");
        assert!(get_string_arg(&args, "missing").is_err());
    }

    #[test]
    fn test_get_optional_string_arg() {
        let mut args = HashMap::new();
        args.insert("name".to_string(), json!("value"));
        args.insert("none".to_string(), Value::Null);
        args.insert("number".to_string(), json!(5));
        args.insert("list".to_string(), json!(["ast"]));

        assert_eq!(
            get_optional_string_arg(&args, "name").unwrap(),
            Some("value".to_string())
        );
        assert_eq!(get_optional_string_arg(&args, "missing").unwrap(), None);
        assert_eq!(get_optional_string_arg(&args, "none").unwrap(), None);
        for bad in ["number", "list"] {
            assert!(matches!(
                get_optional_string_arg(&args, bad),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_get_optional_int_arg() {
        let mut args = HashMap::new();
        args.insert("limit".to_string(), json!(42));
        args.insert("offset".to_string(), json!(-1));
        args.insert("none".to_string(), Value::Null);
        args.insert("bad".to_string(), json!("ten"));

        assert_eq!(get_optional_int_arg(&args, "limit").unwrap(), Some(42));
        assert_eq!(get_optional_int_arg(&args, "offset").unwrap(), Some(-1));
        assert_eq!(get_optional_int_arg(&args, "none").unwrap(), None);
        assert_eq!(get_optional_int_arg(&args, "missing").unwrap(), None);
        assert!(matches!(
            get_optional_int_arg(&args, "bad"),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_success_result() {
        let result = success_result("Success!");
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
    }
}
