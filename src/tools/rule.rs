//! Rule testing tool.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::mcp::handler::{get_string_arg, success_result, ToolHandler};
use crate::mcp::protocol::{Tool, ToolResult};
use crate::service::SearchService;

/// Tests a YAML rule against an inline snippet before it is used on a project.
pub struct TestMatchCodeRuleTool {
    service: Arc<SearchService>,
}

impl TestMatchCodeRuleTool {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ToolHandler for TestMatchCodeRuleTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "test_match_code_rule".to_string(),
            description: "Test code against an ast-grep YAML rule. Use it to check a rule \
                          before running it on a project. Fails when nothing matches."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "The code to test against the rule"
                    },
                    "yaml": {
                        "type": "string",
                        "description": "The ast-grep YAML rule. It must have id, language and rule fields."
                    }
                },
                "required": ["code", "yaml"]
            }),
        }
    }

    async fn execute(&self, args: HashMap<String, Value>) -> Result<ToolResult> {
        let code = get_string_arg(&args, "code")?;
        let yaml = get_string_arg(&args, "yaml")?;

        let matches = self.service.test_match_code_rule(&code, &yaml).await?;
        Ok(success_result(serde_json::to_string_pretty(&matches)?))
    }
}
