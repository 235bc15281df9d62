//! Syntax inspection tools: tree dumps and the language list.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::DumpFormat;
use crate::error::Result;
use crate::mcp::handler::{get_optional_string_arg, get_string_arg, success_result, ToolHandler};
use crate::mcp::protocol::{Tool, ToolResult};
use crate::service::SearchService;

/// Dumps the syntax tree of code, or how ast-grep reads a pattern.
pub struct DumpSyntaxTreeTool {
    service: Arc<SearchService>,
    languages: Vec<String>,
}

impl DumpSyntaxTreeTool {
    pub fn new(service: Arc<SearchService>) -> Self {
        let languages = service.supported_languages();
        Self { service, languages }
    }
}

#[async_trait]
impl ToolHandler for DumpSyntaxTreeTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "dump_syntax_tree".to_string(),
            description: "Dump code's syntax structure or a pattern's structure. Useful for \
                          finding the right node kinds while debugging a rule. Use format=cst \
                          to inspect target code, format=pattern to see how ast-grep reads a pattern."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "The code or pattern to dump"
                    },
                    "language": {
                        "type": "string",
                        "description": format!(
                            "The language of the code. Supported: {}",
                            self.languages.join(", ")
                        )
                    },
                    "format": {
                        "type": "string",
                        "enum": ["pattern", "cst", "ast"],
                        "description": "Dump format",
                        "default": "cst"
                    }
                },
                "required": ["code", "language"]
            }),
        }
    }

    async fn execute(&self, args: HashMap<String, Value>) -> Result<ToolResult> {
        let code = get_string_arg(&args, "code")?;
        let language = get_string_arg(&args, "language")?;
        let format = match get_optional_string_arg(&args, "format")? {
            Some(s) => s.parse()?,
            None => DumpFormat::default(),
        };

        let tree = self
            .service
            .dump_syntax_tree(&code, &language, format)
            .await?;
        Ok(success_result(tree))
    }
}

/// Lists languages accepted by the `language` parameters.
pub struct SupportedLanguagesTool {
    service: Arc<SearchService>,
}

impl SupportedLanguagesTool {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ToolHandler for SupportedLanguagesTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "supported_languages".to_string(),
            description: "List the languages ast-grep can parse, including custom languages \
                          declared in the configured sgconfig.yaml."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn execute(&self, _args: HashMap<String, Value>) -> Result<ToolResult> {
        let languages = self.service.supported_languages();
        Ok(success_result(serde_json::to_string_pretty(&languages)?))
    }
}
