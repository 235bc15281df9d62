//! Structural search tools: `find_code` and `find_code_by_rule`.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::mcp::handler::{
    get_optional_int_arg, get_optional_string_arg, get_string_arg, success_result, ToolHandler,
};
use crate::mcp::protocol::{Tool, ToolResult};
use crate::service::render::render_window;
use crate::service::{OutputFormat, PageRequest, PaginationWindow, SearchService};

const PAGING_NOTE: &str = "Matches are cached per search: offset=0 always runs a fresh search, \
later offsets page through the same snapshot. Use limit or max_results to keep responses small \
(50-100 is a good start) and follow the offset hint while more matches remain.";

/// Common pagination and output arguments.
struct WindowArgs {
    page: PageRequest,
    format: OutputFormat,
}

impl WindowArgs {
    /// Validate everything up front so bad input never reaches the engine.
    fn parse(args: &HashMap<String, Value>) -> Result<Self> {
        let format = match get_optional_string_arg(args, "output_format")? {
            Some(s) => s.parse()?,
            None => OutputFormat::default(),
        };

        let offset = get_optional_int_arg(args, "offset")?.unwrap_or(0);
        let limit = get_optional_int_arg(args, "limit")?;
        let max_results = match get_optional_int_arg(args, "max_results")? {
            Some(n) if n <= 0 => {
                return Err(Error::invalid_parameter(format!(
                    "max_results must be positive, got {}",
                    n
                )))
            }
            other => other.map(|n| n as usize),
        };

        Ok(Self {
            page: PageRequest::new(offset, limit)?.capped(max_results),
            format,
        })
    }

    fn respond(&self, window: &PaginationWindow) -> Result<ToolResult> {
        match self.format {
            OutputFormat::Text => Ok(success_result(render_window(window))),
            OutputFormat::Json => Ok(success_result(serde_json::to_string_pretty(window)?)),
        }
    }
}

fn window_properties() -> serde_json::Map<String, Value> {
    let props = serde_json::json!({
        "max_results": {
            "type": "integer",
            "description": "Maximum number of complete matches to return"
        },
        "offset": {
            "type": "integer",
            "description": "Number of matches to skip. Use 0 for a fresh search, >0 to page.",
            "default": 0
        },
        "limit": {
            "type": "integer",
            "description": "Page size. Omit to return all remaining matches."
        },
        "output_format": {
            "type": "string",
            "enum": ["text", "json"],
            "description": "'text' (default) is compact file:line headers plus matched code; 'json' is full match objects with pagination metadata",
            "default": "text"
        }
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Pattern search tool.
pub struct FindCodeTool {
    service: Arc<SearchService>,
    languages: Vec<String>,
}

impl FindCodeTool {
    pub fn new(service: Arc<SearchService>) -> Self {
        let languages = service.supported_languages();
        Self { service, languages }
    }
}

#[async_trait]
impl ToolHandler for FindCodeTool {
    fn definition(&self) -> Tool {
        let mut properties = serde_json::json!({
            "project_folder": {
                "type": "string",
                "description": "The absolute path to the project folder to search"
            },
            "pattern": {
                "type": "string",
                "description": "The ast-grep pattern to search for. It must be a valid AST, e.g. 'def $NAME($$$)'"
            },
            "language": {
                "type": "string",
                "description": format!(
                    "The language of the pattern. Supported: {}. Inferred from file extensions when omitted.",
                    self.languages.join(", ")
                )
            }
        });
        if let Value::Object(map) = &mut properties {
            map.extend(window_properties());
        }

        Tool {
            name: "find_code".to_string(),
            description: format!(
                "Find code in a project folder that matches an ast-grep pattern. \
                 Patterns suit simple, single-node searches; use find_code_by_rule for \
                 relational or composite queries. {}",
                PAGING_NOTE
            ),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": ["project_folder", "pattern"]
            }),
        }
    }

    async fn execute(&self, args: HashMap<String, Value>) -> Result<ToolResult> {
        let folder = get_string_arg(&args, "project_folder")?;
        let pattern = get_string_arg(&args, "pattern")?;
        let language = get_optional_string_arg(&args, "language")?;
        let window_args = WindowArgs::parse(&args)?;

        let window = self
            .service
            .find_code(&folder, &pattern, language.as_deref(), window_args.page)
            .await?;
        window_args.respond(&window)
    }
}

/// YAML rule search tool.
pub struct FindCodeByRuleTool {
    service: Arc<SearchService>,
}

impl FindCodeByRuleTool {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ToolHandler for FindCodeByRuleTool {
    fn definition(&self) -> Tool {
        let mut properties = serde_json::json!({
            "project_folder": {
                "type": "string",
                "description": "The absolute path to the project folder to search"
            },
            "yaml": {
                "type": "string",
                "description": "The ast-grep YAML rule. It must have id, language and rule fields."
            }
        });
        if let Value::Object(map) = &mut properties {
            map.extend(window_properties());
        }

        Tool {
            name: "find_code_by_rule".to_string(),
            description: format!(
                "Find code in a project folder using an ast-grep YAML rule. Rules can express \
                 relational searches such as a node inside or having another node. Add \
                 `stopBy: end` to inside/has rules for complete traversal. {}",
                PAGING_NOTE
            ),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": ["project_folder", "yaml"]
            }),
        }
    }

    async fn execute(&self, args: HashMap<String, Value>) -> Result<ToolResult> {
        let folder = get_string_arg(&args, "project_folder")?;
        let yaml = get_string_arg(&args, "yaml")?;
        let window_args = WindowArgs::parse(&args)?;

        let window = self
            .service
            .find_code_by_rule(&folder, &yaml, window_args.page)
            .await?;
        window_args.respond(&window)
    }
}
