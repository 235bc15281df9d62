//! MCP tool implementations.
//!
//! - `search` - Structural search over a project (`find_code`, `find_code_by_rule`)
//! - `rule` - Rule testing against a snippet (`test_match_code_rule`)
//! - `syntax` - Syntax tree dumps and the language list

pub mod rule;
pub mod search;
pub mod syntax;

use std::sync::Arc;

use crate::mcp::handler::McpHandler;
use crate::service::SearchService;

/// Register all tools with the handler.
pub fn register_all_tools(handler: &mut McpHandler, service: Arc<SearchService>) {
    handler.register(syntax::DumpSyntaxTreeTool::new(service.clone()));
    handler.register(syntax::SupportedLanguagesTool::new(service.clone()));
    handler.register(rule::TestMatchCodeRuleTool::new(service.clone()));
    handler.register(search::FindCodeTool::new(service.clone()));
    handler.register(search::FindCodeByRuleTool::new(service));
}
