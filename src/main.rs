//! ast-grep MCP Server
//!
//! Exposes ast-grep structural search to MCP clients over stdio.

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ast_grep_mcp::config::{Args, EngineConfig};
use ast_grep_mcp::error::Result;
use ast_grep_mcp::mcp::handler::McpHandler;
use ast_grep_mcp::mcp::server::McpServer;
use ast_grep_mcp::mcp::transport::StdioTransport;
use ast_grep_mcp::service::SearchService;
use ast_grep_mcp::tools;
use ast_grep_mcp::{SERVER_NAME, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout belongs to the protocol
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match EngineConfig::from_args(&args) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("ast-grep MCP Server v{}", VERSION);
    info!("Engine: {}", config.engine);
    match &config.config_path {
        Some(path) => info!("Using config: {}", path.display()),
        None => info!("No sgconfig.yaml configured, using engine defaults"),
    }

    let service = Arc::new(SearchService::new(config));

    let mut handler = McpHandler::new();
    tools::register_all_tools(&mut handler, service);
    info!("Registered {} MCP tools", handler.tool_count());

    let server = McpServer::new(handler, SERVER_NAME);
    server.run(StdioTransport::new()).await?;

    Ok(())
}
