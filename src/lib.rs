//! ast-grep MCP Server
//!
//! A Model Context Protocol (MCP) server that lets AI agents run ast-grep
//! structural code search and rule tests against a codebase.
//!
//! # Architecture
//!
//! 1. **Config Layer** (`config`) - CLI arguments and sgconfig.yaml resolution
//! 2. **Engine Layer** (`engine`) - Command building and subprocess execution
//! 3. **Service Layer** (`service`) - Result cache, pagination, rendering
//! 4. **MCP Layer** (`mcp`) - Protocol implementation, stdio transport
//! 5. **Tools Layer** (`tools`) - The tools exposed to clients
//!
//! The engine is always asked for `--json`. Matches are cached per search so
//! agents can page through large result sets, and rendered as compact
//! `file:line` text blocks unless the caller wants the structured form.

pub mod config;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod service;
pub mod tools;

pub use error::{Error, Result};

/// Server version reported during MCP initialization.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name reported during MCP initialization.
pub const SERVER_NAME: &str = "ast-grep";
