//! Service layer for the ast-grep MCP server.
//!
//! This module sits between the MCP tools and the engine boundary: it owns
//! the result cache, pagination, text rendering and language discovery.

pub mod cache;
pub mod languages;
pub mod render;
pub mod search;

pub use cache::{PageMetadata, PageRequest, PaginationWindow, ResultCache, SearchKey};
pub use search::{OutputFormat, SearchService};
