//! Error types for the ast-grep MCP server.

use thiserror::Error;

use crate::config::ConfigSource;
use crate::mcp::protocol::error_codes;

/// Result type alias for ast-grep MCP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ast-grep MCP server.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Startup Errors =====
    #[error("Config file '{path}' given by {origin} does not exist")]
    ConfigNotFound { path: String, origin: ConfigSource },

    // ===== Engine Errors =====
    #[error("Command '{0}' not found. Please ensure {0} is installed and in PATH.")]
    ExecutableNotFound(String),

    /// `code` is -1 when the engine was terminated by a signal.
    #[error("Command {command:?} failed with exit code {code}: {stderr}")]
    EngineInvocationFailed {
        command: Vec<String>,
        code: i32,
        stderr: String,
    },

    #[error("Malformed engine output: {0}")]
    MalformedEngineOutput(String),

    #[error("No matches found for the given code and rule. Try adding `stopBy: end` to your inside/has rule.")]
    NoMatches,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // ===== MCP Errors =====
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Internal Errors =====
    #[error("Timeout: operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl Error {
    /// Create an engine failure from a finished process.
    pub fn engine_failed(command: Vec<String>, code: Option<i32>, stderr: &str) -> Self {
        let stderr = stderr.trim();
        Self::EngineInvocationFailed {
            command,
            code: code.unwrap_or(-1),
            stderr: if stderr.is_empty() {
                "(no error output)".to_string()
            } else {
                stderr.to_string()
            },
        }
    }

    /// Create a parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// JSON-RPC error code reported to the client.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::InvalidParameter(_) | Self::InvalidToolArguments(_) => {
                error_codes::INVALID_PARAMS
            }
            Self::ToolNotFound(_) => error_codes::METHOD_NOT_FOUND,
            _ => error_codes::INTERNAL_ERROR,
        }
    }
}
