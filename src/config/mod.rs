//! Configuration management for the ast-grep MCP server.
//!
//! The only engine-facing setting is an optional `sgconfig.yaml` path. It is
//! resolved once at startup with `--config` taking precedence over the
//! `AST_GREP_CONFIG` environment variable, and is read-only afterwards.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable consulted when `--config` is absent.
pub const CONFIG_ENV: &str = "AST_GREP_CONFIG";

/// Default engine executable.
pub const DEFAULT_ENGINE: &str = "ast-grep";

/// Command-line arguments for the ast-grep MCP server.
#[derive(Parser, Debug, Clone)]
#[command(name = "ast-grep-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ast-grep MCP server - structural code search via the Model Context Protocol")]
#[command(after_help = "environment variables:\n  AST_GREP_CONFIG    Path to sgconfig.yaml file (overridden by --config flag)")]
pub struct Args {
    /// Path to sgconfig.yaml for customizing ast-grep behavior (language mappings, rule directories, etc.)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// ast-grep executable to invoke
    #[arg(long, default_value = DEFAULT_ENGINE, env = "AST_GREP_BIN")]
    pub engine: String,

    /// Kill engine invocations that run longer than this many seconds
    #[arg(
        long,
        value_name = "SECS",
        env = "AST_GREP_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, env = "AST_GREP_MCP_DEBUG")]
    pub debug: bool,
}

/// Where a configuration path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Flag,
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Flag => write!(f, "--config flag"),
            ConfigSource::Environment => write!(f, "{} environment variable", CONFIG_ENV),
        }
    }
}

/// Effective engine configuration, shared read-only by every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Resolved sgconfig.yaml path, injected as `--config` into every invocation
    pub config_path: Option<PathBuf>,
    /// Engine executable name or path
    pub engine: String,
    /// Optional per-invocation timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl EngineConfig {
    /// Build the configuration from parsed arguments and the process environment.
    pub fn from_args(args: &Args) -> Result<Self> {
        let config_path = resolve_config_path(args.config.clone(), std::env::var_os(CONFIG_ENV))?;
        Ok(Self {
            config_path,
            engine: args.engine.clone(),
            timeout_secs: args.timeout,
        })
    }

    /// Configuration with an explicit sgconfig path and defaults elsewhere.
    pub fn with_config_path(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            engine: DEFAULT_ENGINE.to_string(),
            timeout_secs: None,
        }
    }
}

/// Resolve the sgconfig path: explicit flag wins over the environment value.
///
/// A candidate that does not exist on disk is fatal. An empty environment
/// value is treated as unset.
pub fn resolve_config_path(
    flag: Option<PathBuf>,
    env_value: Option<OsString>,
) -> Result<Option<PathBuf>> {
    let candidate = match (flag, env_value) {
        (Some(path), _) => Some((path, ConfigSource::Flag)),
        (None, Some(value)) if !value.is_empty() => {
            Some((PathBuf::from(value), ConfigSource::Environment))
        }
        _ => None,
    };

    match candidate {
        Some((path, origin)) if !path.exists() => Err(Error::ConfigNotFound {
            path: path.display().to_string(),
            origin,
        }),
        Some((path, _)) => Ok(Some(path)),
        None => Ok(None),
    }
}
