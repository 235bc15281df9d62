//! Search service - runs ast-grep operations on behalf of the MCP tools.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::{
    parse_matches, CommandBuilder, DumpFormat, EngineRunner, Match, Operation, ProcessRunner,
};
use crate::error::{Error, Result};
use crate::service::cache::{PageRequest, PaginationWindow, ResultCache, SearchKey};
use crate::service::languages;

/// How search results are returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::invalid_parameter(format!(
                "Invalid output_format '{}'. Must be 'text' or 'json'",
                other
            ))),
        }
    }
}

/// Façade over command building, engine execution and the result cache.
pub struct SearchService {
    config: Arc<EngineConfig>,
    builder: CommandBuilder,
    runner: Arc<dyn EngineRunner>,
    /// One search at a time: the lock is held across the engine call so
    /// interleaved pagers cannot overwrite each other's snapshot.
    cache: Mutex<ResultCache>,
}

impl SearchService {
    /// Create a service that runs the real engine.
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let runner = Arc::new(ProcessRunner::new(config.timeout()));
        Self::with_runner(config, runner)
    }

    /// Create a service with a custom runner.
    pub fn with_runner(config: Arc<EngineConfig>, runner: Arc<dyn EngineRunner>) -> Self {
        Self {
            builder: CommandBuilder::new(&config),
            config,
            runner,
            cache: Mutex::new(ResultCache::new()),
        }
    }

    /// Dump the syntax tree of `code`. The engine prints it on stderr.
    pub async fn dump_syntax_tree(
        &self,
        code: &str,
        language: &str,
        format: DumpFormat,
    ) -> Result<String> {
        let cmd = self.builder.build(&Operation::DumpSyntax {
            code,
            language,
            format,
        });
        let output = self.runner.run(&cmd).await?;
        Ok(output.stderr.trim().to_string())
    }

    /// Test a rule against a snippet. An empty result is an error here.
    pub async fn test_match_code_rule(&self, code: &str, yaml: &str) -> Result<Vec<Match>> {
        let cmd = self.builder.build(&Operation::TestRule { yaml, code });
        let output = self.runner.run(&cmd).await?;
        let matches = parse_matches(&output.stdout)?;
        if matches.is_empty() {
            return Err(Error::NoMatches);
        }
        Ok(matches)
    }

    /// Pattern search over a folder, served through the result cache.
    pub async fn find_code(
        &self,
        folder: &str,
        pattern: &str,
        language: Option<&str>,
        page: PageRequest,
    ) -> Result<PaginationWindow> {
        let key = SearchKey::pattern(pattern, folder, language);
        let operation = Operation::FindPattern {
            pattern,
            language,
            folder,
        };
        self.windowed(key, &operation, page).await
    }

    /// Rule search over a folder, served through the result cache.
    pub async fn find_code_by_rule(
        &self,
        folder: &str,
        yaml: &str,
        page: PageRequest,
    ) -> Result<PaginationWindow> {
        let key = SearchKey::rule(yaml, folder);
        let operation = Operation::FindRule { yaml, folder };
        self.windowed(key, &operation, page).await
    }

    /// Languages accepted by `language` parameters.
    pub fn supported_languages(&self) -> Vec<String> {
        languages::supported_languages(self.config.config_path.as_deref())
    }

    async fn windowed(
        &self,
        key: SearchKey,
        operation: &Operation<'_>,
        page: PageRequest,
    ) -> Result<PaginationWindow> {
        let cmd = self.builder.build(operation);
        let runner = Arc::clone(&self.runner);

        let mut cache = self.cache.lock().await;
        let window = cache
            .window(key, page, || async move {
                let output = runner.run(&cmd).await?;
                let matches = parse_matches(&output.stdout)?;
                info!("Engine returned {} matches", matches.len());
                Ok(matches)
            })
            .await?;

        debug!(
            "Serving {} of {} matches from offset {}",
            window.metadata.returned, window.metadata.total_matches, window.metadata.offset
        );
        Ok(window)
    }
}
