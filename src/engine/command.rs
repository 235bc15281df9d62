//! Deterministic construction of ast-grep command lines.
//!
//! Building is pure: no I/O happens here. Every invocation has the shape
//! `<engine> <subcommand> [--config <path>] <operation args...>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::error::Error;

/// ast-grep subcommands used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    /// `ast-grep run`, pattern based
    Run,
    /// `ast-grep scan`, rule based
    Scan,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Run => "run",
            Subcommand::Scan => "scan",
        }
    }
}

/// Syntax dump format accepted by `--debug-query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    Pattern,
    #[default]
    Cst,
    Ast,
}

impl DumpFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpFormat::Pattern => "pattern",
            DumpFormat::Cst => "cst",
            DumpFormat::Ast => "ast",
        }
    }
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DumpFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pattern" => Ok(DumpFormat::Pattern),
            "cst" => Ok(DumpFormat::Cst),
            "ast" => Ok(DumpFormat::Ast),
            other => Err(Error::invalid_parameter(format!(
                "Invalid format '{}'. Must be one of: pattern, cst, ast",
                other
            ))),
        }
    }
}

/// A logical engine operation and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Pattern search over a folder.
    FindPattern {
        pattern: &'a str,
        language: Option<&'a str>,
        folder: &'a str,
    },
    /// Inline YAML rule scan over a folder.
    FindRule { yaml: &'a str, folder: &'a str },
    /// Inline YAML rule tested against a code snippet fed through stdin.
    TestRule { yaml: &'a str, code: &'a str },
    /// Syntax tree dump of a snippet.
    DumpSyntax {
        code: &'a str,
        language: &'a str,
        format: DumpFormat,
    },
}

/// A fully built engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    /// Executable to launch
    pub program: String,
    /// Arguments after the executable, starting with the subcommand
    pub args: Vec<String>,
    /// Text written to the engine's stdin
    pub stdin: Option<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Full argv including the executable.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Turns operations into ordered argument lists.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    config_path: Option<PathBuf>,
}

impl CommandBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            program: config.engine.clone(),
            config_path: config.config_path.clone(),
        }
    }

    /// Build the invocation for an operation.
    ///
    /// Searches always request `--json`: windowing and text rendering both
    /// need exact ranges, which the engine's plain-text mode does not give.
    pub fn build(&self, operation: &Operation<'_>) -> EngineCommand {
        match *operation {
            Operation::FindPattern {
                pattern,
                language,
                folder,
            } => {
                let mut args = self.start(Subcommand::Run);
                args.extend(["--pattern".to_string(), pattern.to_string()]);
                if let Some(lang) = language.filter(|l| !l.is_empty()) {
                    args.extend(["--lang".to_string(), lang.to_string()]);
                }
                args.push("--json".to_string());
                args.push(folder.to_string());
                EngineCommand::new(&self.program, args)
            }
            Operation::FindRule { yaml, folder } => {
                let mut args = self.start(Subcommand::Scan);
                args.extend([
                    "--inline-rules".to_string(),
                    yaml.to_string(),
                    "--json".to_string(),
                    folder.to_string(),
                ]);
                EngineCommand::new(&self.program, args)
            }
            Operation::TestRule { yaml, code } => {
                let mut args = self.start(Subcommand::Scan);
                args.extend([
                    "--inline-rules".to_string(),
                    yaml.to_string(),
                    "--json".to_string(),
                    "--stdin".to_string(),
                ]);
                EngineCommand::new(&self.program, args).with_stdin(code)
            }
            Operation::DumpSyntax {
                code,
                language,
                format,
            } => {
                let mut args = self.start(Subcommand::Run);
                args.extend([
                    "--pattern".to_string(),
                    code.to_string(),
                    "--lang".to_string(),
                    language.to_string(),
                    format!("--debug-query={}", format),
                ]);
                EngineCommand::new(&self.program, args)
            }
        }
    }

    /// Subcommand token followed by the injected `--config` pair, if any.
    fn start(&self, subcommand: Subcommand) -> Vec<String> {
        let mut args = vec![subcommand.as_str().to_string()];
        if let Some(path) = &self.config_path {
            args.push("--config".to_string());
            args.push(path.display().to_string());
        }
        args
    }
}
