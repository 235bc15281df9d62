//! ast-grep engine boundary.
//!
//! - `command` - Builds ordered argument lists for each operation
//! - `runner` - Executes them as subprocesses and classifies failures
//! - `types` - Structured match records decoded from `--json` output

pub mod command;
pub mod runner;
pub mod types;

pub use command::{CommandBuilder, DumpFormat, EngineCommand, Operation, Subcommand};
pub use runner::{Dispatch, EngineOutput, EngineRunner, ProcessRunner};
pub use types::{parse_matches, Match, Position, Range};
