//! Wire types for ast-grep's `--json` output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A 0-based position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u64,
    #[serde(default)]
    pub column: u64,
}

/// Start/end span of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
    /// Fields such as `byteOffset`, kept as the engine sent them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One structural hit reported by the engine.
///
/// Matches are never edited; only sliced and rendered. Fields the engine
/// emits beyond the ones modelled here survive a round trip through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Path of the matched file
    pub file: String,
    pub range: Range,
    /// Verbatim matched source
    pub text: String,
    /// Captured metavariables (`single`/`multi`/`transformed` in ast-grep)
    #[serde(rename = "metaVariables", default, skip_serializing_if = "Option::is_none")]
    pub meta_variables: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Match {
    /// Text captured by a single metavariable, e.g. `NAME` for `$NAME`.
    pub fn captured(&self, name: &str) -> Option<&str> {
        self.meta_variables
            .as_ref()?
            .get("single")?
            .get(name)?
            .get("text")?
            .as_str()
    }
}

/// Decode the engine's structured stdout.
///
/// Empty output means no matches, never an error.
pub fn parse_matches(stdout: &str) -> Result<Vec<Match>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|e| Error::MalformedEngineOutput(e.to_string()))
}
