//! Single-slot result cache and offset/limit paginator.
//!
//! A search runs once per distinct [`SearchKey`]; later pages of the same
//! search are sliced out of the cached match list so a paging sequence sees
//! one stable snapshot. Requesting offset 0 always re-runs the search.

use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

use crate::engine::Match;
use crate::error::{Error, Result};

/// Which tool produced a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Pattern,
    Rule,
}

/// Parameters that identify one logical search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub kind: SearchKind,
    /// Pattern text or rule YAML
    pub query: String,
    pub folder: String,
    pub language: Option<String>,
}

impl SearchKey {
    pub fn pattern(pattern: &str, folder: &str, language: Option<&str>) -> Self {
        Self {
            kind: SearchKind::Pattern,
            query: pattern.to_string(),
            folder: folder.to_string(),
            language: language.filter(|l| !l.is_empty()).map(String::from),
        }
    }

    pub fn rule(yaml: &str, folder: &str) -> Self {
        Self {
            kind: SearchKind::Rule,
            query: yaml.to_string(),
            folder: folder.to_string(),
            language: None,
        }
    }
}

/// A validated offset/limit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl PageRequest {
    /// Validate raw caller input: `offset >= 0`, `limit` absent or `> 0`.
    pub fn new(offset: i64, limit: Option<i64>) -> Result<Self> {
        if offset < 0 {
            return Err(Error::invalid_parameter(format!(
                "Offset must be non-negative, got {}",
                offset
            )));
        }
        let limit = match limit {
            Some(l) if l <= 0 => {
                return Err(Error::invalid_parameter(format!(
                    "Limit must be positive, got {}",
                    l
                )))
            }
            Some(l) => Some(l as usize),
            None => None,
        };
        Ok(Self {
            offset: offset as usize,
            limit,
        })
    }

    /// Tighten the limit to at most `cap`.
    pub fn capped(mut self, cap: Option<usize>) -> Self {
        self.limit = match (self.limit, cap) {
            (Some(l), Some(c)) => Some(l.min(c)),
            (l, c) => l.or(c),
        };
        self
    }
}

/// Window metadata returned alongside the sliced matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub total_matches: usize,
    pub offset: usize,
    pub limit: Option<usize>,
    pub returned: usize,
    pub has_more: bool,
}

/// One page over a cached match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationWindow {
    pub results: Vec<Match>,
    pub metadata: PageMetadata,
}

impl PaginationWindow {
    /// Slice `matches[offset..end]` where `end` honours the limit.
    pub fn slice(matches: &[Match], page: PageRequest) -> Self {
        let total = matches.len();
        let (results, end_idx) = if page.offset >= total {
            (Vec::new(), page.offset)
        } else {
            let end_idx = match page.limit {
                Some(limit) => page.offset.saturating_add(limit).min(total),
                None => total,
            };
            (matches[page.offset..end_idx].to_vec(), end_idx)
        };

        Self {
            metadata: PageMetadata {
                total_matches: total,
                offset: page.offset,
                limit: page.limit,
                returned: results.len(),
                has_more: end_idx < total,
            },
            results,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    key: SearchKey,
    matches: Vec<Match>,
}

/// Holds at most one search result.
#[derive(Debug, Default)]
pub struct ResultCache {
    entry: Option<CacheEntry>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the cached search, if any.
    pub fn cached_key(&self) -> Option<&SearchKey> {
        self.entry.as_ref().map(|e| &e.key)
    }

    /// Serve a window, running `producer` only when a fresh search is due:
    /// offset 0, an empty cache, or a different key.
    pub async fn window<F, Fut>(
        &mut self,
        key: SearchKey,
        page: PageRequest,
        producer: F,
    ) -> Result<PaginationWindow>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Match>>>,
    {
        let fresh = page.offset == 0
            || self
                .entry
                .as_ref()
                .map_or(true, |entry| entry.key != key);

        if fresh {
            debug!("Result cache miss (offset {}), running search", page.offset);
            let matches = producer().await?;
            self.entry = Some(CacheEntry { key, matches });
        } else {
            debug!("Result cache hit (offset {})", page.offset);
        }

        let matches = self
            .entry
            .as_ref()
            .map(|entry| entry.matches.as_slice())
            .unwrap_or_default();
        Ok(PaginationWindow::slice(matches, page))
    }
}
