//! Compact text rendering of matches.
//!
//! Each match becomes a `path:line` or `path:start-end` header (1-based,
//! inclusive) followed by its verbatim text. This costs far fewer tokens than
//! the engine's JSON while keeping every match whole.

use crate::engine::Match;
use crate::service::cache::PaginationWindow;

/// Render matches as header + text blocks separated by one blank line.
pub fn render_text(matches: &[Match]) -> String {
    matches
        .iter()
        .map(render_match)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_match(m: &Match) -> String {
    format!("{}\n{}", match_header(m), m.text.trim_end())
}

/// `file:N` for a single line, `file:N-M` for a span.
pub fn match_header(m: &Match) -> String {
    let start = m.range.start.line + 1;
    let end = m.range.end.line + 1;
    if end > start {
        format!("{}:{}-{}", m.file, start, end)
    } else {
        format!("{}:{}", m.file, start)
    }
}

/// Render a whole window with its count header and a paging hint.
pub fn render_window(window: &PaginationWindow) -> String {
    let meta = &window.metadata;

    if meta.total_matches == 0 {
        return "No matches found".to_string();
    }
    if meta.returned == 0 {
        return format!(
            "No matches at offset {} ({} total)",
            meta.offset, meta.total_matches
        );
    }

    let header = if meta.returned == meta.total_matches {
        format!("Found {}", plural(meta.returned))
    } else if meta.offset == 0 {
        format!(
            "Found {} (showing first {} of {})",
            plural(meta.returned),
            meta.returned,
            meta.total_matches
        )
    } else {
        format!(
            "Found {} (showing {}-{} of {})",
            plural(meta.returned),
            meta.offset + 1,
            meta.offset + meta.returned,
            meta.total_matches
        )
    };

    let mut out = format!("{}:\n\n{}", header, render_text(&window.results));
    if meta.has_more {
        out.push_str(&format!(
            "\n\nMore matches available: call again with offset={}",
            meta.offset + meta.returned
        ));
    }
    out
}

fn plural(n: usize) -> String {
    if n == 1 {
        "1 match".to_string()
    } else {
        format!("{} matches", n)
    }
}
