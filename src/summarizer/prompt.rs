//! Batch prompt construction and response parsing.
//!
//! The service is asked to answer with one `[N] summary` line per endpoint. That is only a
//! convention, so parsing is permissive: anything that does not look like `[...] text` is
//! ignored, and summaries are assigned by position rather than by the number in brackets.

use crate::endpoint::{Endpoint, SUMMARY_UNAVAILABLE};
use std::fmt::Write;

/// Longest summary kept, in characters.
pub const MAX_SUMMARY_CHARS: usize = 50;

/// Lines of relevant code sent per endpoint.
pub const MAX_RELEVANT_LINES: usize = 3;

const RELEVANT_KEYWORDS: &[&str] = &[
    "def ", "function", "return", "create", "update", "delete", "get", "post", "find", "save",
];

/// Builds one prompt covering every endpoint in `batch`, numbered from 1.
pub fn build_batch_prompt(batch: &[Endpoint]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Analyze these REST API endpoints. For each, provide a one-line summary (max 50 chars).\n",
    );
    prompt.push_str("Format: [N] Summary\n\n");

    for (i, endpoint) in batch.iter().enumerate() {
        let _ = writeln!(prompt, "[{}] {} {}", i + 1, endpoint.method, endpoint.path);
        let relevant = extract_relevant_code(&endpoint.raw_code);
        if !relevant.is_empty() {
            let _ = writeln!(prompt, "Code: {}", relevant);
        }
        prompt.push('\n');
    }

    prompt.push_str("Summaries:");
    prompt
}

/// Picks up to three lines that mention definitions, returns or CRUD verbs, falling back to
/// the first non-blank line. Lines are trimmed and joined with `"; "`.
pub fn extract_relevant_code(raw_code: &str) -> String {
    let candidates: Vec<&str> = raw_code
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//") && !line.starts_with('#'))
        .collect();

    let relevant: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|line| {
            let lower = line.to_lowercase();
            RELEVANT_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(MAX_RELEVANT_LINES)
        .collect();

    if !relevant.is_empty() {
        return relevant.join("; ");
    }

    raw_code
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Extracts the summaries from a `[N] text` style response, in order of appearance.
pub fn parse_batch_response(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('['))
        .filter_map(|line| {
            let close = line.find(']')?;
            let summary = line[close + 1..].trim();
            if summary.is_empty() {
                None
            } else {
                Some(truncate_summary(summary))
            }
        })
        .collect()
}

/// Hard-caps a summary at [`MAX_SUMMARY_CHARS`], ending in `...` when cut.
pub fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= MAX_SUMMARY_CHARS {
        return summary.to_string();
    }
    let kept: String = summary.chars().take(MAX_SUMMARY_CHARS - 3).collect();
    format!("{}...", kept)
}

/// Assigns the i-th summary to the i-th endpoint; endpoints past the end get the sentinel.
pub fn assign_summaries(batch: &mut [Endpoint], summaries: Vec<String>) {
    let mut summaries = summaries.into_iter();
    for endpoint in batch.iter_mut() {
        endpoint.summary = summaries
            .next()
            .unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string());
    }
}
