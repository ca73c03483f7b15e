//! The endpoint value object shared by the extractor, cache and summarizer.

use std::path::{Path, PathBuf};

/// Method tag for a declaration that expands to several routes (e.g. Rails `resources`).
pub const RESOURCE_METHOD: &str = "RESOURCE";

/// Summary assigned when summarization was attempted but produced nothing.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";

/// Language tag for extensions outside the lookup table.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A single detected API route.
///
/// Everything except `summary` is fixed at extraction time. `summary` starts empty
/// ("not attempted") and is written at most once, either from the cache or by the
/// summarization pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Uppercase HTTP verb, or [`RESOURCE_METHOD`]
    pub method: String,
    /// Route exactly as written in source
    pub path: String,
    /// File the declaration was found in
    pub file: PathBuf,
    /// 1-based line number of the declaration
    pub line: usize,
    /// Handler name when the rule captures one
    pub function: String,
    /// Language derived from the file extension
    pub language: String,
    /// Name of the framework profile that matched
    pub framework: String,
    /// Non-blank, non-comment lines around the declaration
    pub raw_code: String,
    /// Generated summary, empty until filled
    pub summary: String,
}

impl Endpoint {
    /// True once a real summary (not the failure sentinel) has been assigned.
    pub fn has_summary(&self) -> bool {
        !self.summary.is_empty() && self.summary != SUMMARY_UNAVAILABLE
    }

    pub fn is_resource(&self) -> bool {
        self.method == RESOURCE_METHOD
    }
}

/// Maps a file extension (with leading dot) to a language name.
pub fn language_for_extension(ext: &str) -> &'static str {
    match ext {
        ".js" | ".mjs" => "JavaScript",
        ".ts" => "TypeScript",
        ".py" => "Python",
        ".java" => "Java",
        ".go" => "Go",
        ".rb" => "Ruby",
        ".cs" => "C#",
        ".php" => "PHP",
        _ => UNKNOWN_LANGUAGE,
    }
}

/// Returns the extension of `path` with a leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Endpoint {
        Endpoint {
            method: "GET".to_string(),
            path: "/users".to_string(),
            file: PathBuf::from("app.js"),
            line: 1,
            function: String::new(),
            language: "JavaScript".to_string(),
            framework: "Express".to_string(),
            raw_code: "app.get('/users', list)".to_string(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_language_lookup() {
        assert_eq!(language_for_extension(".js"), "JavaScript");
        assert_eq!(language_for_extension(".mjs"), "JavaScript");
        assert_eq!(language_for_extension(".cs"), "C#");
        assert_eq!(language_for_extension(".kt"), UNKNOWN_LANGUAGE);
        assert_eq!(language_for_extension(""), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("src/app.ts")), ".ts");
        assert_eq!(dotted_extension(Path::new("Makefile")), "");
    }

    #[test]
    fn test_has_summary_distinguishes_sentinel() {
        let mut endpoint = sample();
        assert!(!endpoint.has_summary());

        endpoint.summary = SUMMARY_UNAVAILABLE.to_string();
        assert!(!endpoint.has_summary());

        endpoint.summary = "Lists users".to_string();
        assert!(endpoint.has_summary());
    }
}
