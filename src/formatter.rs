//! Plain-text rendering of the final endpoint list.

use crate::endpoint::Endpoint;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

const HEADERS: [&str; 4] = ["Method", "Path", "File", "Summary"];

/// Shortens long paths to their last two components.
pub fn shorten_path(path: &Path) -> String {
    let display = path.to_string_lossy();
    let parts: Vec<&str> = display.split('/').collect();
    if parts.len() > 3 {
        format!(".../{}", parts[parts.len() - 2..].join("/"))
    } else {
        display.into_owned()
    }
}

/// Renders endpoints as an aligned table followed by a per-file listing.
pub fn render_endpoints(endpoints: &[Endpoint]) -> String {
    if endpoints.is_empty() {
        return "No endpoints found.\n".to_string();
    }

    let rows: Vec<[String; 4]> = endpoints
        .iter()
        .map(|e| {
            [
                e.method.clone(),
                e.path.clone(),
                format!("{}:{}", shorten_path(&e.file), e.line),
                e.summary.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "REST API Endpoints Summary");
    let _ = writeln!(out, "Found {} endpoints\n", endpoints.len());

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let _ = writeln!(out, "+{}+", separator);
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let _ = writeln!(out, "+{}+", separator);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    let _ = writeln!(out, "+{}+", separator);

    let mut by_file: BTreeMap<&Path, Vec<&Endpoint>> = BTreeMap::new();
    for endpoint in endpoints {
        by_file.entry(endpoint.file.as_path()).or_default().push(endpoint);
    }

    let _ = writeln!(out, "\nEndpoints by File:");
    for (file, file_endpoints) in by_file {
        let _ = writeln!(out, "  {} ({} endpoints)", file.display(), file_endpoints.len());
        for endpoint in file_endpoints {
            let _ = writeln!(out, "    • {} {}", endpoint.method, endpoint.path);
        }
    }

    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| {
            let pad = width - cell.chars().count();
            format!(" {}{} ", cell, " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "|{}|", padded.join("|"));
}

/// Statistics printed after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub cached: usize,
    pub generated: usize,
    pub elapsed: Duration,
}

pub fn render_stats(stats: &RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nAnalysis completed in {}s", stats.elapsed.as_secs());
    if stats.cached > 0 && stats.total > 0 {
        let _ = writeln!(
            out,
            "   • {}/{} summaries from cache ({}%)",
            stats.cached,
            stats.total,
            stats.cached * 100 / stats.total
        );
    }
    if stats.generated > 0 {
        let _ = writeln!(out, "   • Generated {} new summaries", stats.generated);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn endpoint(method: &str, path: &str, file: &str, summary: &str) -> Endpoint {
        Endpoint {
            method: method.to_string(),
            path: path.to_string(),
            file: PathBuf::from(file),
            line: 3,
            function: String::new(),
            language: "Python".to_string(),
            framework: "Flask".to_string(),
            raw_code: String::new(),
            summary: summary.to_string(),
        }
    }

    #[test]
    fn test_shorten_path() {
        assert_eq!(shorten_path(Path::new("app.py")), "app.py");
        assert_eq!(shorten_path(Path::new("src/app.py")), "src/app.py");
        assert_eq!(
            shorten_path(Path::new("/home/dev/project/src/app.py")),
            ".../src/app.py"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_endpoints(&[]), "No endpoints found.\n");
    }

    #[test]
    fn test_render_table_and_grouping() {
        let endpoints = vec![
            endpoint("GET", "/items", "b.py", "Lists items"),
            endpoint("POST", "/items", "a.py", ""),
        ];

        let output = render_endpoints(&endpoints);

        assert!(output.contains("Found 2 endpoints"));
        assert!(output.contains("| GET    | /items | b.py:3 | Lists items |"));
        assert!(output.contains("| POST   | /items | a.py:3 |             |"));
        let a = output.find("  a.py (1 endpoints)").unwrap();
        let b = output.find("  b.py (1 endpoints)").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_render_stats() {
        let stats = RunStats {
            total: 4,
            cached: 1,
            generated: 3,
            elapsed: Duration::from_secs(7),
        };

        let output = render_stats(&stats);

        assert!(output.contains("completed in 7s"));
        assert!(output.contains("1/4 summaries from cache (25%)"));
        assert!(output.contains("Generated 3 new summaries"));
    }
}
