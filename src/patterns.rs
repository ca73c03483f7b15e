//! Built-in route detection rules for every supported web framework.
//!
//! Each [`FrameworkPattern`] pairs a framework name with the file extensions it applies to
//! and an ordered list of [`MatchRule`]s. The table is compiled once on first use and is
//! never mutated afterwards.
//!
//! # Supported Frameworks
//!
//! - **Express** (`.js`, `.ts`, `.mjs`): `app.get(...)`, `router.post(...)`, `app.route(...).put(...)`
//! - **Flask** (`.py`): `@app.route(...)` / `@bp.route(..., methods=[...])`
//! - **FastAPI** (`.py`): `@app.get(...)`, `@router.delete(...)`
//! - **Spring** (`.java`): `@GetMapping(...)`, `@RequestMapping(value=..., method=RequestMethod.X)`
//! - **Gin** (`.go`): `router.GET(...)`, `r.POST(...)`
//! - **Echo** (`.go`): `e.GET(...)`
//! - **Rails** (`.rb`): `get '/path'`, `resources :users`
//! - **ASP.NET** (`.cs`): `[HttpGet("...")]`, `[Route("...")]`

use once_cell::sync::Lazy;
use regex::Regex;

/// Where a rule finds the HTTP verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodCapture {
    /// The verb sits in this capture group. If the group did not participate in the
    /// match (e.g. a Flask route without `methods=`), the verb is GET.
    Group(usize),
    /// The declaration carries no verb at all; the verb is GET.
    Implicit,
    /// One declaration stands for a bundle of routes when the matched line contains
    /// `marker`. Such matches become a single `RESOURCE` endpoint.
    Expansion { marker: &'static str },
}

/// A single line-level detection rule.
#[derive(Debug)]
pub struct MatchRule {
    pub regex: Regex,
    pub method: MethodCapture,
    /// Capture group holding the route path (or resource name for expansions)
    pub path_group: usize,
    /// Capture group holding the handler name: the last bare identifier of a call whose
    /// arguments after the path are all identifiers, so middleware is never reported
    pub function_group: Option<usize>,
}

/// Detection profile for one framework.
#[derive(Debug)]
pub struct FrameworkPattern {
    pub name: &'static str,
    /// Extensions (with leading dot) this profile is evaluated against
    pub extensions: &'static [&'static str],
    pub rules: Vec<MatchRule>,
}

impl FrameworkPattern {
    pub fn applies_to(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| *e == extension)
    }
}

fn rule(pattern: &str, method: MethodCapture, path_group: usize) -> MatchRule {
    MatchRule {
        regex: Regex::new(pattern).expect("built-in route pattern must compile"),
        method,
        path_group,
        function_group: None,
    }
}

fn rule_with_handler(
    pattern: &str,
    method: MethodCapture,
    path_group: usize,
    function_group: usize,
) -> MatchRule {
    MatchRule {
        function_group: Some(function_group),
        ..rule(pattern, method, path_group)
    }
}

static REGISTRY: Lazy<Vec<FrameworkPattern>> = Lazy::new(build_registry);

/// Returns every framework profile, in evaluation order.
pub fn all_patterns() -> &'static [FrameworkPattern] {
    &REGISTRY
}

/// Returns the profiles whose extension list contains `extension` exactly.
pub fn patterns_for_extension(extension: &str) -> Vec<&'static FrameworkPattern> {
    all_patterns()
        .iter()
        .filter(|p| p.applies_to(extension))
        .collect()
}

/// True if at least one profile applies to `extension`.
pub fn is_supported_extension(extension: &str) -> bool {
    all_patterns().iter().any(|p| p.applies_to(extension))
}

fn build_registry() -> Vec<FrameworkPattern> {
    vec![
        FrameworkPattern {
            name: "Express",
            extensions: &[".js", ".ts", ".mjs"],
            rules: vec![
                rule_with_handler(
                    r#"\bapp\.(get|post|put|delete|patch|options|head)\s*\(\s*['"`]([^'"`]+)['"`](?:\s*,\s*(?:[A-Za-z_$][\w$.]*\s*,\s*)*([A-Za-z_$][\w$.]*)\s*\))?"#,
                    MethodCapture::Group(1),
                    2,
                    3,
                ),
                rule_with_handler(
                    r#"\brouter\.(get|post|put|delete|patch|options|head)\s*\(\s*['"`]([^'"`]+)['"`](?:\s*,\s*(?:[A-Za-z_$][\w$.]*\s*,\s*)*([A-Za-z_$][\w$.]*)\s*\))?"#,
                    MethodCapture::Group(1),
                    2,
                    3,
                ),
                rule(
                    r#"\bapp\.route\s*\(\s*['"`]([^'"`]+)['"`]\s*\)\s*\.(get|post|put|delete|patch)"#,
                    MethodCapture::Group(2),
                    1,
                ),
            ],
        },
        FrameworkPattern {
            name: "Flask",
            extensions: &[".py"],
            rules: vec![rule(
                r#"@\w+\.route\s*\(\s*['"]([^'"]+)['"]\s*(?:,\s*methods\s*=\s*\[\s*['"](\w+)['"])?"#,
                MethodCapture::Group(2),
                1,
            )],
        },
        FrameworkPattern {
            name: "FastAPI",
            extensions: &[".py"],
            rules: vec![rule(
                r#"@(?:app|router)\.(get|post|put|delete|patch|options|head)\s*\(\s*['"]([^'"]+)['"]"#,
                MethodCapture::Group(1),
                2,
            )],
        },
        FrameworkPattern {
            name: "Spring",
            extensions: &[".java"],
            rules: vec![
                rule(
                    r#"@(Get|Post|Put|Delete|Patch)Mapping\s*\(\s*(?:(?:value|path)\s*=\s*)?["']([^"']+)["']"#,
                    MethodCapture::Group(1),
                    2,
                ),
                rule(
                    r#"@RequestMapping\s*\([^)]*?(?:value|path)\s*=\s*["']([^"']+)["'][^)]*?method\s*=\s*RequestMethod\.(\w+)"#,
                    MethodCapture::Group(2),
                    1,
                ),
            ],
        },
        FrameworkPattern {
            name: "Gin",
            extensions: &[".go"],
            rules: vec![rule_with_handler(
                r#"\b(?:router|r)\.(GET|POST|PUT|DELETE|PATCH|OPTIONS|HEAD)\s*\(\s*["`]([^"`]+)["`](?:\s*,\s*(?:[A-Za-z_][\w.]*\s*,\s*)*([A-Za-z_][\w.]*)\s*\))?"#,
                MethodCapture::Group(1),
                2,
                3,
            )],
        },
        FrameworkPattern {
            name: "Echo",
            extensions: &[".go"],
            rules: vec![rule_with_handler(
                r#"\be\.(GET|POST|PUT|DELETE|PATCH|OPTIONS|HEAD)\s*\(\s*["`]([^"`]+)["`](?:\s*,\s*(?:[A-Za-z_][\w.]*\s*,\s*)*([A-Za-z_][\w.]*)\s*\))?"#,
                MethodCapture::Group(1),
                2,
                3,
            )],
        },
        FrameworkPattern {
            name: "Rails",
            extensions: &[".rb"],
            rules: vec![
                rule(
                    r#"^\s*(get|post|put|patch|delete)\s+['"]([^'"]+)['"]"#,
                    MethodCapture::Group(1),
                    2,
                ),
                rule(
                    r#"^\s*resources\s+:(\w+)"#,
                    MethodCapture::Expansion { marker: "resources" },
                    1,
                ),
            ],
        },
        FrameworkPattern {
            name: "ASP.NET",
            extensions: &[".cs"],
            rules: vec![
                rule(
                    r#"\[Http(Get|Post|Put|Delete|Patch)\s*\(\s*["']([^"']+)["']\s*\)"#,
                    MethodCapture::Group(1),
                    2,
                ),
                rule(
                    r#"\[Route\s*\(\s*["']([^"']+)["']\s*\)"#,
                    MethodCapture::Implicit,
                    1,
                ),
            ],
        },
    ]
}
