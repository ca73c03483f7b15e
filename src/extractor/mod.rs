//! Endpoint extraction from raw source text.
//!
//! Extraction is line oriented: every rule of every framework profile that applies to a
//! file's extension is evaluated against every line independently. A rule may fire on many
//! lines, and a line may satisfy several rules.
//!
//! # Example
//!
//! ```no_run
//! use api_digest::extractor::EndpointExtractor;
//! use std::path::Path;
//!
//! let result = EndpointExtractor::new().extract_directory(Path::new("./my-api")).unwrap();
//! for e in &result.endpoints {
//!     println!("{} {} {}:{}", e.method, e.path, e.file.display(), e.line);
//! }
//! ```

use crate::endpoint::{dotted_extension, language_for_extension, Endpoint, RESOURCE_METHOD};
use crate::patterns::{patterns_for_extension, FrameworkPattern, MatchRule, MethodCapture};
use crate::scanner::FileScanner;
use anyhow::Result;
use log::{debug, info, warn};
use regex::Captures;
use std::fs;
use std::path::Path;

/// Lines of context kept on each side of an ordinary match.
pub const CONTEXT_LINES: usize = 5;

/// Lines of context kept on each side of a resource expansion.
pub const RESOURCE_CONTEXT_LINES: usize = 3;

/// Outcome of extracting a whole directory.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub endpoints: Vec<Endpoint>,
    /// Number of files that were read and matched against
    pub files_analyzed: usize,
    /// Non-fatal problems (unreadable files, unreadable metadata)
    pub warnings: Vec<String>,
}

/// Turns source files into [`Endpoint`] records using the built-in pattern registry.
#[derive(Debug, Default)]
pub struct EndpointExtractor;

impl EndpointExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scans `root` recursively and extracts endpoints from every candidate file.
    ///
    /// # Errors
    ///
    /// Fails only when the directory walk itself fails. Unreadable files are skipped with a
    /// warning, and finding nothing is not an error.
    pub fn extract_directory(&self, root: &Path) -> Result<ExtractionResult> {
        info!("Scanning directory tree: {}", root.display());

        let scan = FileScanner::new(root.to_path_buf()).scan()?;
        let mut result = ExtractionResult {
            warnings: scan.warnings,
            ..Default::default()
        };

        for path in &scan.source_files {
            let content = match fs::read(path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    let warning = format!("Error analyzing {}: {}", path.display(), e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                    continue;
                }
            };

            result.files_analyzed += 1;
            let endpoints = self.extract_file(path, &content);
            if !endpoints.is_empty() {
                debug!("Found {} endpoints in {}", endpoints.len(), path.display());
            }
            result.endpoints.extend(endpoints);
        }

        info!(
            "Scan complete: analyzed {} files, found {} endpoints",
            result.files_analyzed,
            result.endpoints.len()
        );

        Ok(result)
    }

    /// Extracts endpoints from the contents of a single file.
    ///
    /// `path` only decides which framework profiles apply and is recorded on each endpoint;
    /// the file is not read.
    pub fn extract_file(&self, path: &Path, content: &str) -> Vec<Endpoint> {
        let extension = dotted_extension(path);
        let profiles = patterns_for_extension(&extension);
        if profiles.is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = content.lines().collect();
        let mut endpoints = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            for profile in &profiles {
                for rule in &profile.rules {
                    if let Some(caps) = rule.regex.captures(line) {
                        let ctx = MatchContext {
                            path,
                            extension: &extension,
                            lines: &lines,
                            index,
                        };
                        if let Some(endpoint) = build_endpoint(&caps, rule, profile, &ctx) {
                            endpoints.push(endpoint);
                        }
                    }
                }
            }
        }

        endpoints
    }
}

struct MatchContext<'a> {
    path: &'a Path,
    extension: &'a str,
    lines: &'a [&'a str],
    index: usize,
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> Option<&'t str> {
    caps.get(index).map(|m| m.as_str()).filter(|s| !s.is_empty())
}

fn build_endpoint(
    caps: &Captures<'_>,
    rule: &MatchRule,
    profile: &FrameworkPattern,
    ctx: &MatchContext<'_>,
) -> Option<Endpoint> {
    let captured_path = group(caps, rule.path_group);
    let line = ctx.lines[ctx.index];

    let (method, path, window) = match &rule.method {
        MethodCapture::Expansion { marker } if line.contains(marker) => {
            let name = captured_path?;
            (
                RESOURCE_METHOD.to_string(),
                format!("/{}", name),
                RESOURCE_CONTEXT_LINES,
            )
        }
        capture => {
            // Without a path there is nothing to report, whatever the verb
            let path = captured_path?;
            let method = match capture {
                MethodCapture::Group(i) => group(caps, *i).map(|m| m.to_uppercase()),
                _ => None,
            }
            .unwrap_or_else(|| "GET".to_string());
            (method, path.to_string(), CONTEXT_LINES)
        }
    };

    let function = rule
        .function_group
        .and_then(|i| group(caps, i))
        .unwrap_or_default()
        .to_string();

    Some(Endpoint {
        method,
        path,
        file: ctx.path.to_path_buf(),
        line: ctx.index + 1,
        function,
        language: language_for_extension(ctx.extension).to_string(),
        framework: profile.name.to_string(),
        raw_code: extract_code_context(ctx.lines, ctx.index, window),
        summary: String::new(),
    })
}

/// Collects the lines within `radius` of `center`, dropping blank and comment lines.
pub fn extract_code_context(lines: &[&str], center: usize, radius: usize) -> String {
    if lines.is_empty() {
        return String::new();
    }

    let start = center.saturating_sub(radius);
    let end = (center + radius).min(lines.len() - 1);

    lines[start..=end]
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("//") && !trimmed.starts_with('#')
        })
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn extract(name: &str, content: &str) -> Vec<Endpoint> {
        EndpointExtractor::new().extract_file(Path::new(name), content)
    }

    fn routes(endpoints: &[Endpoint]) -> Vec<(String, String)> {
        endpoints
            .iter()
            .map(|e| (e.method.clone(), e.path.clone()))
            .collect()
    }

    fn route(method: &str, path: &str) -> (String, String) {
        (method.to_string(), path.to_string())
    }

    #[test]
    fn test_extract_express_route() {
        let endpoints = extract("app.js", "app.get('/users/:id', handler)");

        assert_eq!(endpoints.len(), 1);
        let endpoint = &endpoints[0];
        assert_eq!(endpoint.method, "GET");
        assert_eq!(endpoint.path, "/users/:id");
        assert_eq!(endpoint.framework, "Express");
        assert_eq!(endpoint.language, "JavaScript");
        assert_eq!(endpoint.function, "handler");
        assert_eq!(endpoint.line, 1);
        assert_eq!(endpoint.file, PathBuf::from("app.js"));
        assert!(endpoint.summary.is_empty());
    }

    #[test]
    fn test_extract_express_router_and_chained_route() {
        let code = "router.delete(`/items/${id}`, remove)\napp.route('/books').put(update)";
        let endpoints = extract("routes.ts", code);

        assert_eq!(
            routes(&endpoints),
            vec![route("DELETE", "/items/${id}"), route("PUT", "/books")]
        );
        assert_eq!(endpoints[0].language, "TypeScript");
    }

    #[test]
    fn test_extract_flask_with_and_without_methods() {
        let code = "@app.route('/items', methods=['POST'])\ndef create():\n    pass\n\n@bp.route(\"/health\")\ndef health():\n    return 'ok'";
        let endpoints = extract("views.py", code);

        assert_eq!(
            routes(&endpoints),
            vec![route("POST", "/items"), route("GET", "/health")]
        );
        assert!(endpoints.iter().all(|e| e.framework == "Flask"));
    }

    #[test]
    fn test_extract_fastapi() {
        let endpoints = extract("main.py", "@router.put(\"/users/{user_id}\")");

        assert_eq!(routes(&endpoints), vec![route("PUT", "/users/{user_id}")]);
        assert_eq!(endpoints[0].framework, "FastAPI");
    }

    #[test]
    fn test_extract_spring_annotations() {
        let code = r#"
    @GetMapping("/orders")
    public List<Order> list() { return repo.findAll(); }

    @RequestMapping(value = "/orders/{id}", method = RequestMethod.DELETE)
    public void delete(@PathVariable long id) {}
"#;
        let endpoints = extract("OrderController.java", code);

        assert_eq!(
            routes(&endpoints),
            vec![route("GET", "/orders"), route("DELETE", "/orders/{id}")]
        );
        assert_eq!(endpoints[0].line, 2);
        assert_eq!(endpoints[1].line, 5);
    }

    #[test]
    fn test_extract_gin_and_echo() {
        let gin = extract(
            "server.go",
            "\tr.GET(\"/ping\", ping)\n\trouter.POST(`/users`, createUser)",
        );
        assert_eq!(routes(&gin), vec![route("GET", "/ping"), route("POST", "/users")]);
        assert!(gin.iter().all(|e| e.framework == "Gin"));
        assert_eq!(gin[1].function, "createUser");

        let echo = extract("main.go", "e.PATCH(\"/users/:id\", handlers.Update)");
        assert_eq!(routes(&echo), vec![route("PATCH", "/users/:id")]);
        assert_eq!(echo[0].framework, "Echo");
        assert_eq!(echo[0].function, "handlers.Update");
    }

    #[test]
    fn test_extract_rails_routes_and_resources() {
        let code = "Rails.application.routes.draw do\n  get '/status', to: 'health#show'\n  resources :users\nend";
        let endpoints = extract("routes.rb", code);

        assert_eq!(
            routes(&endpoints),
            vec![route("GET", "/status"), route("RESOURCE", "/users")]
        );
        assert!(endpoints[1].is_resource());
    }

    #[test]
    fn test_extract_aspnet_attributes() {
        let code = "[Route(\"api/[controller]\")]\npublic class UsersController {\n    [HttpPost(\"create\")]\n    public IActionResult Create() {}\n}";
        let endpoints = extract("UsersController.cs", code);

        assert_eq!(
            routes(&endpoints),
            vec![route("GET", "api/[controller]"), route("POST", "create")]
        );
        assert_eq!(endpoints[0].language, "C#");
    }

    #[test]
    fn test_extract_ignores_unsupported_extension() {
        assert!(extract("notes.txt", "app.get('/x', h)").is_empty());
        assert!(extract("Makefile", "app.get('/x', h)").is_empty());
    }

    #[test]
    fn test_extract_multiple_matches_on_one_line() {
        let endpoints = extract("app.js", "app.get('/a', a); app.post('/b', b)");

        // One rule matches once per line; the router rule does not apply here
        assert_eq!(routes(&endpoints), vec![route("GET", "/a")]);

        let endpoints = extract("app.js", "app.get('/a', a); router.post('/b', b)");
        assert_eq!(routes(&endpoints), vec![route("GET", "/a"), route("POST", "/b")]);
    }

    #[test]
    fn test_code_context_window_and_filtering() {
        let lines: Vec<&str> = vec![
            "l0", "l1", "// comment", "", "# note", "l5", "MATCH", "l7", "   ", "l9", "l10", "l11",
            "l12",
        ];

        let context = extract_code_context(&lines, 6, 5);
        assert_eq!(context, "l1\nl5\nMATCH\nl7\nl9\nl10\nl11");

        let context = extract_code_context(&lines, 0, 3);
        assert_eq!(context, "l0\nl1");

        let context = extract_code_context(&lines, 12, 3);
        assert_eq!(context, "l9\nl10\nl11\nl12");
    }

    #[test]
    fn test_resource_context_uses_smaller_window() {
        let code = "a\nb\nc\nd\n  resources :posts\ne\nf\ng\nh";
        let endpoints = extract("routes.rb", code);

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].raw_code, "b\nc\nd\n  resources :posts\ne\nf\ng");
    }

    #[test]
    fn test_extract_directory_collects_across_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/api")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("src/api/users.js"), "app.get('/users', list)\n").unwrap();
        fs::write(root.join("src/app.py"), "@app.route('/items', methods=['POST'])\n").unwrap();
        fs::write(root.join("node_modules/lib/index.js"), "app.get('/hidden', h)\n").unwrap();

        let result = EndpointExtractor::new().extract_directory(root).unwrap();

        assert_eq!(result.files_analyzed, 2);
        let mut found = routes(&result.endpoints);
        found.sort();
        assert_eq!(found, vec![route("GET", "/users"), route("POST", "/items")]);
    }

    #[test]
    fn test_extract_directory_without_endpoints_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("util.js"), "module.exports = {}\n").unwrap();

        let result = EndpointExtractor::new()
            .extract_directory(temp_dir.path())
            .unwrap();

        assert!(result.endpoints.is_empty());
        assert_eq!(result.files_analyzed, 1);
    }

    #[test]
    fn test_handler_is_last_argument_after_middleware() {
        let code = "app.get('/admin', auth, rateLimit, listUsers)\nr.POST(\"/albums\", mw.Auth, postAlbums)";

        let express = extract("app.js", code);
        assert_eq!(express[0].function, "listUsers");

        let gin = extract("server.go", code);
        assert_eq!(gin[0].path, "/albums");
        assert_eq!(gin[0].function, "postAlbums");
    }

    #[test]
    fn test_inline_handler_has_no_function_name() {
        let endpoints = extract("app.js", "app.post('/login', auth, (req, res) => res.send('ok'))");

        assert_eq!(routes(&endpoints), vec![route("POST", "/login")]);
        assert_eq!(endpoints[0].function, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped_with_warning() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let locked = root.join("locked.js");
        fs::write(root.join("users.js"), "app.get('/users', list)\n").unwrap();
        fs::write(&locked, "app.get('/locked', h)\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user
        if fs::read(&locked).is_ok() {
            return;
        }

        let result = EndpointExtractor::new().extract_directory(root).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(routes(&result.endpoints), vec![route("GET", "/users")]);
        assert_eq!(result.files_analyzed, 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("locked.js"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_aborts_scan() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let sealed = root.join("sealed");
        fs::create_dir(&sealed).unwrap();
        fs::write(root.join("users.js"), "app.get('/users', list)\n").unwrap();
        fs::write(sealed.join("inner.js"), "app.get('/inner', h)\n").unwrap();
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read_dir(&sealed).is_ok() {
            fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = EndpointExtractor::new().extract_directory(root);
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Error walking directory"));
    }
}
