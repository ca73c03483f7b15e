use crate::endpoint::dotted_extension;
use crate::patterns::is_supported_extension;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// Files larger than this are never analyzed.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Directory names that never contain hand-written route declarations.
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    ".git",
    "dist",
    "build",
    "target",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    ".idea",
    ".vscode",
    "coverage",
    "test",
    "tests",
    "spec",
    "specs",
    ".next",
    "out",
    "tmp",
    "temp",
    "cache",
    ".cache",
    "logs",
    "docs",
    "documentation",
    "examples",
    "migrations",
    "public",
    "static",
    "assets",
    "bin",
    "obj",
];

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks a project directory and collects every source file
/// that at least one framework profile applies to. It skips:
/// - hidden files and directories (names starting with `.`)
/// - dependency, build, VCS, test, cache, docs and IDE directories (see [`SKIP_DIRS`])
/// - files larger than [`MAX_FILE_SIZE`]
/// - minified files (names containing `.min.`)
///
/// # Example
///
/// ```no_run
/// use api_digest::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} source files", result.source_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths of every source file worth analyzing
    pub source_files: Vec<PathBuf>,
    /// Warning messages for files that were skipped because they could not be inspected
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects candidate source files.
    ///
    /// # Errors
    ///
    /// Returns an error as soon as any directory cannot be traversed. A file whose metadata
    /// cannot be read is only recorded as a warning.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| self.keep_entry(e));

        for entry in walker {
            let entry = entry.with_context(|| {
                format!("Error walking directory {}", self.root_path.display())
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy();
            if file_name.contains(".min.") {
                debug!("Skipping minified file: {}", path.display());
                continue;
            }

            if !is_supported_extension(&dotted_extension(path)) {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > MAX_FILE_SIZE => {
                    debug!("Skipping large file ({} bytes): {}", meta.len(), path.display());
                }
                Ok(_) => source_files.push(path.to_path_buf()),
                Err(e) => {
                    let warning = format!("Failed to stat {}: {}", path.display(), e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Scan of {} found {} candidate files",
            self.root_path.display(),
            source_files.len()
        );

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        // Don't filter the root directory itself
        if entry.depth() == 0 {
            return true;
        }

        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') {
            return false;
        }

        !(entry.file_type().is_dir() && SKIP_DIRS.contains(&file_name.as_ref()))
    }
}
