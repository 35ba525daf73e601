use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser turning Rust source files into syntax trees tagged with their module path.
///
/// The module path is what qualified declaration names (and therefore package
/// filters) are built from: `src/api/users.rs` under the project root becomes
/// `["api", "users"]`.
///
/// # Example
///
/// ```no_run
/// use apidoc_from_source::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module path of the file relative to the crate root
    pub module_path: Vec<String>,
    /// The parsed syntax tree
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// Parse in-memory source code
    pub fn from_source(path: PathBuf, module_path: Vec<String>, source: &str) -> Result<Self> {
        let syntax_tree = syn::parse_file(source)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;
        Ok(Self {
            path,
            module_path,
            syntax_tree,
        })
    }
}

impl AstParser {
    /// Parses a single file; its module path is derived from the file name alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        let root = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse_project_file(root, path)
    }

    /// Parses a file that belongs to the project rooted at `root`.
    pub fn parse_project_file(root: &Path, path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let parsed = ParsedFile::from_source(path.to_path_buf(), module_path_for(root, path), &content)?;

        debug!(
            "Parsed {} as module `{}`",
            path.display(),
            parsed.module_path.join("::")
        );
        Ok(parsed)
    }

    /// Parses every file, continuing past failures.
    ///
    /// Failures are logged as warnings and returned as `Err` so the caller can
    /// still document the files that did parse.
    pub fn parse_files(root: &Path, paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_project_file(root, path).map_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

/// Module path of `path` relative to `root`.
///
/// A leading `src` component is dropped, and `lib.rs`, `main.rs` and `mod.rs`
/// name their parent module.
pub fn module_path_for(root: &Path, path: &Path) -> Vec<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if parts.first().map(String::as_str) == Some("src") {
        parts.remove(0);
    }
    if matches!(parts.last().map(String::as_str), Some("lib" | "main" | "mod")) {
        parts.pop();
    }
    parts
}
