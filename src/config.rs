//! Documentation run configuration.
//!
//! A [`DocConfig`] is built once, from an optional YAML or JSON file with CLI
//! flags layered on top, and then shared read-only with the builder.

use crate::error::{Error, Result};
use crate::headers::HeaderEntry;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options of a documentation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DocConfig {
    /// Fail on undocumented methods and primitive parameters
    #[serde(default)]
    pub strict: bool,

    /// Comma-separated qualified-name filters; entries with `*` are globs,
    /// the others prefixes
    #[serde(default)]
    pub package_filters: Option<String>,

    /// Headers documented on every method
    #[serde(default)]
    pub request_headers: Vec<HeaderEntry>,

    /// Include `@author` in method docs
    #[serde(default = "default_show_author")]
    pub show_author: bool,

    /// Prefix of every documented URL
    #[serde(default)]
    pub server_url: String,
}

fn default_show_author() -> bool {
    true
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            strict: false,
            package_filters: None,
            request_headers: Vec::new(),
            show_author: default_show_author(),
            server_url: String::new(),
        }
    }
}

impl DocConfig {
    /// Load a configuration file; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// The compiled package filter, `None` when no filter is configured
    pub fn package_filter(&self) -> Result<Option<PackageFilter>> {
        match self.package_filters.as_deref() {
            Some(filters) if !filters.trim().is_empty() => PackageFilter::parse(filters).map(Some),
            _ => Ok(None),
        }
    }
}

/// One entry of a package filter
#[derive(Debug, Clone)]
enum FilterEntry {
    Prefix(String),
    Glob(Regex),
}

/// Restricts documentation to declarations whose qualified name matches.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    entries: Vec<FilterEntry>,
}

impl PackageFilter {
    /// Parse a comma-separated filter list
    pub fn parse(filters: &str) -> Result<Self> {
        let entries = filters
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                if entry.contains('*') {
                    let pattern = entry
                        .split('*')
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(".*");
                    Ok(FilterEntry::Glob(Regex::new(&format!("^{}$", pattern))?))
                } else {
                    Ok(FilterEntry::Prefix(entry.to_string()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        if entries.is_empty() {
            return Err(Error::ConfigError("empty package filter".to_string()));
        }
        Ok(Self { entries })
    }

    /// Whether a qualified declaration name passes the filter
    pub fn matches(&self, qualified_name: &str) -> bool {
        self.entries.iter().any(|entry| match entry {
            FilterEntry::Prefix(prefix) => qualified_name.starts_with(prefix.as_str()),
            FilterEntry::Glob(regex) => regex.is_match(qualified_name),
        })
    }
}
