//! Writes the documentation model as YAML or JSON.

use crate::doc_builder::ApiDoc;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes the controller docs to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(docs: &[ApiDoc]) -> Result<String> {
    debug!("Serializing {} controller docs to YAML", docs.len());
    serde_yaml::to_string(docs).context("Failed to serialize API docs to YAML")
}

/// Serializes the controller docs to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(docs: &[ApiDoc]) -> Result<String> {
    debug!("Serializing {} controller docs to JSON", docs.len());
    serde_json::to_string_pretty(docs).context("Failed to serialize API docs to JSON")
}

/// Writes `content` to `path`, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
