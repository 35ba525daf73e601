//! Request header collection and merging.

use crate::annotation::{read_name_override, tag_required, REQUEST_HEADER};
use crate::extractor::{MethodDecl, MetadataTag};
use crate::schema_expander::NO_COMMENTS_FOUND;
use crate::type_classifier::primitive_label;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A documented request header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HeaderEntry {
    pub name: String,
    #[serde(rename = "type", default = "default_header_type")]
    pub type_label: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_header_type() -> String {
    "string".to_string()
}

fn default_required() -> bool {
    true
}

impl HeaderEntry {
    /// A required string header
    pub fn new(name: &str, desc: &str) -> Self {
        Self {
            name: name.to_string(),
            type_label: default_header_type(),
            desc: desc.to_string(),
            required: true,
        }
    }
}

/// Merges configured default headers with the headers a method declares.
///
/// Defaults come first. A later entry equal in every field to an earlier one is
/// dropped, so merging the same declared set again changes nothing.
pub fn merge(defaults: &[HeaderEntry], declared: &[HeaderEntry]) -> Vec<HeaderEntry> {
    if defaults.is_empty() {
        return declared.to_vec();
    }

    let mut seen = HashSet::new();
    defaults
        .iter()
        .chain(declared)
        .filter(|header| seen.insert(*header))
        .cloned()
        .collect()
}

/// Headers declared on a method, from `#[request_header(...)]` method tags and
/// from parameters tagged `#[request_header]`.
///
/// Method tags read `value` or `name`, `description`, `required` and
/// `data_type` (`type` is a keyword and cannot be an attribute key).
pub fn declared_headers(method: &MethodDecl) -> Vec<HeaderEntry> {
    let mut headers: Vec<HeaderEntry> = method
        .tags
        .iter()
        .filter(|tag| tag.is(REQUEST_HEADER))
        .filter_map(header_from_method_tag)
        .collect();

    let comments = method.doc.param_comments();
    for param in &method.params {
        let Some(tag) = param.tags.iter().find(|tag| tag.is(REQUEST_HEADER)) else {
            continue;
        };
        let name = read_name_override(tag).unwrap_or_else(|| param.name.clone());
        let desc = comments
            .get(&param.name)
            .filter(|c| !c.is_empty())
            .map(String::as_str)
            .unwrap_or(NO_COMMENTS_FOUND);
        let type_label = primitive_label(&param.ty.unwrap_transparent().simple_name).unwrap_or("string");

        headers.push(HeaderEntry {
            name,
            type_label: type_label.to_string(),
            desc: desc.to_string(),
            required: tag_required(tag) && !param.ty.is_option(),
        });
    }

    debug!("Method {} declares {} headers", method.name, headers.len());
    headers
}

fn header_from_method_tag(tag: &MetadataTag) -> Option<HeaderEntry> {
    let Some(name) = read_name_override(tag) else {
        debug!("Ignoring #[{}] without a header name", tag.name);
        return None;
    };
    let desc = tag
        .property("description")
        .or_else(|| tag.property("desc"))
        .map(|d| d.trim_matches('"').to_string())
        .unwrap_or_default();
    let type_label = tag
        .property("data_type")
        .map(|t| t.trim_matches('"').to_string())
        .unwrap_or_else(default_header_type);

    Some(HeaderEntry {
        name,
        type_label,
        desc,
        required: tag_required(tag),
    })
}
