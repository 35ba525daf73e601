//! Route resolution from mapping tags.

use crate::extractor::MetadataTag;
use serde::{Deserialize, Serialize};

/// HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Parse an HTTP method name, case-insensitively
    pub fn parse(method: &str) -> Option<HttpMethod> {
        match method.trim().to_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The route a method is mapped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMapping {
    pub http_method: HttpMethod,
    /// Path as written on the method, relative to the declaration's base path
    pub path: String,
}

const REQUEST_MAPPING: &str = "RequestMapping";

/// Verb-specific mapping tags
const VERB_MAPPINGS: &[(&str, HttpMethod)] = &[
    ("GetMapping", HttpMethod::Get),
    ("PostMapping", HttpMethod::Post),
    ("PutMapping", HttpMethod::Put),
    ("DeleteMapping", HttpMethod::Delete),
    ("PatchMapping", HttpMethod::Patch),
];

/// Path of a mapping tag: `value`, then `path`
fn mapping_path(tag: &MetadataTag) -> String {
    tag.property("value")
        .or_else(|| tag.property("path"))
        .map(|p| p.trim().trim_matches('"').to_string())
        .unwrap_or_default()
}

/// Base path declared on a controller with `#[request_mapping("/base")]`
pub fn base_path(tags: &[MetadataTag]) -> String {
    tags.iter()
        .find(|tag| tag.is(REQUEST_MAPPING))
        .map(mapping_path)
        .unwrap_or_default()
}

/// The mapping of a method, from its first mapping tag
pub fn method_mapping(tags: &[MetadataTag]) -> Option<RequestMapping> {
    tags.iter().find_map(mapping_from_tag)
}

fn mapping_from_tag(tag: &MetadataTag) -> Option<RequestMapping> {
    if tag.is(REQUEST_MAPPING) {
        // Several methods may be listed; the first one is documented
        let http_method = tag
            .property("method")
            .and_then(|m| m.split(',').next())
            .and_then(HttpMethod::parse)
            .unwrap_or(HttpMethod::Get);
        return Some(RequestMapping {
            http_method,
            path: mapping_path(tag),
        });
    }

    let http_method = VERB_MAPPINGS
        .iter()
        .find(|(name, _)| tag.is(name))
        .map(|(_, method)| *method)
        .or_else(|| {
            // Bare verbs as used by actix-web style route macros
            tag.name
                .chars()
                .all(|c| c.is_ascii_lowercase())
                .then(|| HttpMethod::parse(&tag.name))
                .flatten()
        })?;

    Some(RequestMapping {
        http_method,
        path: mapping_path(tag),
    })
}

/// Combine a scope and a path, handling slashes correctly
pub fn combine_paths(scope: &str, path: &str) -> String {
    if scope.is_empty() {
        return path.to_string();
    }

    let scope = scope.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        scope.to_string()
    } else {
        format!("{}/{}", scope, path)
    }
}

/// Full URL of a route: server URL, base path and method path joined with single slashes
pub fn build_url(server_url: &str, base: &str, path: &str) -> String {
    let route = [base, path]
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .fold(String::new(), |acc, segment| combine_paths(&acc, segment));

    let server = server_url.trim().trim_end_matches('/');
    if route.is_empty() {
        return if server.is_empty() { "/".to_string() } else { server.to_string() };
    }
    format!("{}/{}", server, route)
}
