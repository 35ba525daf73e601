//! Source model extraction for annotated controller declarations.
//!
//! This module defines the declaration model the documentation engine works on
//! (declarations, methods, parameters, metadata tags and type descriptors) and the
//! [`DeclarationExtractor`] trait that builds it from parsed Rust files.
//!
//! # Source Conventions
//!
//! - **Controllers**: `impl` blocks tagged `#[rest_controller]` or `#[controller]`
//! - **Metadata tags**: attributes on methods and on method parameters
//!   (`fn find(&self, #[path_variable("id")] id: String)`)
//! - **Doc tags**: `@param`, `@author`, `@apiNote` and `@ignore` lines in `///` comments
//!
//! # Example
//!
//! ```no_run
//! use apidoc_from_source::extractor::{DeclarationExtractor, controller::ControllerExtractor};
//! use apidoc_from_source::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("src/api/users.rs")).unwrap();
//! let declarations = ControllerExtractor.extract_declarations(&[parsed]);
//! println!("Found {} declarations", declarations.len());
//! ```

pub mod controller;

use crate::parser::ParsedFile;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Trait for extracting the declaration model from parsed Rust files.
pub trait DeclarationExtractor {
    /// Extracts every declaration found in the parsed files, in file order and
    /// then source order.
    fn extract_declarations(&self, parsed_files: &[ParsedFile]) -> Vec<Declaration>;
}

/// A type-level declaration (an `impl` block) with its methods.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// The self type name (e.g. "UserController")
    pub name: String,
    /// Module path plus name (e.g. "api::users::UserController")
    pub qualified_name: String,
    /// Doc comment attached to the declaration
    pub doc: DocComment,
    /// Metadata tags attached to the declaration
    pub tags: Vec<MetadataTag>,
    /// Capabilities derived from the tags
    pub capabilities: Vec<Capability>,
    /// Methods in source order
    pub methods: Vec<MethodDecl>,
}

/// Capability markers a declaration can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `#[controller]`
    Controller,
    /// `#[rest_controller]`
    RestController,
}

/// Method visibility as far as request dispatch is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Any `pub` form
    Public,
    /// No visibility modifier
    Private,
}

/// A method signature with its metadata.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub visibility: Visibility,
    pub doc: DocComment,
    pub tags: Vec<MetadataTag>,
    /// Parameters in declaration order, receiver excluded
    pub params: Vec<ParamDecl>,
    /// `None` for `-> ()` and for methods without a return type
    pub return_type: Option<TypeDescriptor>,
}

/// A single method parameter.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeDescriptor,
    pub tags: Vec<MetadataTag>,
}

/// A named piece of structured metadata (an attribute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTag {
    /// Tag name as written, last path segment only
    pub name: String,
    /// Property name to literal text; a positional literal is stored as `value`
    pub properties: BTreeMap<String, String>,
}

/// A doc comment split into free text and `@tag` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Free text, lines joined with `\n`
    pub text: String,
    /// `@name value` lines in source order
    pub tags: Vec<(String, String)>,
}

/// Resolved type identity of a declared type.
///
/// Arrays and slices carry a trailing `[]` on their names and hold the element
/// type as their single type argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    /// Last path segment (e.g. "HashMap")
    pub simple_name: String,
    /// Path as written, without generics (e.g. "std::collections::HashMap")
    pub qualified_name: String,
    /// Canonical text including generics (e.g. "std::collections::HashMap<String, Item>")
    pub generic_name: String,
    /// Type arguments in order
    pub type_args: Vec<TypeDescriptor>,
}

/// Types that only wrap their single argument.
const TRANSPARENT_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow"];

/// Normalizes a tag name for comparison: ASCII lowercase with `_` removed.
pub fn normalize_tag_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Capability {
    /// Derives the capability set of a declaration from its tags
    pub fn from_tags(tags: &[MetadataTag]) -> Vec<Capability> {
        let mut capabilities = Vec::new();
        for tag in tags {
            let capability = match normalize_tag_name(&tag.name).as_str() {
                "controller" => Capability::Controller,
                "restcontroller" => Capability::RestController,
                _ => continue,
            };
            if !capabilities.contains(&capability) {
                capabilities.push(capability);
            }
        }
        capabilities
    }
}

impl Declaration {
    /// Whether the declaration exposes request handlers
    pub fn is_controller(&self) -> bool {
        self.capabilities
            .iter()
            .any(|c| matches!(c, Capability::Controller | Capability::RestController))
    }
}

impl MethodDecl {
    /// Whether a request dispatcher can invoke the method
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

impl MetadataTag {
    /// Create a tag without properties
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Whether this tag is `name`, ignoring case and underscores
    pub fn is(&self, name: &str) -> bool {
        normalize_tag_name(&self.name) == normalize_tag_name(name)
    }

    /// Whether this tag is any of `names`
    pub fn is_any(&self, names: &[&str]) -> bool {
        let normalized = normalize_tag_name(&self.name);
        names.iter().any(|n| normalize_tag_name(n) == normalized)
    }
}

impl DocComment {
    /// Parse raw doc lines into text and `@tag` entries
    pub fn parse(raw: &str) -> Self {
        let mut text_lines = Vec::new();
        let mut tags = Vec::new();

        for line in raw.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix('@') {
                let (name, value) = match rest.split_once(char::is_whitespace) {
                    Some((name, value)) => (name, value.trim()),
                    None => (rest, ""),
                };
                if !name.is_empty() {
                    tags.push((name.to_string(), value.to_string()));
                    continue;
                }
            }
            text_lines.push(line);
        }

        // Trim blank lines at both ends
        while text_lines.last().is_some_and(|l| l.is_empty()) {
            text_lines.pop();
        }
        let start = text_lines.iter().position(|l| !l.is_empty()).unwrap_or(text_lines.len());

        Self {
            text: text_lines[start..].join("\n"),
            tags,
        }
    }

    /// The free text, or `None` when there is none
    pub fn description(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    /// Value of the first `@name` tag
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|(n, _)| n == name)
    }

    /// `@param <name> <comment>` entries keyed by parameter name
    pub fn param_comments(&self) -> HashMap<String, String> {
        self.tags
            .iter()
            .filter(|(n, _)| n == "param")
            .filter_map(|(_, v)| {
                let mut parts = v.splitn(2, char::is_whitespace);
                let name = parts.next()?.trim();
                if name.is_empty() {
                    return None;
                }
                let comment = parts.next().unwrap_or("").trim();
                Some((name.to_string(), comment.to_string()))
            })
            .collect()
    }
}

impl TypeDescriptor {
    /// Create a descriptor for a non-generic type
    pub fn new(name: &str) -> Self {
        let simple_name = name.rsplit("::").next().unwrap_or(name).to_string();
        Self {
            simple_name,
            qualified_name: name.to_string(),
            generic_name: name.to_string(),
            type_args: Vec::new(),
        }
    }

    /// Create a descriptor for a generic type
    pub fn generic(name: &str, type_args: Vec<TypeDescriptor>) -> Self {
        if type_args.is_empty() {
            return Self::new(name);
        }
        let args: Vec<&str> = type_args.iter().map(|a| a.generic_name.as_str()).collect();
        Self {
            generic_name: format!("{}<{}>", name, args.join(", ")),
            type_args,
            ..Self::new(name)
        }
    }

    /// Create a descriptor for an array or slice of `element`
    pub fn array(element: TypeDescriptor) -> Self {
        Self {
            simple_name: format!("{}[]", element.simple_name),
            qualified_name: format!("{}[]", element.qualified_name),
            generic_name: format!("{}[]", element.generic_name),
            type_args: vec![element],
        }
    }

    /// Build a descriptor from Rust type syntax
    pub fn from_syn(ty: &syn::Type) -> Self {
        match ty {
            syn::Type::Path(type_path) => Self::from_path(&type_path.path),
            syn::Type::Reference(reference) => Self::from_syn(&reference.elem),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem),
            syn::Type::Group(group) => Self::from_syn(&group.elem),
            syn::Type::Slice(slice) => Self::array(Self::from_syn(&slice.elem)),
            syn::Type::Array(array) => Self::array(Self::from_syn(&array.elem)),
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => Self::new("()"),
            syn::Type::ImplTrait(_) => Self::new("impl"),
            syn::Type::TraitObject(_) => Self::new("dyn"),
            _ => Self::new("Unknown"),
        }
    }

    fn from_path(path: &syn::Path) -> Self {
        let qualified: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let name = qualified.join("::");

        let mut type_args = Vec::new();
        if let Some(last) = path.segments.last() {
            if let syn::PathArguments::AngleBracketed(args) = &last.arguments {
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner) = arg {
                        type_args.push(Self::from_syn(inner));
                    }
                }
            }
        }

        Self::generic(&name, type_args)
    }

    /// Whether the type was written with array syntax
    pub fn is_array(&self) -> bool {
        self.generic_name.ends_with("[]")
    }

    /// Element type of an array or collection.
    ///
    /// Taken from the single type argument, or from the name with the trailing
    /// `[]` stripped.
    pub fn element_type(&self) -> Option<TypeDescriptor> {
        if let Some(first) = self.type_args.first() {
            return Some(first.clone());
        }
        self.generic_name
            .find('[')
            .map(|idx| TypeDescriptor::new(&self.generic_name[..idx]))
    }

    /// Looks through `Option`, `Box`, `Rc`, `Arc` and `Cow`
    pub fn unwrap_transparent(&self) -> &TypeDescriptor {
        let mut current = self;
        while TRANSPARENT_WRAPPERS.contains(&current.simple_name.as_str())
            && current.type_args.len() == 1
        {
            current = &current.type_args[0];
        }
        current
    }

    /// Whether this is `Option<T>`
    pub fn is_option(&self) -> bool {
        self.simple_name == "Option" && self.type_args.len() == 1
    }
}
