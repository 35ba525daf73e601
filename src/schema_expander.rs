//! Recursive expansion of object types into flat, depth-annotated fields.
//!
//! Each nested level carries the set of types on the path from the root, cloned
//! per recursion, so a self-referential type is listed once and not expanded
//! again while sibling branches may still expand the same type.

use crate::extractor::TypeDescriptor;
use crate::type_classifier::{array_label, is_builtin_map, map_value_type, TypeClassifier, TypeShape};
use crate::type_resolver::{FieldDef, TypeKind, TypeResolver};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Description used when a parameter or field has no doc comment.
pub const NO_COMMENTS_FOUND: &str = "No comments found.";

/// The atomic documentation unit: one (possibly nested) field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name; empty only for an anonymous body wrapper
    pub field: String,
    /// Free-text type label ("string", "array of integer", "object", ...)
    #[serde(rename = "type")]
    pub type_label: String,
    /// Description text
    pub desc: String,
    /// Whether the field is required
    pub required: bool,
    /// Nesting depth, 0 for top-level fields
    pub depth: usize,
    /// Display prefix signalling nesting to a renderer
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

/// A method input parameter; same shape as a schema field.
pub type ParamEntry = SchemaField;

impl SchemaField {
    /// A top-level field
    pub fn leaf(field: &str, type_label: &str, desc: &str, required: bool) -> Self {
        Self {
            field: field.to_string(),
            type_label: type_label.to_string(),
            desc: desc.to_string(),
            required,
            depth: 0,
            prefix: String::new(),
        }
    }

    /// Place the field at `depth` with a display prefix
    pub fn nested(mut self, depth: usize, prefix: &str) -> Self {
        self.depth = depth;
        self.prefix = prefix.to_string();
        self
    }
}

/// Display prefix for fields at `depth`: empty at the top level, `└─` below it,
/// indented two spaces per further level.
pub fn nested_prefix(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        format!("{}└─", "  ".repeat(depth - 1))
    }
}

/// Flattens an object type into an ordered list of documentation fields.
///
/// `visited` holds the object types already being expanded on the current path;
/// implementations must not expand a type found in it, which guarantees
/// termination on self-referential types. Callers start every top-level
/// expansion with a fresh set.
pub trait SchemaExpander {
    fn expand(
        &self,
        ty: &TypeDescriptor,
        prefix: &str,
        depth: usize,
        required: bool,
        visited: &HashSet<String>,
    ) -> Vec<SchemaField>;
}

/// [`SchemaExpander`] over the structs known to a [`TypeResolver`].
pub struct FieldExpander<'a> {
    resolver: &'a TypeResolver,
    classifier: TypeClassifier<'a>,
}

impl<'a> FieldExpander<'a> {
    pub fn new(resolver: &'a TypeResolver) -> Self {
        debug!("Initializing FieldExpander");
        Self {
            resolver,
            classifier: TypeClassifier::new(resolver),
        }
    }

    /// Whether the type resolves to a struct that can be expanded
    fn is_expandable(&self, ty: &TypeDescriptor) -> bool {
        matches!(
            self.resolver.resolve_descriptor(ty.unwrap_transparent()).map(|r| &r.kind),
            Some(TypeKind::Struct(_))
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_field(
        &self,
        field: &FieldDef,
        ty: &TypeDescriptor,
        prefix: &str,
        depth: usize,
        required: bool,
        visited: &HashSet<String>,
        out: &mut Vec<SchemaField>,
    ) {
        let name = field.wire_name();
        let desc = if field.doc.is_empty() {
            NO_COMMENTS_FOUND
        } else {
            field.doc.as_str()
        };
        let child_prefix = nested_prefix(depth + 1);
        let entry = |label: &str| SchemaField::leaf(name, label, desc, required).nested(depth, prefix);

        match self.classifier.classify(ty) {
            TypeShape::FrameworkIgnored => {}
            TypeShape::FileUpload => out.push(entry("file")),
            TypeShape::Primitive => out.push(entry(self.classifier.primitive_label(ty))),
            TypeShape::Enum => out.push(entry("string")),
            TypeShape::Array | TypeShape::Collection => {
                let element = ty.unwrap_transparent().element_type();
                match element {
                    Some(element) if self.is_expandable(&element) => {
                        out.push(entry(&array_label("object")));
                        out.extend(self.expand(&element, &child_prefix, depth + 1, required, visited));
                    }
                    Some(element) => out.push(entry(&array_label(&self.classifier.raw_label(&element)))),
                    None => out.push(entry("array")),
                }
            }
            TypeShape::Map => match map_value_type(ty) {
                Some(value) if !is_builtin_map(ty) && self.is_expandable(value) => {
                    out.push(entry("map"));
                    out.extend(self.expand(value, &child_prefix, depth + 1, required, visited));
                }
                _ => out.push(entry("map")),
            },
            TypeShape::Object => {
                out.push(entry("object"));
                if self.is_expandable(ty) {
                    out.extend(self.expand(ty, &child_prefix, depth + 1, required, visited));
                } else {
                    debug!("Field {} has unresolved type {}", name, ty.generic_name);
                }
            }
        }
    }
}

impl SchemaExpander for FieldExpander<'_> {
    fn expand(
        &self,
        ty: &TypeDescriptor,
        prefix: &str,
        depth: usize,
        required: bool,
        visited: &HashSet<String>,
    ) -> Vec<SchemaField> {
        let ty = ty.unwrap_transparent();
        let Some(resolved) = self.resolver.resolve_descriptor(ty) else {
            debug!("Cannot expand unresolved type {}", ty.generic_name);
            return Vec::new();
        };
        let TypeKind::Struct(def) = &resolved.kind else {
            return Vec::new();
        };
        if visited.contains(&resolved.name) {
            debug!("Self reference to {} at depth {}, not expanding", resolved.name, depth);
            return Vec::new();
        }

        debug!("Expanding {} at depth {}", ty.generic_name, depth);
        let mut visited = visited.clone();
        visited.insert(resolved.name.clone());

        let substitutions: HashMap<&str, &TypeDescriptor> = def
            .generics
            .iter()
            .map(String::as_str)
            .zip(ty.type_args.iter())
            .collect();

        let mut fields = Vec::new();
        for field in &def.fields {
            if field.serde_attrs.skip {
                continue;
            }
            let field_ty = substitute(&field.ty, &substitutions);
            let field_required = required && !field.optional();
            if field.serde_attrs.flatten {
                fields.extend(self.expand(&field_ty, prefix, depth, field_required, &visited));
                continue;
            }
            self.expand_field(field, &field_ty, prefix, depth, field_required, &visited, &mut fields);
        }
        fields
    }
}

/// Replaces generic parameters of a field type with the concrete arguments
fn substitute(ty: &TypeDescriptor, substitutions: &HashMap<&str, &TypeDescriptor>) -> TypeDescriptor {
    if substitutions.is_empty() {
        return ty.clone();
    }
    if ty.type_args.is_empty() {
        if let Some(concrete) = substitutions.get(ty.qualified_name.as_str()) {
            return (*concrete).clone();
        }
        return ty.clone();
    }
    if ty.is_array() {
        return TypeDescriptor::array(substitute(&ty.type_args[0], substitutions));
    }
    let args = ty.type_args.iter().map(|arg| substitute(arg, substitutions)).collect();
    TypeDescriptor::generic(&ty.qualified_name, args)
}
