use crate::extractor::controller::doc_from_attrs;
use crate::extractor::TypeDescriptor;
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::HashMap;
use syn::visit::Visit;
use syn::{Expr, LitStr, Token};

/// Type resolver - maps type names back to the struct and enum declarations of the project.
///
/// Types are indexed by simple name when the resolver is built. Library and
/// platform types are not indexed and resolve to `None`.
pub struct TypeResolver {
    types: HashMap<String, ResolvedType>,
}

/// Resolved type information
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// The type name
    pub name: String,
    /// The kind of type
    pub kind: TypeKind,
}

/// Type kind - the declaration shapes the resolver understands
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A struct type with fields
    Struct(StructDef),
    /// An enum type with variants
    Enum(EnumDef),
}

/// Struct definition with fields
#[derive(Debug, Clone)]
pub struct StructDef {
    /// Names of the struct's type parameters, in order
    pub generics: Vec<String>,
    /// The fields of the struct
    pub fields: Vec<FieldDef>,
}

/// Field definition in a struct
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name as declared
    pub name: String,
    /// Declared type
    pub ty: TypeDescriptor,
    /// Text of the field's doc comment
    pub doc: String,
    /// Serde attributes applied to this field
    pub serde_attrs: SerdeAttributes,
}

/// Enum definition with variants
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// The variants of the enum
    pub variants: Vec<String>,
}

/// Serde attributes for a field
#[derive(Debug, Clone, Default)]
pub struct SerdeAttributes {
    /// Renamed field name
    pub rename: Option<String>,
    /// Whether to skip this field during serialization
    pub skip: bool,
    /// Whether to flatten this field
    pub flatten: bool,
}

impl FieldDef {
    /// Field name on the wire
    pub fn wire_name(&self) -> &str {
        self.serde_attrs.rename.as_deref().unwrap_or(&self.name)
    }

    /// Whether the field may be absent (`Option<T>`)
    pub fn optional(&self) -> bool {
        self.ty.is_option()
    }
}

impl TypeResolver {
    /// Create a new TypeResolver indexing every struct and enum in `parsed_files`
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        let mut indexer = TypeIndexer {
            types: HashMap::new(),
        };
        for parsed_file in parsed_files {
            indexer.visit_file(&parsed_file.syntax_tree);
        }
        debug!(
            "Initialized TypeResolver with {} types from {} files",
            indexer.types.len(),
            parsed_files.len()
        );
        Self {
            types: indexer.types,
        }
    }

    /// Resolve a type by simple or qualified name
    pub fn resolve(&self, type_name: &str) -> Option<&ResolvedType> {
        let simple = type_name.rsplit("::").next().unwrap_or(type_name);
        let resolved = self.types.get(simple);
        if resolved.is_none() {
            debug!("Could not resolve type: {}", type_name);
        }
        resolved
    }

    /// Resolve the declaration behind a descriptor
    pub fn resolve_descriptor(&self, ty: &TypeDescriptor) -> Option<&ResolvedType> {
        self.resolve(&ty.simple_name)
    }

    /// Whether the descriptor names an enum declared in the project
    pub fn is_enum(&self, ty: &TypeDescriptor) -> bool {
        matches!(
            self.types.get(&ty.simple_name).map(|r| &r.kind),
            Some(TypeKind::Enum(_))
        )
    }

    /// Number of indexed types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Visitor indexing struct and enum declarations, inline modules included
struct TypeIndexer {
    types: HashMap<String, ResolvedType>,
}

impl TypeIndexer {
    fn insert(&mut self, resolved: ResolvedType) {
        if self.types.contains_key(&resolved.name) {
            warn!("Duplicate type name {}, keeping the first definition", resolved.name);
            return;
        }
        self.types.insert(resolved.name.clone(), resolved);
    }
}

impl<'ast> Visit<'ast> for TypeIndexer {
    fn visit_item_struct(&mut self, item_struct: &'ast syn::ItemStruct) {
        let resolved = parse_struct_definition(item_struct);
        self.insert(resolved);
    }

    fn visit_item_enum(&mut self, item_enum: &'ast syn::ItemEnum) {
        let variants: Vec<String> = item_enum
            .variants
            .iter()
            .map(|v| v.ident.to_string())
            .collect();
        debug!("Parsed enum {} with {} variants", item_enum.ident, variants.len());
        self.insert(ResolvedType {
            name: item_enum.ident.to_string(),
            kind: TypeKind::Enum(EnumDef { variants }),
        });
    }
}

/// Parse a struct definition into a ResolvedType
fn parse_struct_definition(item_struct: &syn::ItemStruct) -> ResolvedType {
    let struct_name = item_struct.ident.to_string();
    let rename_all = container_rename_all(&item_struct.attrs);

    let mut fields = Vec::new();
    if let syn::Fields::Named(named_fields) = &item_struct.fields {
        for field in &named_fields.named {
            let Some(ident) = field.ident.as_ref() else {
                continue;
            };
            let name = ident.to_string();
            let mut serde_attrs = parse_serde_attributes(&field.attrs);
            if serde_attrs.rename.is_none() {
                if let Some(rule) = &rename_all {
                    serde_attrs.rename = Some(apply_rename_rule(rule, &name));
                }
            }
            fields.push(FieldDef {
                ty: TypeDescriptor::from_syn(&field.ty),
                doc: doc_from_attrs(&field.attrs).text,
                serde_attrs,
                name,
            });
        }
    }

    debug!("Parsed struct {} with {} fields", struct_name, fields.len());

    ResolvedType {
        name: struct_name,
        kind: TypeKind::Struct(StructDef {
            generics: item_struct
                .generics
                .type_params()
                .map(|p| p.ident.to_string())
                .collect(),
            fields,
        }),
    }
}

/// Parse Serde attributes from field attributes
fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                serde_attrs.rename = Some(value.value());
            } else if meta.path.is_ident("skip")
                || meta.path.is_ident("skip_serializing")
                || meta.path.is_ident("skip_deserializing")
            {
                serde_attrs.skip = true;
            } else if meta.path.is_ident("flatten") {
                serde_attrs.flatten = true;
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        });
        if let Err(e) = result {
            debug!("Ignoring malformed serde attribute: {}", e);
        }
    }

    serde_attrs
}

/// `#[serde(rename_all = "...")]` on a container
fn container_rename_all(attrs: &[syn::Attribute]) -> Option<String> {
    let mut rule = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                rule = Some(value.value());
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        });
    }
    rule
}

/// Consumes `= expr` or `(...)` after a serde key we do not interpret
fn skip_meta_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta_value(&inner))?;
    }
    Ok(())
}

/// Applies a serde `rename_all` rule to a snake_case field name
fn apply_rename_rule(rule: &str, name: &str) -> String {
    let words: Vec<&str> = name.split('_').filter(|w| !w.is_empty()).collect();
    let capitalize = |w: &str| {
        let mut chars = w.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        }
    };

    match rule {
        "lowercase" => name.to_lowercase(),
        "UPPERCASE" => name.to_uppercase(),
        "camelCase" => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_string() } else { capitalize(w) })
            .collect(),
        "PascalCase" => words.iter().map(|w| capitalize(w)).collect(),
        "SCREAMING_SNAKE_CASE" => name.to_uppercase(),
        "kebab-case" => words.join("-"),
        "SCREAMING-KEBAB-CASE" => words.join("-").to_uppercase(),
        _ => name.to_string(),
    }
}
