//! Attribute-driven extraction of controller declarations.
//!
//! Every inherent `impl` block becomes a [`Declaration`]. Its attributes turn
//! into [`MetadataTag`]s and its `///` lines into a [`DocComment`]. Inline
//! modules extend the qualified name of the blocks they contain.

use crate::extractor::{
    Capability, Declaration, DeclarationExtractor, DocComment, MetadataTag, MethodDecl, ParamDecl,
    TypeDescriptor, Visibility,
};
use crate::parser::ParsedFile;
use log::debug;
use syn::punctuated::Punctuated;
use syn::{visit::Visit, Attribute, Expr, Lit, Meta, Token};

/// Compiler attributes that never carry documentation metadata.
const BUILTIN_ATTRIBUTES: &[&str] = &[
    "doc", "allow", "warn", "deny", "expect", "cfg", "cfg_attr", "inline", "must_use", "deprecated",
];

/// Extracts one [`Declaration`] per inherent `impl` block.
pub struct ControllerExtractor;

impl DeclarationExtractor for ControllerExtractor {
    fn extract_declarations(&self, parsed_files: &[ParsedFile]) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        for parsed_file in parsed_files {
            let mut visitor = DeclarationVisitor::new(parsed_file.module_path.clone());
            visitor.visit_file(&parsed_file.syntax_tree);
            debug!(
                "Extracted {} declarations from {}",
                visitor.declarations.len(),
                parsed_file.path.display()
            );
            declarations.extend(visitor.declarations);
        }

        declarations
    }
}

/// Visitor collecting `impl` blocks while tracking inline modules
struct DeclarationVisitor {
    module_stack: Vec<String>,
    declarations: Vec<Declaration>,
}

impl DeclarationVisitor {
    fn new(module_path: Vec<String>) -> Self {
        Self {
            module_stack: module_path,
            declarations: Vec::new(),
        }
    }

    fn qualified_name(&self, name: &str) -> String {
        let mut parts = self.module_stack.clone();
        parts.push(name.to_string());
        parts.join("::")
    }

    fn parse_method(&self, item_fn: &syn::ImplItemFn) -> MethodDecl {
        let params = item_fn
            .sig
            .inputs
            .iter()
            .enumerate()
            .filter_map(|(idx, input)| match input {
                syn::FnArg::Receiver(_) => None,
                syn::FnArg::Typed(pat_type) => Some(parse_param(idx, pat_type)),
            })
            .collect();

        let return_type = match &item_fn.sig.output {
            syn::ReturnType::Default => None,
            syn::ReturnType::Type(_, ty) => {
                let descriptor = TypeDescriptor::from_syn(ty);
                (descriptor.simple_name != "()").then_some(descriptor)
            }
        };

        let visibility = match item_fn.vis {
            syn::Visibility::Inherited => Visibility::Private,
            _ => Visibility::Public,
        };

        MethodDecl {
            name: item_fn.sig.ident.to_string(),
            visibility,
            doc: doc_from_attrs(&item_fn.attrs),
            tags: tags_from_attrs(&item_fn.attrs),
            params,
            return_type,
        }
    }
}

impl<'ast> Visit<'ast> for DeclarationVisitor {
    fn visit_item_mod(&mut self, item_mod: &'ast syn::ItemMod) {
        self.module_stack.push(item_mod.ident.to_string());
        syn::visit::visit_item_mod(self, item_mod);
        self.module_stack.pop();
    }

    fn visit_item_impl(&mut self, item_impl: &'ast syn::ItemImpl) {
        // Trait impls are not request handler containers
        if item_impl.trait_.is_some() {
            return;
        }

        let name = TypeDescriptor::from_syn(&item_impl.self_ty).simple_name;
        let tags = tags_from_attrs(&item_impl.attrs);
        let methods: Vec<MethodDecl> = item_impl
            .items
            .iter()
            .filter_map(|item| match item {
                syn::ImplItem::Fn(item_fn) => Some(self.parse_method(item_fn)),
                _ => None,
            })
            .collect();

        debug!("Found impl block {} with {} methods", name, methods.len());

        self.declarations.push(Declaration {
            qualified_name: self.qualified_name(&name),
            doc: doc_from_attrs(&item_impl.attrs),
            capabilities: Capability::from_tags(&tags),
            name,
            tags,
            methods,
        });
    }
}

fn parse_param(idx: usize, pat_type: &syn::PatType) -> ParamDecl {
    let name = match pat_type.pat.as_ref() {
        syn::Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
        _ => format!("arg{}", idx),
    };

    ParamDecl {
        name,
        ty: TypeDescriptor::from_syn(&pat_type.ty),
        tags: tags_from_attrs(&pat_type.attrs),
    }
}

/// Collects `///` lines into a [`DocComment`]
pub(crate) fn doc_from_attrs(attrs: &[Attribute]) -> DocComment {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(s) => Some(s.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect();

    DocComment::parse(&lines.join("\n"))
}

/// Converts attributes into metadata tags, skipping compiler built-ins
pub(crate) fn tags_from_attrs(attrs: &[Attribute]) -> Vec<MetadataTag> {
    attrs
        .iter()
        .filter_map(|attr| {
            let name = attr.path().segments.last()?.ident.to_string();
            if BUILTIN_ATTRIBUTES.contains(&name.as_str()) {
                return None;
            }
            Some(tag_from_attr(&name, attr))
        })
        .collect()
}

fn tag_from_attr(name: &str, attr: &Attribute) -> MetadataTag {
    let mut tag = MetadataTag::new(name);

    match &attr.meta {
        Meta::Path(_) => {}
        Meta::NameValue(nv) => {
            if let Some(value) = expr_text(&nv.value) {
                tag.properties.insert("value".to_string(), value);
            }
        }
        Meta::List(_) => {
            let args = match attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                Ok(args) => args,
                Err(e) => {
                    debug!("Ignoring arguments of #[{}]: {}", name, e);
                    return tag;
                }
            };
            for arg in args {
                match arg {
                    Expr::Assign(assign) => {
                        let key = match assign.left.as_ref() {
                            Expr::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
                            _ => None,
                        };
                        if let (Some(key), Some(value)) = (key, expr_text(&assign.right)) {
                            tag.properties.insert(key, value);
                        }
                    }
                    positional => {
                        if let Some(value) = expr_text(&positional) {
                            tag.properties.entry("value".to_string()).or_insert(value);
                        }
                    }
                }
            }
        }
    }

    tag
}

/// Literal text of an attribute argument; paths keep their last segment
fn expr_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(s) => Some(s.value()),
            Lit::Bool(b) => Some(b.value.to_string()),
            Lit::Int(i) => Some(i.base10_digits().to_string()),
            Lit::Float(f) => Some(f.base10_digits().to_string()),
            Lit::Char(c) => Some(c.value().to_string()),
            _ => None,
        },
        Expr::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        Expr::Array(array) => {
            let items: Vec<String> = array.elems.iter().filter_map(expr_text).collect();
            Some(items.join(","))
        }
        Expr::Group(group) => expr_text(&group.expr),
        Expr::Paren(paren) => expr_text(&paren.expr),
        _ => None,
    }
}
