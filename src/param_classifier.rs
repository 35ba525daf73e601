//! Parameter classification engine.
//!
//! For one method, decides for every parameter whether it is bound to the query
//! (or path) or to the request body, whether it is required, which type label it
//! carries, and whether it is expanded into a nested field tree.
//!
//! Parameters are processed in declaration order:
//!
//! 1. framework-injected types are dropped
//! 2. in strict mode, a primitive parameter without an `@param` comment is fatal
//! 3. file uploads become a single required `file` field
//! 4. untagged parameters are classified by type shape into the query list
//! 5. tagged parameters are bound by their first binding tag; `RequestBody` (or a
//!    lone `Valid`) binds the body, and only one parameter may do so
//!
//! Body fields always follow the query fields in the final list.

use crate::annotation::{
    is_body_binding, is_query_or_path_binding, is_validator, read_name_override, read_required,
    tag_required,
};
use crate::error::{Error, Result};
use crate::extractor::{MethodDecl, ParamDecl, TypeDescriptor};
use crate::schema_expander::{nested_prefix, ParamEntry, SchemaExpander, SchemaField, NO_COMMENTS_FOUND};
use crate::type_classifier::{array_label, is_builtin_map, map_value_type, TypeClassifier, TypeShape};
use crate::type_resolver::TypeResolver;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Wrappers looked through when documenting a return type.
const RESPONSE_WRAPPERS: &[&str] = &["Result", "Json", "Option", "Box", "Rc", "Arc", "Cow"];

/// The classified input parameters of one method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedParams {
    /// Query and path fields, in declaration order
    pub query: Vec<ParamEntry>,
    /// Fields of the body-bound parameter, in accumulation order
    pub body: Vec<ParamEntry>,
}

impl ClassifiedParams {
    /// Whether a parameter was bound to the request body
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Query fields followed by the body block
    pub fn into_ordered(self) -> Vec<ParamEntry> {
        let mut ordered = self.query;
        ordered.extend(self.body);
        ordered
    }
}

/// Classifies the parameters and return type of methods.
pub struct ParamClassifier<'a> {
    resolver: &'a TypeResolver,
    classifier: TypeClassifier<'a>,
    expander: &'a dyn SchemaExpander,
    strict: bool,
}

impl<'a> ParamClassifier<'a> {
    pub fn new(resolver: &'a TypeResolver, expander: &'a dyn SchemaExpander, strict: bool) -> Self {
        Self {
            resolver,
            classifier: TypeClassifier::new(resolver),
            expander,
            strict,
        }
    }

    /// Classify the parameters of `method`, declared in `declaration`.
    ///
    /// Returns `Ok(None)` for a method without parameters.
    ///
    /// # Errors
    ///
    /// - [`Error::DocumentationIncomplete`] in strict mode when a primitive
    ///   parameter has no `@param` comment
    /// - [`Error::MultipleBodyBindings`] when two parameters bind the body
    pub fn classify_method(&self, declaration: &str, method: &MethodDecl) -> Result<Option<ClassifiedParams>> {
        if method.params.is_empty() {
            return Ok(None);
        }

        let comments = method.doc.param_comments();
        let mut params = ClassifiedParams::default();
        let mut body_bound = false;

        for param in &method.params {
            let shape = self.classifier.classify(&param.ty);
            if shape == TypeShape::FrameworkIgnored {
                debug!("Skipping framework parameter {}: {}", param.name, param.ty.generic_name);
                continue;
            }

            let comment = param_comment(&comments, param);
            if self.strict && shape == TypeShape::Primitive && comment.is_none() {
                return Err(Error::DocumentationIncomplete {
                    declaration: declaration.to_string(),
                    method: method.name.clone(),
                    parameter: Some(param.name.clone()),
                });
            }
            let desc = comment.filter(|c| !c.is_empty()).unwrap_or(NO_COMMENTS_FOUND);

            if shape == TypeShape::FileUpload {
                params.query.push(SchemaField::leaf(&param.name, "file", desc, true));
                continue;
            }

            if param.tags.is_empty() {
                self.classify_shape(param, desc, true, &mut params.query);
                continue;
            }

            let mut param_added = false;
            for tag in &param.tags {
                if is_body_binding(tag, &param.tags) {
                    if body_bound {
                        return Err(Error::MultipleBodyBindings {
                            declaration: declaration.to_string(),
                            method: method.name.clone(),
                        });
                    }
                    body_bound = true;
                    param_added = true;
                    self.classify_shape(param, desc, tag_required(tag), &mut params.body);
                } else if param_added {
                    continue;
                } else if is_query_or_path_binding(tag) {
                    let name = read_name_override(tag).unwrap_or_else(|| param.name.clone());
                    let label = self.classifier.raw_label(&param.ty);
                    params.query.push(SchemaField::leaf(&name, &label, desc, tag_required(tag)));
                    param_added = true;
                } else if is_validator(tag) {
                    let label = self.classifier.raw_label(&param.ty);
                    params
                        .query
                        .push(SchemaField::leaf(&param.name, &label, desc, read_required(&param.tags)));
                    param_added = true;
                } else {
                    debug!("Ignoring tag #[{}] on parameter {}", tag.name, param.name);
                }
            }
        }

        Ok(Some(params))
    }

    /// Applies the type-shape rules to a parameter, appending to `target`
    fn classify_shape(&self, param: &ParamDecl, desc: &str, required: bool, target: &mut Vec<ParamEntry>) {
        let ty = &param.ty;
        let name = param.name.as_str();

        match self.classifier.classify(ty) {
            TypeShape::FrameworkIgnored => {}
            TypeShape::FileUpload => target.push(SchemaField::leaf(name, "file", desc, required)),
            TypeShape::Primitive => {
                let label = self.classifier.primitive_label(ty);
                target.push(SchemaField::leaf(name, label, desc, required));
            }
            TypeShape::Enum => target.push(SchemaField::leaf(name, "string", desc, required)),
            TypeShape::Array | TypeShape::Collection => match ty.unwrap_transparent().element_type() {
                Some(element) if self.is_scalar(&element) => {
                    let label = array_label(&self.classifier.raw_label(&element));
                    target.push(SchemaField::leaf(name, &label, desc, required));
                }
                Some(element) => {
                    target.push(SchemaField::leaf(name, &array_label("object"), desc, required));
                    target.extend(self.expander.expand(&element, &nested_prefix(1), 1, true, &HashSet::new()));
                }
                None => target.push(SchemaField::leaf(name, "array", desc, required)),
            },
            TypeShape::Map => match map_value_type(ty) {
                Some(value) if !is_builtin_map(ty) && !self.is_scalar(value) => {
                    let fields = self.expander.expand(value, "", 0, true, &HashSet::new());
                    self.push_expansion(name, value, desc, required, fields, target);
                }
                _ => target.push(SchemaField::leaf(name, "map", desc, required)),
            },
            TypeShape::Object => {
                let fields = self.expander.expand(ty, "", 0, true, &HashSet::new());
                self.push_expansion(name, ty, desc, required, fields, target);
            }
        }
    }

    /// Appends an object expansion, or a best-effort `object` field when the type is unknown
    fn push_expansion(
        &self,
        name: &str,
        ty: &TypeDescriptor,
        desc: &str,
        required: bool,
        fields: Vec<SchemaField>,
        target: &mut Vec<ParamEntry>,
    ) {
        if fields.is_empty() && self.resolver.resolve_descriptor(ty.unwrap_transparent()).is_none() {
            debug!("Unresolved type {} for parameter {}", ty.generic_name, name);
            target.push(SchemaField::leaf(name, "object", desc, required));
        } else {
            target.extend(fields);
        }
    }

    /// Primitives and enums are documented by label alone
    fn is_scalar(&self, ty: &TypeDescriptor) -> bool {
        matches!(self.classifier.classify(ty), TypeShape::Primitive | TypeShape::Enum)
    }

    /// Fields of the payload returned by a method, `None` when there is nothing to expand
    pub fn response_params(&self, return_type: Option<&TypeDescriptor>) -> Option<Vec<SchemaField>> {
        let mut ty = return_type?;
        while RESPONSE_WRAPPERS.contains(&ty.simple_name.as_str()) && !ty.type_args.is_empty() {
            ty = &ty.type_args[0];
        }

        let target = match self.classifier.classify(ty) {
            TypeShape::Array | TypeShape::Collection => ty.element_type(),
            TypeShape::Map if !is_builtin_map(ty) => map_value_type(ty).cloned(),
            TypeShape::Object if !matches!(ty.simple_name.as_str(), "impl" | "dyn" | "Unknown") => {
                Some(ty.clone())
            }
            _ => None,
        }?;
        if self.is_scalar(&target) {
            return None;
        }

        let fields = self.expander.expand(&target, "", 0, true, &HashSet::new());
        (!fields.is_empty()).then_some(fields)
    }
}

/// The `@param` comment of a parameter, also looked up under its override name
fn param_comment<'c>(comments: &'c HashMap<String, String>, param: &ParamDecl) -> Option<&'c str> {
    if let Some(comment) = comments.get(&param.name) {
        return Some(comment.as_str());
    }
    param
        .tags
        .iter()
        .filter(|tag| is_query_or_path_binding(tag))
        .filter_map(read_name_override)
        .find_map(|name| comments.get(&name))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::controller::ControllerExtractor;
    use crate::extractor::DeclarationExtractor;
    use crate::parser::ParsedFile;
    use crate::schema_expander::FieldExpander;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const MODEL: &str = r#"
        pub struct Order {
            pub id: u64,
            pub items: Vec<Item>,
        }
        pub struct Item {
            pub sku: String,
            pub quantity: u32,
        }
        pub enum Status { Open, Closed }
        pub struct Page<T> { pub rows: Vec<T>, pub total: u64 }
    "#;

    /// Parses `MODEL` plus a controller and returns its resolver and methods
    fn setup(controller: &str) -> (TypeResolver, Vec<MethodDecl>) {
        let parsed = ParsedFile::from_source(
            PathBuf::from("api.rs"),
            vec!["api".to_string()],
            &format!("{}\n{}", MODEL, controller),
        )
        .unwrap();
        let files = [parsed];
        let resolver = TypeResolver::new(&files);
        let declarations = ControllerExtractor.extract_declarations(&files);
        let methods = declarations.into_iter().flat_map(|d| d.methods).collect();
        (resolver, methods)
    }

    fn classify(controller: &str, strict: bool) -> Result<Option<ClassifiedParams>> {
        let (resolver, methods) = setup(controller);
        let expander = FieldExpander::new(&resolver);
        let classifier = ParamClassifier::new(&resolver, &expander, strict);
        classifier.classify_method("api::TestController", &methods[0])
    }

    fn rows(fields: &[SchemaField]) -> Vec<(&str, &str, bool, usize)> {
        fields
            .iter()
            .map(|f| (f.field.as_str(), f.type_label.as_str(), f.required, f.depth))
            .collect()
    }

    #[test]
    fn test_path_variable_defaults_to_required() {
        let params = classify(
            r#"impl TestController { pub fn find(&self, #[path_variable] id: String) {} }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert_eq!(params.query, vec![SchemaField::leaf("id", "string", NO_COMMENTS_FOUND, true)]);
        assert!(!params.has_body());
    }

    #[test]
    fn test_request_body_is_expanded() {
        let params = classify(
            r#"impl TestController {
                /// Create an order.
                /// @param body the order
                pub fn create(&self, #[request_body] body: Order) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert!(params.query.is_empty());
        assert_eq!(
            rows(&params.body),
            vec![
                ("id", "integer", true, 0),
                ("items", "array of object", true, 0),
                ("sku", "string", true, 1),
                ("quantity", "integer", true, 1),
            ]
        );
    }

    #[test]
    fn test_body_fields_follow_query_fields() {
        let params = classify(
            r#"impl TestController {
                pub fn update(
                    &self,
                    #[request_body] body: Item,
                    #[request_param] page: i32,
                    size: i32,
                ) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        let ordered = params.into_ordered();
        let names: Vec<&str> = ordered.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["page", "size", "sku", "quantity"]);
    }

    #[test]
    fn test_multiple_body_bindings_fail() {
        let err = classify(
            r#"impl TestController {
                pub fn create(&self, #[request_body] a: Order, #[valid] b: Item) {}
            }"#,
            false,
        )
        .unwrap_err();

        match err {
            Error::MultipleBodyBindings { declaration, method } => {
                assert_eq!(declaration, "api::TestController");
                assert_eq!(method, "create");
            }
            other => panic!("Expected MultipleBodyBindings, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_with_validator_is_not_body() {
        let params = classify(
            r#"impl TestController {
                pub fn check(&self, #[valid] #[not_blank] name: String) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert!(params.body.is_empty());
        assert_eq!(rows(&params.query), vec![("name", "string", true, 0)]);
    }

    #[test]
    fn test_framework_ignored_parameters_are_dropped() {
        let params = classify(
            r#"impl TestController {
                pub fn list(
                    &self,
                    req: HttpRequest,
                    #[request_body] resp: HttpResponse,
                    #[request_param] state: web::Data<AppState>,
                ) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert!(params.query.is_empty());
        assert!(params.body.is_empty());
    }

    #[test]
    fn test_method_without_parameters_has_no_schema() {
        let params = classify(r#"impl TestController { pub fn ping(&self) {} }"#, false).unwrap();
        assert!(params.is_none());
    }

    #[test]
    fn test_collections_of_primitives_and_objects() {
        let params = classify(
            r#"impl TestController {
                pub fn bulk(&self, ids: Vec<i64>, codes: &[String], items: Vec<Item>, states: Vec<Status>) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            rows(&params.query),
            vec![
                ("ids", "array of integer", true, 0),
                ("codes", "array of string", true, 0),
                ("items", "array of object", true, 0),
                ("sku", "string", true, 1),
                ("quantity", "integer", true, 1),
                ("states", "array of string", true, 0),
            ]
        );
        assert_eq!(params.query[3].prefix, "└─");
    }

    #[test]
    fn test_maps_enums_and_unknown_types() {
        let params = classify(
            r#"impl TestController {
                pub fn misc(
                    &self,
                    raw: HashMap,
                    lookup: HashMap<String, Item>,
                    status: Status,
                    opaque: ExternalThing,
                ) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            rows(&params.query),
            vec![
                ("raw", "map", true, 0),
                ("sku", "string", true, 0),
                ("quantity", "integer", true, 0),
                ("status", "string", true, 0),
                ("opaque", "object", true, 0),
            ]
        );
    }

    #[test]
    fn test_body_bound_builtin_map_goes_to_body() {
        let params = classify(
            r#"impl TestController {
                pub fn patch(&self, #[request_body(required = false)] changes: HashMap) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert!(params.query.is_empty());
        assert_eq!(rows(&params.body), vec![("changes", "map", false, 0)]);
    }

    #[test]
    fn test_file_upload_is_required_file() {
        let params = classify(
            r#"impl TestController {
                pub fn upload(&self, #[request_param(required = false)] file: MultipartFile, files: Vec<MultipartFile>) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert_eq!(rows(&params.query), vec![("file", "file", true, 0), ("files", "file", true, 0)]);
    }

    #[test]
    fn test_query_binding_uses_raw_label_and_override() {
        let params = classify(
            r#"impl TestController {
                /// @param keyword search text
                pub fn search(
                    &self,
                    #[request_param(name = "query", value = "q", required = false)] keyword: String,
                    #[request_param("filter")] filter: Order,
                    #[path_variable] tags: Vec<String>,
                ) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            rows(&params.query),
            vec![("q", "string", false, 0), ("filter", "object", true, 0), ("tags", "array", true, 0)]
        );
        assert_eq!(params.query[0].desc, "search text");
    }

    #[test]
    fn test_first_binding_tag_wins() {
        let params = classify(
            r#"impl TestController {
                pub fn search(
                    &self,
                    #[not_null(required = false)] #[request_param("q")] keyword: String,
                    #[unknown] #[request_param("p")] page: i32,
                ) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        // The validator comes first, so the override on the later tag is never read
        assert_eq!(rows(&params.query), vec![("keyword", "string", false, 0), ("p", "integer", true, 0)]);
    }

    #[test]
    fn test_unrecognized_tags_produce_nothing() {
        let params = classify(
            r#"impl TestController {
                pub fn headers(&self, #[request_header("X-Token")] token: String) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert!(params.query.is_empty());
    }

    #[test]
    fn test_strict_mode_requires_param_comments() {
        let err = classify(
            r#"impl TestController {
                /// Find by id.
                pub fn find(&self, #[path_variable] id: u64) {}
            }"#,
            true,
        )
        .unwrap_err();

        match err {
            Error::DocumentationIncomplete { parameter, method, .. } => {
                assert_eq!(parameter.as_deref(), Some("id"));
                assert_eq!(method, "find");
            }
            other => panic!("Expected DocumentationIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_accepts_override_name_and_objects() {
        let params = classify(
            r#"impl TestController {
                /// Search.
                /// @param q the query
                pub fn search(&self, #[request_param("q")] keyword: String, filter: Order) {}
            }"#,
            true,
        )
        .unwrap()
        .unwrap();

        assert_eq!(params.query[0].field, "q");
        assert_eq!(params.query[0].desc, "the query");
    }

    #[test]
    fn test_project_payload_body_is_documented() {
        let params = classify(
            r#"
            pub struct Payload { pub title: String }
            impl TestController {
                pub fn create(&self, #[request_body] body: Payload, request: HttpRequest) {}
            }"#,
            false,
        )
        .unwrap()
        .unwrap();

        assert!(params.query.is_empty());
        assert_eq!(rows(&params.body), vec![("title", "string", true, 0)]);
    }

    #[test]
    fn test_response_params() {
        let (resolver, _) = setup("");
        let expander = FieldExpander::new(&resolver);
        let classifier = ParamClassifier::new(&resolver, &expander, false);
        let descriptor = |code: &str| {
            let ty: syn::Type = syn::parse_str(code).unwrap();
            TypeDescriptor::from_syn(&ty)
        };

        let fields = classifier
            .response_params(Some(&descriptor("Result<Json<Vec<Item>>, ApiError>")))
            .unwrap();
        assert_eq!(rows(&fields), vec![("sku", "string", true, 0), ("quantity", "integer", true, 0)]);

        let page = classifier.response_params(Some(&descriptor("Json<Page<Item>>"))).unwrap();
        assert_eq!(page[0].field, "rows");
        assert_eq!(page.len(), 4);

        assert!(classifier.response_params(None).is_none());
        assert!(classifier.response_params(Some(&descriptor("String"))).is_none());
        assert!(classifier.response_params(Some(&descriptor("Vec<u32>"))).is_none());
        assert!(classifier.response_params(Some(&descriptor("impl Responder"))).is_none());
        assert!(classifier.response_params(Some(&descriptor("ModelAndView"))).is_none());
    }
}
