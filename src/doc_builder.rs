//! Builds the API documentation model from extracted declarations.
//!
//! Controllers are visited in enumeration order and numbered from 1. Each public,
//! mapped and not `@ignore`d method becomes an [`ApiMethodDoc`], numbered from 1
//! within its controller.

use crate::config::{DocConfig, PackageFilter};
use crate::error::{Error, Result};
use crate::extractor::{Declaration, MethodDecl};
use crate::headers::{declared_headers, merge, HeaderEntry};
use crate::param_classifier::ParamClassifier;
use crate::route::{base_path, build_url, method_mapping, HttpMethod};
use crate::schema_expander::{FieldExpander, ParamEntry, SchemaField};
use crate::type_resolver::TypeResolver;
use log::{debug, info};
use serde::{Deserialize, Serialize};

const IGNORE_TAG: &str = "ignore";
const AUTHOR_TAG: &str = "author";
const API_NOTE_TAG: &str = "apiNote";

/// Documentation of one controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDoc {
    /// Position among documented controllers, starting at 1
    pub order: usize,
    pub name: String,
    pub qualified_name: String,
    pub desc: String,
    /// Documented methods in source order
    pub list: Vec<ApiMethodDoc>,
}

/// Documentation of one request handler method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMethodDoc {
    /// Position within the controller, starting at 1
    pub order: usize,
    /// Stable identifier derived from the controller and method names
    pub method_id: String,
    pub name: String,
    pub desc: String,
    /// `@apiNote` text, or the description
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub http_method: HttpMethod,
    pub url: String,
    pub request_headers: Vec<HeaderEntry>,
    /// `None` for a method without parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_params: Option<Vec<ParamEntry>>,
    pub has_request_body: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_params: Option<Vec<SchemaField>>,
}

/// Enumerates controllers and their methods into [`ApiDoc`]s
pub struct DocBuilder<'a> {
    config: &'a DocConfig,
    resolver: &'a TypeResolver,
    package_filter: Option<PackageFilter>,
}

impl<'a> DocBuilder<'a> {
    /// Create a builder; fails if the configured package filter is invalid
    pub fn new(config: &'a DocConfig, resolver: &'a TypeResolver) -> Result<Self> {
        debug!("Initializing DocBuilder");
        Ok(Self {
            config,
            resolver,
            package_filter: config.package_filter()?,
        })
    }

    /// Document every eligible controller.
    ///
    /// Stops at the first fatal error; no partial result is returned.
    pub fn build(&self, declarations: &[Declaration]) -> Result<Vec<ApiDoc>> {
        let expander = FieldExpander::new(self.resolver);
        let classifier = ParamClassifier::new(self.resolver, &expander, self.config.strict);

        let mut docs = Vec::new();
        for declaration in declarations.iter().filter(|d| self.is_documented(d)) {
            let order = docs.len() + 1;
            docs.push(self.build_declaration(&classifier, declaration, order)?);
        }

        info!("Documented {} controllers", docs.len());
        Ok(docs)
    }

    fn is_documented(&self, declaration: &Declaration) -> bool {
        if !declaration.is_controller() {
            return false;
        }
        match &self.package_filter {
            Some(filter) if !filter.matches(&declaration.qualified_name) => {
                debug!("{} excluded by package filter", declaration.qualified_name);
                false
            }
            _ => true,
        }
    }

    fn build_declaration(
        &self,
        classifier: &ParamClassifier,
        declaration: &Declaration,
        order: usize,
    ) -> Result<ApiDoc> {
        debug!("Documenting controller {}", declaration.qualified_name);
        let base = base_path(&declaration.tags);

        let mut list = Vec::new();
        for method in &declaration.methods {
            if let Some(doc) = self.build_method(classifier, declaration, &base, method, list.len() + 1)? {
                list.push(doc);
            }
        }

        Ok(ApiDoc {
            order,
            name: declaration.name.clone(),
            qualified_name: declaration.qualified_name.clone(),
            desc: declaration
                .doc
                .description()
                .unwrap_or(&declaration.name)
                .to_string(),
            list,
        })
    }

    fn build_method(
        &self,
        classifier: &ParamClassifier,
        declaration: &Declaration,
        base: &str,
        method: &MethodDecl,
        order: usize,
    ) -> Result<Option<ApiMethodDoc>> {
        if !method.is_public() {
            return Ok(None);
        }
        if method.doc.has_tag(IGNORE_TAG) {
            debug!("Skipping @ignore method {}", method.name);
            return Ok(None);
        }
        let Some(mapping) = method_mapping(&method.tags) else {
            debug!("Skipping unmapped method {}", method.name);
            return Ok(None);
        };

        let desc = method.doc.description();
        if self.config.strict && desc.is_none() {
            return Err(Error::DocumentationIncomplete {
                declaration: declaration.qualified_name.clone(),
                method: method.name.clone(),
                parameter: None,
            });
        }
        let desc = desc.unwrap_or_default().to_string();

        let params = classifier.classify_method(&declaration.qualified_name, method)?;
        let has_request_body = params.as_ref().is_some_and(|p| p.has_body());

        let detail = method
            .doc
            .tag(API_NOTE_TAG)
            .filter(|note| !note.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| desc.clone());
        let author = method
            .doc
            .tag(AUTHOR_TAG)
            .filter(|author| self.config.show_author && !author.is_empty())
            .map(str::to_string);

        debug!("Documenting {} {}", mapping.http_method, method.name);
        Ok(Some(ApiMethodDoc {
            order,
            method_id: method_id(&declaration.qualified_name, &method.name),
            name: method.name.clone(),
            desc,
            detail,
            author,
            http_method: mapping.http_method,
            url: build_url(&self.config.server_url, base, &mapping.path),
            request_headers: merge(&self.config.request_headers, &declared_headers(method)),
            request_params: params.map(|p| p.into_ordered()),
            has_request_body,
            response_params: classifier.response_params(method.return_type.as_ref()),
        }))
    }
}

/// `api::orders::OrderController` + `find` → `api_orders_OrderController_find`
fn method_id(qualified_name: &str, method_name: &str) -> String {
    format!("{}_{}", qualified_name.replace("::", "_"), method_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::controller::ControllerExtractor;
    use crate::extractor::DeclarationExtractor;
    use crate::parser::ParsedFile;
    use crate::schema_expander::NO_COMMENTS_FOUND;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const ORDERS: &str = r#"
        /// An order
        pub struct Order {
            /// Order id
            pub id: u64,
            pub items: Vec<Item>,
        }
        pub struct Item {
            pub sku: String,
            pub quantity: u32,
        }

        pub struct OrderController;

        /// Order management
        #[rest_controller]
        #[request_mapping("/orders")]
        impl OrderController {
            /// Find an order.
            /// @param id the order id
            /// @author alice
            #[get_mapping("/{id}")]
            pub fn find(&self, #[path_variable] id: String) -> Json<Order> {
                todo!()
            }

            /// Create an order.
            /// @apiNote Items are validated before saving.
            #[post_mapping]
            pub fn create(&self, #[request_body] body: Order) {}

            fn helper(&self) {}

            /// Internal endpoint.
            /// @ignore
            #[get_mapping("/internal")]
            pub fn internal(&self) {}

            /// Not a route.
            pub fn new() -> Self {
                Self
            }

            /// Health check.
            #[request_mapping(value = "/ping", method = RequestMethod::HEAD)]
            pub fn ping(&self) {}
        }
    "#;

    fn declarations(files: &[(&str, &str)]) -> (Vec<ParsedFile>, Vec<Declaration>) {
        let parsed: Vec<ParsedFile> = files
            .iter()
            .map(|(module, code)| {
                let module_path = module.split("::").map(str::to_string).collect();
                ParsedFile::from_source(PathBuf::from(format!("{}.rs", module)), module_path, code).unwrap()
            })
            .collect();
        let declarations = ControllerExtractor.extract_declarations(&parsed);
        (parsed, declarations)
    }

    fn build(config: &DocConfig, files: &[(&str, &str)]) -> Result<Vec<ApiDoc>> {
        let (parsed, declarations) = declarations(files);
        let resolver = TypeResolver::new(&parsed);
        DocBuilder::new(config, &resolver)?.build(&declarations)
    }

    #[test]
    fn test_build_controller_methods() {
        let docs = build(&DocConfig::default(), &[("api::orders", ORDERS)]).unwrap();

        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc.order, 1);
        assert_eq!(doc.name, "OrderController");
        assert_eq!(doc.qualified_name, "api::orders::OrderController");
        assert_eq!(doc.desc, "Order management");

        let names: Vec<&str> = doc.list.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["find", "create", "ping"]);
        let orders: Vec<usize> = doc.list.iter().map(|m| m.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_method_details() {
        let docs = build(&DocConfig::default(), &[("api::orders", ORDERS)]).unwrap();
        let find = &docs[0].list[0];

        assert_eq!(find.method_id, "api_orders_OrderController_find");
        assert_eq!(find.desc, "Find an order.");
        assert_eq!(find.detail, "Find an order.");
        assert_eq!(find.author.as_deref(), Some("alice"));
        assert_eq!(find.http_method, HttpMethod::Get);
        assert_eq!(find.url, "/orders/{id}");
        assert!(!find.has_request_body);
        assert_eq!(
            find.request_params,
            Some(vec![SchemaField::leaf("id", "string", "the order id", true)])
        );

        let response = find.response_params.as_ref().unwrap();
        assert_eq!(response[0], SchemaField::leaf("id", "integer", "Order id", true));
        assert_eq!(response.len(), 4);

        let create = &docs[0].list[1];
        assert_eq!(create.detail, "Items are validated before saving.");
        assert_eq!(create.http_method, HttpMethod::Post);
        assert_eq!(create.url, "/orders");
        assert!(create.has_request_body);
        assert_eq!(create.response_params, None);

        let ping = &docs[0].list[2];
        assert_eq!(ping.http_method, HttpMethod::Head);
        assert_eq!(ping.request_params, None);
    }

    #[test]
    fn test_request_body_block() {
        let docs = build(&DocConfig::default(), &[("api::orders", ORDERS)]).unwrap();
        let params = docs[0].list[1].request_params.clone().unwrap();

        let rows: Vec<(&str, &str, usize)> = params
            .iter()
            .map(|p| (p.field.as_str(), p.type_label.as_str(), p.depth))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("id", "integer", 0),
                ("items", "array of object", 0),
                ("sku", "string", 1),
                ("quantity", "integer", 1),
            ]
        );
        assert_eq!(params[2].desc, NO_COMMENTS_FOUND);
    }

    #[test]
    fn test_show_author_and_server_url() {
        let config = DocConfig {
            show_author: false,
            server_url: "http://localhost:8080/".to_string(),
            ..DocConfig::default()
        };
        let docs = build(&config, &[("api::orders", ORDERS)]).unwrap();
        let find = &docs[0].list[0];

        assert_eq!(find.author, None);
        assert_eq!(find.url, "http://localhost:8080/orders/{id}");
    }

    #[test]
    fn test_default_headers_merged() {
        let config = DocConfig {
            request_headers: vec![HeaderEntry::new("X-Trace", "trace id")],
            ..DocConfig::default()
        };
        let code = r#"
            #[controller]
            impl Api {
                /// List.
                #[get("/list")]
                #[request_header(name = "X-Token", description = "token")]
                pub fn list(&self) {}
            }
        "#;
        let docs = build(&config, &[("api", code)]).unwrap();
        let names: Vec<&str> = docs[0].list[0]
            .request_headers
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, vec!["X-Trace", "X-Token"]);
    }

    #[test]
    fn test_non_controllers_and_package_filter() {
        let admin = r#"
            #[rest_controller]
            impl AdminController {
                #[get_mapping("/admin")]
                pub fn stats(&self) {}
            }
            impl Helper {
                #[get_mapping("/helper")]
                pub fn run(&self) {}
            }
        "#;
        let files = [("admin", admin), ("api::orders", ORDERS)];

        let all = build(&DocConfig::default(), &files).unwrap();
        let names: Vec<(usize, &str)> = all.iter().map(|d| (d.order, d.name.as_str())).collect();
        assert_eq!(names, vec![(1, "AdminController"), (2, "OrderController")]);

        let config = DocConfig {
            package_filters: Some("api::*".to_string()),
            ..DocConfig::default()
        };
        let filtered = build(&config, &files).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].order, 1);
        assert_eq!(filtered[0].name, "OrderController");
    }

    #[test]
    fn test_strict_mode_requires_method_comment() {
        let code = r#"
            #[rest_controller]
            impl UndocumentedController {
                #[get_mapping("/x")]
                pub fn undocumented(&self) {}
            }
        "#;
        let config = DocConfig {
            strict: true,
            ..DocConfig::default()
        };

        match build(&config, &[("api", code)]).unwrap_err() {
            Error::DocumentationIncomplete {
                declaration,
                method,
                parameter,
            } => {
                assert_eq!(declaration, "api::UndocumentedController");
                assert_eq!(method, "undocumented");
                assert_eq!(parameter, None);
            }
            other => panic!("Expected DocumentationIncomplete, got {:?}", other),
        }

        // The same controller documents fine without strict mode
        assert_eq!(build(&DocConfig::default(), &[("api", code)]).unwrap()[0].list.len(), 1);
    }

    #[test]
    fn test_multiple_body_bindings_abort_the_run() {
        let code = r#"
            #[rest_controller]
            impl BrokenController {
                #[post_mapping("/x")]
                pub fn broken(&self, #[request_body] a: String, #[request_body] b: String) {}
            }
        "#;
        let err = build(&DocConfig::default(), &[("api", code)]).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("api::BrokenController"));
    }

    #[test]
    fn test_invalid_package_filter() {
        let config = DocConfig {
            package_filters: Some(",".to_string()),
            ..DocConfig::default()
        };
        assert!(build(&config, &[("api", ORDERS)]).is_err());
    }
}
