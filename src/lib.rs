//! Generate REST API documentation from annotated Rust controller sources.
//!
//! Controllers are inherent `impl` blocks tagged `#[rest_controller]` or
//! `#[controller]`. Their public methods carrying a mapping attribute
//! (`#[get_mapping("/path")]`, `#[request_mapping(value = "/x", method = POST)]`,
//! `#[post("/x")]`, ...) are documented: the route, the request headers, every
//! input parameter flattened into a field list, and the response payload.
//! Descriptions come from `///` comments, with `@param`, `@author`, `@apiNote`
//! and `@ignore` tags.
//!
//! # Architecture
//!
//! 1. [`scanner`] - finds `.rs` files under the project root
//! 2. [`parser`] - parses them with `syn` and derives module paths
//! 3. [`extractor`] - builds the declaration model (impl blocks, methods, tags)
//! 4. [`type_resolver`] - indexes structs and enums by name
//! 5. [`type_classifier`], [`annotation`] - pure classification helpers
//! 6. [`schema_expander`] - flattens object types into nested fields
//! 7. [`param_classifier`] - binds parameters to the query or the body
//! 8. [`route`], [`headers`] - resolve URLs and request headers
//! 9. [`doc_builder`] - enumerates controllers and methods into [`doc_builder::ApiDoc`]s
//! 10. [`serializer`] - writes YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use apidoc_from_source::{
//!     config::DocConfig,
//!     doc_builder::DocBuilder,
//!     extractor::{controller::ControllerExtractor, DeclarationExtractor},
//!     parser::AstParser,
//!     scanner::FileScanner,
//!     serializer::serialize_yaml,
//!     type_resolver::TypeResolver,
//! };
//! use std::path::PathBuf;
//!
//! let scanner = FileScanner::new(PathBuf::from("./my-service"));
//! let scan_result = scanner.scan().unwrap();
//!
//! let parsed_files: Vec<_> = AstParser::parse_files(scanner.root_path(), &scan_result.rust_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! let declarations = ControllerExtractor.extract_declarations(&parsed_files);
//! let resolver = TypeResolver::new(&parsed_files);
//!
//! let config = DocConfig::default();
//! let docs = DocBuilder::new(&config, &resolver).unwrap().build(&declarations).unwrap();
//! println!("{}", serialize_yaml(&docs).unwrap());
//! ```

pub mod annotation;
pub mod cli;
pub mod config;
pub mod doc_builder;
pub mod error;
pub mod extractor;
pub mod headers;
pub mod param_classifier;
pub mod parser;
pub mod route;
pub mod scanner;
pub mod schema_expander;
pub mod serializer;
pub mod type_classifier;
pub mod type_resolver;
