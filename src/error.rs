use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library.
///
/// `DocumentationIncomplete` and `MultipleBodyBindings` are fatal: they abort the
/// whole documentation run and carry the method and its owning declaration.
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    ConfigError(String),
    /// A method or a primitive parameter has no doc comment while strict mode is on
    DocumentationIncomplete {
        declaration: String,
        method: String,
        parameter: Option<String>,
    },
    /// More than one parameter of a method is bound to the whole request body
    MultipleBodyBindings { declaration: String, method: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::ConfigError(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::DocumentationIncomplete {
                declaration,
                method,
                parameter: Some(param),
            } => write!(
                f,
                "Unable to find doc comment `@param` for parameter \"{}\" in method {} from {}",
                param, method, declaration
            ),
            Error::DocumentationIncomplete {
                declaration,
                method,
                parameter: None,
            } => write!(
                f,
                "Unable to find comment for method {} in {}",
                method, declaration
            ),
            Error::MultipleBodyBindings {
                declaration,
                method,
            } => write!(
                f,
                "Multiple request body bindings for method {} in {}, only one parameter can be bound to the request body",
                method, declaration
            ),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::ConfigError(format!("invalid package filter pattern: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<unknown>"),
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Whether the error aborts a documentation run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DocumentationIncomplete { .. } | Error::MultipleBodyBindings { .. }
        )
    }
}
