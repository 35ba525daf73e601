//! Type classification for parameter and field types.
//!
//! Every declared type falls into exactly one [`TypeShape`]. The order of the
//! checks in [`TypeClassifier::classify`] matters: types declared in the project
//! are classified first, so a project `Payload` or `Date` is never mistaken for
//! a framework or library type. Framework-injected types are rejected next,
//! file uploads are recognized before collections (a `Vec<MultipartFile>` is a
//! file upload), and primitives take priority over objects.

use crate::extractor::TypeDescriptor;
use crate::type_resolver::TypeResolver;

/// The documentation-relevant shape of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Numbers, booleans, strings, dates and similar scalars
    Primitive,
    /// `[T]`, `[T; N]`
    Array,
    /// `Vec<T>`, `HashSet<T>`, ...
    Collection,
    /// `HashMap<K, V>`, `BTreeMap<K, V>`, ...
    Map,
    /// An enum declared in the project
    Enum,
    /// Multipart file uploads
    FileUpload,
    /// Types injected by the web framework, never part of the API
    FrameworkIgnored,
    /// Anything else, including types the resolver does not know
    Object,
}

/// Framework-injected types, matched by simple name.
pub const FRAMEWORK_IGNORED_TYPES: &[&str] = &[
    "HttpRequest",
    "HttpResponse",
    "HttpSession",
    "ServletRequest",
    "ServletResponse",
    "ModelAndView",
    "ModelMap",
    "BindingResult",
    "RedirectAttributes",
    "SessionStatus",
    "UriComponentsBuilder",
    "HeaderMap",
    "ConnectInfo",
];

/// Framework-injected types whose simple names are too common to match alone.
const FRAMEWORK_IGNORED_PATHS: &[&str] = &[
    "web::Data",
    "web::Payload",
    "extract::State",
    "extract::Extension",
];

/// Multipart upload types, matched anywhere in the generic name.
pub const FILE_UPLOAD_TYPES: &[&str] = &["MultipartFile", "Multipart", "TempFile", "FilePart", "UploadedFile"];

const COLLECTION_TYPES: &[&str] = &[
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashSet",
    "BTreeSet",
    "IndexSet",
    "BinaryHeap",
];

const MAP_TYPES: &[&str] = &["HashMap", "BTreeMap", "IndexMap", "Map"];

/// Documentation label of a primitive type, `None` if the type is not primitive
pub fn primitive_label(simple_name: &str) -> Option<&'static str> {
    let label = match simple_name {
        "String" | "str" | "char" | "NaiveDate" | "NaiveDateTime" | "NaiveTime" | "DateTime"
        | "OffsetDateTime" | "PrimitiveDateTime" | "Date" | "Time" | "SystemTime" | "Uuid" => "string",
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128"
        | "usize" => "integer",
        "f32" | "f64" | "Decimal" | "BigDecimal" => "number",
        "bool" => "boolean",
        _ => return None,
    };
    Some(label)
}

/// `array of <element>`
pub fn array_label(element_label: &str) -> String {
    format!("array of {}", element_label)
}

/// Classifies types, consulting the resolver to recognize enums.
pub struct TypeClassifier<'a> {
    resolver: &'a TypeResolver,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(resolver: &'a TypeResolver) -> Self {
        Self { resolver }
    }

    /// Classify a declared type; `Option`, `Box`, `Rc`, `Arc` and `Cow` are looked through.
    pub fn classify(&self, ty: &TypeDescriptor) -> TypeShape {
        let declared = ty.unwrap_transparent();
        if self.resolver.resolve_descriptor(declared).is_some() {
            return if self.resolver.is_enum(declared) {
                TypeShape::Enum
            } else {
                TypeShape::Object
            };
        }
        if is_framework_ignored(ty) {
            return TypeShape::FrameworkIgnored;
        }
        if is_file_upload(ty) {
            return TypeShape::FileUpload;
        }

        let ty = declared;
        if primitive_label(&ty.simple_name).is_some() {
            TypeShape::Primitive
        } else if ty.is_array() {
            TypeShape::Array
        } else if COLLECTION_TYPES.contains(&ty.simple_name.as_str()) {
            TypeShape::Collection
        } else if MAP_TYPES.contains(&ty.simple_name.as_str()) {
            TypeShape::Map
        } else {
            TypeShape::Object
        }
    }

    /// Label of a type documented without expansion
    pub fn raw_label(&self, ty: &TypeDescriptor) -> String {
        match self.classify(ty) {
            TypeShape::Primitive => self.primitive_label(ty).to_string(),
            TypeShape::Array | TypeShape::Collection => "array".to_string(),
            TypeShape::Map => "map".to_string(),
            TypeShape::FileUpload => "file".to_string(),
            TypeShape::Enum => "string".to_string(),
            TypeShape::Object | TypeShape::FrameworkIgnored => "object".to_string(),
        }
    }

    /// Label of a primitive type, `object` for anything else
    pub fn primitive_label(&self, ty: &TypeDescriptor) -> &'static str {
        match self.classify(ty) {
            TypeShape::Primitive => primitive_label(&ty.unwrap_transparent().simple_name).unwrap_or("object"),
            _ => "object",
        }
    }
}

/// Whether the type is injected by the framework
pub fn is_framework_ignored(ty: &TypeDescriptor) -> bool {
    let ty = ty.unwrap_transparent();
    FRAMEWORK_IGNORED_TYPES.contains(&ty.simple_name.as_str())
        || FRAMEWORK_IGNORED_PATHS
            .iter()
            .any(|path| ty.qualified_name == *path || ty.qualified_name.ends_with(&format!("::{}", path)))
}

/// Whether a file upload type appears anywhere in the type
pub fn is_file_upload(ty: &TypeDescriptor) -> bool {
    ty.generic_name
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|ident| FILE_UPLOAD_TYPES.contains(&ident))
}

/// A map written without type arguments
pub fn is_builtin_map(ty: &TypeDescriptor) -> bool {
    let ty = ty.unwrap_transparent();
    MAP_TYPES.contains(&ty.simple_name.as_str()) && ty.type_args.is_empty()
}

/// Value type of a map (the key is not documented)
pub fn map_value_type(ty: &TypeDescriptor) -> Option<&TypeDescriptor> {
    ty.unwrap_transparent().type_args.get(1)
}
