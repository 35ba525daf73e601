//! Reads documentation-relevant properties from a parameter's metadata tags.
//!
//! All functions are pure: they only look at the tags passed in.

use crate::extractor::MetadataTag;

/// Tag binding a parameter to the whole request body.
pub const REQUEST_BODY: &str = "RequestBody";
/// Tag requesting validation; binds the body when it is a parameter's only tag.
pub const VALID: &str = "Valid";
/// Tag binding a parameter to a query value.
pub const REQUEST_PARAM: &str = "RequestParam";
/// Tag binding a parameter to a path segment.
pub const PATH_VARIABLE: &str = "PathVariable";
/// Tag binding a parameter to a request header.
pub const REQUEST_HEADER: &str = "RequestHeader";

pub const REQUIRED_PROP: &str = "required";
pub const VALUE_PROP: &str = "value";
pub const NAME_PROP: &str = "name";

/// Bean-validation style tags.
pub const VALIDATOR_TAGS: &[&str] = &[
    "NotNull",
    "NotEmpty",
    "NotBlank",
    "Null",
    "Size",
    "Length",
    "Min",
    "Max",
    "DecimalMin",
    "DecimalMax",
    "Range",
    "Email",
    "Pattern",
    "Positive",
    "PositiveOrZero",
    "Negative",
    "NegativeOrZero",
    "Past",
    "PastOrPresent",
    "Future",
    "FutureOrPresent",
    "Digits",
    "AssertTrue",
    "AssertFalse",
    "Validated",
];

/// Parses a `required` property value; anything but `false` counts as required
fn parse_required(value: &str) -> bool {
    !value.trim().trim_matches('"').eq_ignore_ascii_case("false")
}

/// Required flag of a single tag, `true` when the tag has no `required` property
pub fn tag_required(tag: &MetadataTag) -> bool {
    tag.property(REQUIRED_PROP).map(parse_required).unwrap_or(true)
}

/// Required flag of a parameter: the first tag carrying `required` decides, default `true`
pub fn read_required(tags: &[MetadataTag]) -> bool {
    tags.iter()
        .find_map(|tag| tag.property(REQUIRED_PROP))
        .map(parse_required)
        .unwrap_or(true)
}

/// Name override of a binding tag: `value` wins over `name`, empty strings are ignored
pub fn read_name_override(tag: &MetadataTag) -> Option<String> {
    [VALUE_PROP, NAME_PROP]
        .iter()
        .filter_map(|prop| tag.property(prop))
        .map(|value| value.trim().trim_matches('"'))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Whether any tag is a validator tag
pub fn read_validator_presence(tags: &[MetadataTag]) -> bool {
    tags.iter().any(is_validator)
}

pub fn is_validator(tag: &MetadataTag) -> bool {
    tag.is_any(VALIDATOR_TAGS)
}

/// Whether `tag` binds its parameter to the whole body, given all tags of the parameter
pub fn is_body_binding(tag: &MetadataTag, all_tags: &[MetadataTag]) -> bool {
    tag.is(REQUEST_BODY) || (tag.is(VALID) && all_tags.len() == 1)
}

/// Whether `tag` binds its parameter to a query value or a path segment
pub fn is_query_or_path_binding(tag: &MetadataTag) -> bool {
    tag.is_any(&[REQUEST_PARAM, PATH_VARIABLE])
}
