//! Core types for the enriched RAML document tree.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ordered_map::OrderedMap;

/// Key under which RAML parsers place the `(errors)` annotation.
pub const ERROR_ANNOTATION_KEY: &str = "(errors)";

/// HTTP verbs recognised as resource methods.
pub const HTTP_METHODS: &[&str] = &[
    "get", "post", "put", "patch", "delete", "head", "options", "trace", "connect",
];

/// URI parameters visible to a resource: every ancestor's own, then its own.
///
/// A resource and each of its methods hold the same handle; compare with
/// [`Arc::ptr_eq`] to check the sharing.
pub type SharedParameters = Arc<Vec<UriParameter>>;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Root of a RAML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// May contain a `{version}` placeholder until enriched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,

    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    #[serde(default)]
    pub resources: Vec<Resource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documentation: Vec<DocSection>,

    /// Schema groups: each entry maps schema names to raw JSON text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<OrderedMap<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_schemas: Option<Map<String, Value>>,

    #[serde(
        rename = "(errors)",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_annotation: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,

    /// Everything else the parser produced.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node of the resource tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub relative_uri: String,

    /// Concatenated `relativeUri` of every ancestor.
    #[serde(default)]
    pub parent_url: String,

    #[serde(default)]
    pub unique_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_parameters: Option<OrderedMap<UriParameter>>,

    #[serde(default)]
    pub all_uri_parameters: SharedParameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<OrderedMap<Method>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    pub fn new(relative_uri: impl Into<String>) -> Self {
        Self {
            relative_uri: relative_uri.into(),
            ..Self::default()
        }
    }
}

/// An HTTP method declared on a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Same handle as the owning resource's list.
    #[serde(default)]
    pub all_uri_parameters: SharedParameters,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Descriptor of a URI template parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UriParameter {
    #[serde(default)]
    pub display_name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UriParameter {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }
}

/// A top-level documentation chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSection {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default)]
    pub unique_id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// RAML allows `version: 1` as well as `version: v1`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number for version, got {}",
            json_type_name(&other)
        ))),
    }
}
