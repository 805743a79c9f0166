//! Swagger 2.0 type definitions
//!
//! Simplified representation focusing on what the GraphQL compiler consumes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use swagger_graphql_common::SecurityRequirement;

/// HTTP methods a path item can declare, in the order Swagger lists them
pub const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// Swagger document root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwaggerSpec {
    /// Swagger version (e.g., "2.0")
    #[serde(default)]
    pub swagger: Option<String>,

    /// API metadata
    pub info: Info,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Reusable schemas
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,

    /// Reusable parameters
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,

    /// Reusable responses
    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    #[serde(rename = "securityDefinitions")]
    #[serde(default)]
    pub security_definitions: IndexMap<String, serde_json::Value>,

    /// Default security requirement
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Path item: shared parameters plus one entry per HTTP method
///
/// Method entries are kept as raw values so that declaration order survives
/// and vendor extensions on the path item do not break deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(flatten)]
    pub entries: IndexMap<String, serde_json::Value>,
}

impl PathItem {
    /// Declared operations in document order, keyed by lower-case method
    pub fn operations(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.entries
            .iter()
            .filter(|(method, _)| HTTP_METHODS.contains(&method.as_str()))
            .map(|(method, value)| (method.as_str(), value))
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,

    /// Property of the success body holding the payload
    #[serde(rename = "x-root-property")]
    #[serde(default)]
    pub root_property: Option<String>,
}

/// Parameter definition, or a reference to one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Location: query, header, path, formData, body
    #[serde(rename = "in")]
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Body schema (`in: body` only)
    #[serde(default)]
    pub schema: Option<Schema>,

    /// Inline type for non-body parameters
    #[serde(rename = "type")]
    #[serde(default)]
    pub param_type: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub items: Option<Box<Schema>>,
}

/// Response, or a reference to one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub schema: Option<Schema>,
}

/// `additionalProperties` is either a flag or a schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Flag(bool),
    Schema(Box<Schema>),
}

impl AdditionalProperties {
    pub fn is_allowed(&self) -> bool {
        match self {
            AdditionalProperties::Flag(allowed) => *allowed,
            AdditionalProperties::Schema(_) => true,
        }
    }
}

/// Schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    /// Type: string, number, integer, boolean, array, object, file
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub properties: IndexMap<String, Schema>,

    #[serde(default)]
    pub required: Vec<String>,

    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "additionalProperties")]
    #[serde(default)]
    pub additional_properties: Option<AdditionalProperties>,
}

impl SwaggerSpec {
    /// Name of the definition a `#/definitions/...` reference points to
    pub fn definition_name(ref_path: &str) -> Option<&str> {
        ref_path.strip_prefix("#/definitions/")
    }

    pub fn parameter_name(ref_path: &str) -> Option<&str> {
        ref_path.strip_prefix("#/parameters/")
    }

    pub fn response_name(ref_path: &str) -> Option<&str> {
        ref_path.strip_prefix("#/responses/")
    }
}
