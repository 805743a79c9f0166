//! Dereferenced API document model
//!
//! The parser produces an [`ApiDocument`] in which every schema is an id into
//! the document's [`SchemaArena`] and every `$ref` has been resolved.

use crate::schema::{SchemaArena, SchemaId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One security requirement alternative: scheme name -> scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// A fully dereferenced Swagger 2.0 document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiDocument {
    /// API title (info.title)
    pub title: String,

    /// API version (info.version)
    pub version: String,

    /// All schema nodes of the document
    pub schemas: SchemaArena,

    /// Named definitions in document order
    pub definitions: IndexMap<String, SchemaId>,

    /// Operations in path/method document order
    pub operations: Vec<Operation>,

    /// Document-level default security requirement
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,

    /// Security scheme definitions, kept verbatim
    #[serde(default)]
    pub security_definitions: IndexMap<String, serde_json::Value>,
}

/// One HTTP method + path entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation_id: Option<String>,

    /// Upper-case HTTP method
    pub method: String,

    pub path: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Status code -> response schema (`None` when the response has no body)
    #[serde(default)]
    pub responses: IndexMap<String, Option<SchemaId>>,

    /// Operation-level security, overriding the document default when present
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,

    /// Value of `x-root-property`
    #[serde(default)]
    pub root_property: Option<String>,
}

impl Operation {
    /// Human readable location used in error messages
    pub fn describe(&self) -> String {
        format!(
            "{} {} ({})",
            self.method,
            self.path,
            self.operation_id.as_deref().unwrap_or("<no operation id>")
        )
    }
}

/// Operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Location: path, query, header, formData, body
    pub location: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: Option<String>,

    /// Body schema, or the parameter's own inline type for other locations
    pub schema: SchemaId,
}
