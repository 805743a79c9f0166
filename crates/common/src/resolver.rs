//! Resolver plans
//!
//! A resolver plan is the data form of a generated resolver: everything the
//! runtime needs to turn one GraphQL field invocation into exactly one
//! outbound HTTP call and back into a GraphQL value.

use crate::document::SecurityRequirement;
use crate::graphql::{BuiltinType, CompiledSchema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverPlan {
    /// Original operation id, passed to the fetch capability as `endpointName`
    pub operation_id: String,
    pub request: RequestTemplate,
    /// Frozen security requirement handed to the auth hook before the call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityConfig>,
    /// Legalized body keys to restore before dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_mapping: Option<BodyMapping>,
    pub response: ResponseShape,
    pub body_reader: BodyReader,
}

/// How the outbound request is assembled from field arguments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTemplate {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub query: Vec<ParamBinding>,
    #[serde(default)]
    pub path_params: Vec<ParamBinding>,
    #[serde(default)]
    pub headers: Vec<ParamBinding>,
    #[serde(default)]
    pub body: Option<BodyTemplate>,
    /// Merge the decoded pagination window into the query string
    #[serde(default)]
    pub paginate: bool,
}

/// Wire name of a parameter and the argument carrying its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamBinding {
    pub name: String,
    pub argument: String,
}

impl ParamBinding {
    pub fn new(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: argument.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum BodyTemplate {
    /// The whole body is the value of one argument
    Argument(String),
    /// The body is an object assembled from form parameters
    Form(Vec<ParamBinding>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyReader {
    Json,
    Text,
}

/// Shape of the value returned to GraphQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResponseShape {
    /// `{rawResponseBody, rawInputOptions}` envelope for operations without a success schema
    Empty,
    /// Array result wrapped into a Connection
    Connection {
        #[serde(default, rename = "rootProperty")]
        root_property: Option<String>,
    },
    /// Only the designated nested property of the body
    RootProperty { property: String },
    /// Parsed body verbatim
    Plain,
}

/// Key restoration table for a body argument
///
/// Each object shape reachable from the body appears once in `objects`, the
/// body itself first. Fields point at the shape of their value, so recursive
/// and array-nested bodies are restored to any depth by walking the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMapping {
    /// Argument carrying the body
    pub argument: String,
    pub objects: Vec<ObjectMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectMapping {
    pub fields: Vec<FieldMapping>,
}

/// One property of an object shape that is renamed or holds a mapped object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Legal GraphQL name used in the arguments
    pub name: String,
    /// Key expected by the HTTP API
    pub original_name: String,
    /// Index into [`BodyMapping::objects`] of the value's shape, looking through lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub security: Vec<SecurityRequirement>,
    /// Only the security scheme definitions referenced by `security`
    pub definitions: IndexMap<String, serde_json::Value>,
}

/// Serializable bundle of everything the runtime needs for a compiled schema
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverManifest {
    pub title: String,
    pub builtins: Vec<BuiltinType>,
    pub query: IndexMap<String, ResolverPlan>,
    pub mutation: IndexMap<String, ResolverPlan>,
    /// Type name -> legal field name -> original property key
    pub accessors: IndexMap<String, IndexMap<String, String>>,
}

impl ResolverManifest {
    pub fn from_schema(schema: &CompiledSchema) -> Self {
        let collect = |fields: &[crate::graphql::Field]| {
            fields
                .iter()
                .map(|field| (field.name.clone(), field.resolver.clone()))
                .collect::<IndexMap<_, _>>()
        };

        let mut accessors = IndexMap::new();
        for ty in &schema.types {
            let renamed: IndexMap<String, String> = ty
                .fields
                .iter()
                .filter_map(|field| {
                    field
                        .accessor
                        .as_ref()
                        .map(|original| (field.name.clone(), original.clone()))
                })
                .collect();
            if !renamed.is_empty() {
                accessors.insert(ty.name.clone(), renamed);
            }
        }

        Self {
            title: schema.title.clone(),
            builtins: schema.builtins.clone(),
            query: collect(&schema.query),
            mutation: collect(&schema.mutation),
            accessors,
        }
    }

    pub fn plan(&self, field: &str) -> Option<&ResolverPlan> {
        self.query.get(field).or_else(|| self.mutation.get(field))
    }
}
