//! Field resolution on output objects
//!
//! Most fields read the property of the same name. Fields whose property key
//! was not a legal GraphQL name read the original key instead.

use indexmap::IndexMap;
use serde_json::Value;
use swagger_graphql_common::{CompiledSchema, ResolverManifest};

#[derive(Debug, Clone, Default)]
pub struct FieldAccessors {
    /// type name -> field name -> original key
    accessors: IndexMap<String, IndexMap<String, String>>,
}

impl FieldAccessors {
    pub fn from_manifest(manifest: &ResolverManifest) -> Self {
        Self {
            accessors: manifest.accessors.clone(),
        }
    }

    pub fn from_schema(schema: &CompiledSchema) -> Self {
        Self::from_manifest(&ResolverManifest::from_schema(schema))
    }

    /// Property key backing `field` on `type_name`
    pub fn key<'a>(&'a self, type_name: &str, field: &'a str) -> &'a str {
        self.accessors
            .get(type_name)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
            .unwrap_or(field)
    }

    /// Value of `field` on `parent`, or `None` when absent
    pub fn resolve<'v>(&self, type_name: &str, field: &str, parent: &'v Value) -> Option<&'v Value> {
        parent.get(self.key(type_name, field))
    }
}
