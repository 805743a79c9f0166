//! Built-in GraphQL types referenced by a compilation
//!
//! Code generation asks the catalog for every built-in it uses; the catalog
//! remembers them in first-use order so they can be declared once at the end.

use indexmap::IndexSet;
use swagger_graphql_common::{BuiltinType, SchemaNode, TypeRef};

#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    used: IndexSet<BuiltinType>,
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinCatalog {
    /// Every compiled schema needs object types and the schema itself
    pub fn new() -> Self {
        let mut used = IndexSet::new();
        used.insert(BuiltinType::Object);
        used.insert(BuiltinType::Schema);
        Self { used }
    }

    /// Mark a built-in as used
    pub fn record(&mut self, builtin: BuiltinType) {
        self.used.insert(builtin);
    }

    /// Reference a built-in scalar
    pub fn scalar(&mut self, builtin: BuiltinType) -> TypeRef {
        debug_assert!(builtin.is_scalar());
        self.record(builtin);
        TypeRef::named(builtin.name())
    }

    /// Reference a built-in scalar by its GraphQL name; unknown names yield `None`
    pub fn lookup(&mut self, name: &str) -> Option<TypeRef> {
        let builtin = BuiltinType::from_name(name).filter(|b| b.is_scalar())?;
        Some(self.scalar(builtin))
    }

    /// Primitive Swagger types map onto built-in scalars
    ///
    /// `string` with `format: uuid` becomes `ID`. Anything else is composite
    /// and yields `None`.
    pub fn resolve_schema(&mut self, schema: &SchemaNode) -> Option<TypeRef> {
        let builtin = match schema.schema_type.as_deref()? {
            "boolean" => BuiltinType::Boolean,
            "string" if schema.format.as_deref() == Some("uuid") => BuiltinType::Id,
            "string" => BuiltinType::String,
            "number" => BuiltinType::Float,
            "integer" => BuiltinType::Int,
            _ => return None,
        };
        Some(self.scalar(builtin))
    }

    pub fn used(&self) -> Vec<BuiltinType> {
        self.used.iter().copied().collect()
    }
}
