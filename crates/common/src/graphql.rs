//! GraphQL type IR produced by the compiler

use crate::resolver::ResolverPlan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a GraphQL type from a field or argument position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(of: TypeRef) -> Self {
        TypeRef::List(Box::new(of))
    }

    /// Wrap in NonNull unless already non-null
    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeRef::List(_) => true,
            TypeRef::NonNull(inner) => inner.is_list(),
            TypeRef::Named(_) => false,
        }
    }

    /// Name of the innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// GraphQL built-ins a compiled schema can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinType {
    Boolean,
    Int,
    Float,
    String,
    #[serde(rename = "ID")]
    Id,
    List,
    NonNull,
    Object,
    InputObject,
    Scalar,
    Schema,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 11] = [
        BuiltinType::Boolean,
        BuiltinType::Int,
        BuiltinType::Float,
        BuiltinType::String,
        BuiltinType::Id,
        BuiltinType::List,
        BuiltinType::NonNull,
        BuiltinType::Object,
        BuiltinType::InputObject,
        BuiltinType::Scalar,
        BuiltinType::Schema,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Boolean => "Boolean",
            BuiltinType::Int => "Int",
            BuiltinType::Float => "Float",
            BuiltinType::String => "String",
            BuiltinType::Id => "ID",
            BuiltinType::List => "List",
            BuiltinType::NonNull => "NonNull",
            BuiltinType::Object => "Object",
            BuiltinType::InputObject => "InputObject",
            BuiltinType::Scalar => "Scalar",
            BuiltinType::Schema => "Schema",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Built-in scalars can be referenced as field types
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            BuiltinType::Boolean
                | BuiltinType::Int
                | BuiltinType::Float
                | BuiltinType::String
                | BuiltinType::Id
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Object,
    InputObject,
    /// Opaque scalar that serializes its value unchanged
    Scalar,
}

/// A named type emitted into the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl TypeDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Field of an object or input object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub description: Option<String>,
    /// Original property key read by the field when `name` was legalized
    #[serde(default)]
    pub accessor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub description: Option<String>,
}

/// Root field compiled from one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub arguments: Vec<ArgumentDefinition>,
    pub ty: TypeRef,
    pub resolver: ResolverPlan,
}

impl Field {
    pub fn argument(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/// Result of compiling a whole document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledSchema {
    pub title: String,
    /// Built-ins referenced during compilation, in first-use order
    pub builtins: Vec<BuiltinType>,
    /// Type definitions in emission order (dependencies first)
    pub types: Vec<TypeDefinition>,
    pub query: Vec<Field>,
    pub mutation: Vec<Field>,
}

impl CompiledSchema {
    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|ty| ty.name == name)
    }

    pub fn query_field(&self, name: &str) -> Option<&Field> {
        self.query.iter().find(|field| field.name == name)
    }

    pub fn mutation_field(&self, name: &str) -> Option<&Field> {
        self.mutation.iter().find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::list(TypeRef::named("Pet").non_null()).non_null();
        assert_eq!(ty.to_string(), "[Pet!]!");
        assert_eq!(ty.base_name(), "Pet");
        assert!(ty.is_list());
    }

    #[test]
    fn test_non_null_is_idempotent() {
        let ty = TypeRef::named("Int").non_null().non_null();
        assert_eq!(ty.to_string(), "Int!");
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(BuiltinType::from_name("ID"), Some(BuiltinType::Id));
        assert_eq!(BuiltinType::from_name("SomeRandomProp"), None);
        assert!(BuiltinType::Float.is_scalar());
        assert!(!BuiltinType::List.is_scalar());
    }
}
