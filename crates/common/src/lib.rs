//! Common types and utilities for the Swagger GraphQL compiler
//!
//! This crate contains shared data structures, error types, and utilities
//! used across the parser, compiler, generator, runtime and CLI components.

mod document;
mod graphql;
mod resolver;
mod schema;

pub use document::{ApiDocument, Operation, Parameter, SecurityRequirement};
pub use graphql::{
    ArgumentDefinition, BuiltinType, CompiledSchema, Field, FieldDefinition, TypeDefinition,
    TypeKind, TypeRef,
};
pub use resolver::{
    BodyMapping, BodyReader, BodyTemplate, FieldMapping, ObjectMapping, ParamBinding,
    RequestTemplate, ResolverManifest, ResolverPlan, ResponseShape, SecurityConfig,
};
pub use schema::{SchemaArena, SchemaId, SchemaNode, MAX_SCHEMA_DEPTH};

use thiserror::Error;

/// Errors that can occur while loading or compiling a document
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("Unsupported parameter location '{location}' for parameter '{parameter}' in {operation}")]
    UnsupportedParameterLocation {
        location: String,
        parameter: String,
        operation: String,
    },

    #[error("Invalid or duplicate operation id '{id}' at {method} {path}")]
    InvalidOperationId {
        id: String,
        method: String,
        path: String,
    },

    #[error("Operation '{operation}' designates root property '{property}' which its success response does not declare")]
    MissingRootProperty { operation: String, property: String },

    #[error("Schema nesting exceeds the maximum depth of {0}")]
    SchemaTooDeep(usize),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
