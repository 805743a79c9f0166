//! State shared by every operation of one compilation

use crate::builtin::BuiltinCatalog;
use crate::connection::ConnectionBuilder;
use crate::registry::{RegistryKind, TypeRegistry};
use indexmap::IndexMap;
use swagger_graphql_common::{ApiDocument, SchemaArena, SecurityRequirement};

/// Options controlling a compilation
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Prepended to every generated type name and root field name
    pub name_prefix: String,
}

impl CompileOptions {
    pub fn with_name_prefix(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
        }
    }
}

/// Registries, schema storage and document-wide defaults
///
/// Owned by a single compilation and threaded through it explicitly. The
/// schema arena grows while compiling: Connection, Edge and empty-response
/// shapes are allocated next to the document's own schemas.
#[derive(Debug)]
pub struct CompilerContext {
    pub schemas: SchemaArena,
    pub builtins: BuiltinCatalog,
    pub inputs: TypeRegistry,
    pub outputs: TypeRegistry,
    pub connections: ConnectionBuilder,
    pub name_prefix: String,
    pub security: Option<Vec<SecurityRequirement>>,
    pub security_definitions: IndexMap<String, serde_json::Value>,
}

impl CompilerContext {
    /// Take ownership of the document's schemas and register its definitions
    ///
    /// Every definition is registered in both directions so its name is
    /// reserved; bodies are only built when something references them.
    pub fn new(document: ApiDocument, options: &CompileOptions) -> Self {
        let mut inputs = TypeRegistry::new(RegistryKind::Input, options.name_prefix.clone());
        let mut outputs = TypeRegistry::new(RegistryKind::Output, options.name_prefix.clone());

        for (name, &node) in &document.definitions {
            inputs.add_definition(name, node);
            outputs.add_definition(name, node);
        }

        Self {
            schemas: document.schemas,
            builtins: BuiltinCatalog::new(),
            inputs,
            outputs,
            connections: ConnectionBuilder::new(),
            name_prefix: options.name_prefix.clone(),
            security: document.security,
            security_definitions: document.security_definitions,
        }
    }
}
