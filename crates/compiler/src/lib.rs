//! Swagger to GraphQL compiler
//!
//! Compiles a dereferenced [`ApiDocument`] into a [`CompiledSchema`]: GraphQL
//! input and output types, Relay-style Connections for list results, and one
//! root field per operation carrying the resolver plan used to call it.
//!
//! ```no_run
//! use swagger_graphql_compiler::{compile, CompileOptions};
//! # fn run(document: swagger_graphql_common::ApiDocument) -> swagger_graphql_common::Result<()> {
//! let schema = compile(document, &CompileOptions::default())?;
//! println!("{} query fields", schema.query.len());
//! # Ok(())
//! # }
//! ```

pub mod builtin;
pub mod connection;
pub mod context;
pub mod document;
pub mod naming;
pub mod operation;
pub mod registry;

pub use builtin::BuiltinCatalog;
pub use connection::{ConnectionBuilder, CURSOR_ARGUMENTS};
pub use context::{CompileOptions, CompilerContext};
pub use document::{compile_document, DocumentCompiler, RootKind};
pub use naming::{is_valid_name, make_unique_valid_name, normalize_operation_id};
pub use operation::compile_operation;
pub use registry::{NameContext, RegistryKind, TypeRegistry};

use swagger_graphql_common::{ApiDocument, CompiledSchema, Result};

/// Compile `document` with `options`
pub fn compile(document: ApiDocument, options: &CompileOptions) -> Result<CompiledSchema> {
    compile_document(document, options)
}
