//! Document compiler
//!
//! Routes every operation to the query root (GET) or the mutation root
//! (anything else) and assembles the final [`CompiledSchema`].

use crate::context::{CompileOptions, CompilerContext};
use crate::operation::{compile_operation, field_name};
use indexmap::IndexMap;
use swagger_graphql_common::{ApiDocument, CompileError, CompiledSchema, Field, Operation, Result};
use tracing::{debug, info};

/// Which root an operation's field is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Query,
    Mutation,
}

impl RootKind {
    pub fn for_method(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") {
            RootKind::Query
        } else {
            RootKind::Mutation
        }
    }
}

pub struct DocumentCompiler {
    ctx: CompilerContext,
    title: String,
    query: IndexMap<String, Field>,
    mutation: IndexMap<String, Field>,
}

impl DocumentCompiler {
    pub fn new(document: ApiDocument, options: &CompileOptions) -> Self {
        let title = document.title.clone();
        Self {
            ctx: CompilerContext::new(document, options),
            title,
            query: IndexMap::new(),
            mutation: IndexMap::new(),
        }
    }

    /// Compile one operation and attach it to its root
    ///
    /// Fails when the operation has no id or when its field name is already
    /// taken on the same root.
    pub fn add_operation(&mut self, operation: &Operation) -> Result<()> {
        let id = operation
            .operation_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid_operation_id(operation, ""))?;

        let root = RootKind::for_method(&operation.method);
        let name = field_name(&self.ctx.name_prefix, id);
        let fields = match root {
            RootKind::Query => &self.query,
            RootKind::Mutation => &self.mutation,
        };
        if fields.contains_key(&name) {
            return Err(invalid_operation_id(operation, id));
        }

        let field = compile_operation(&mut self.ctx, operation)?;
        debug!(field = %field.name, ?root, "attached root field");

        match root {
            RootKind::Query => self.query.insert(name, field),
            RootKind::Mutation => self.mutation.insert(name, field),
        };
        Ok(())
    }

    /// Input types first, then output types, each dependencies first
    pub fn finish(self) -> CompiledSchema {
        let mut types = self.ctx.inputs.definitions();
        types.extend(self.ctx.outputs.definitions());

        info!(
            types = types.len(),
            queries = self.query.len(),
            mutations = self.mutation.len(),
            "compiled schema"
        );

        CompiledSchema {
            title: self.title,
            builtins: self.ctx.builtins.used(),
            types,
            query: self.query.into_values().collect(),
            mutation: self.mutation.into_values().collect(),
        }
    }
}

fn invalid_operation_id(operation: &Operation, id: &str) -> CompileError {
    CompileError::InvalidOperationId {
        id: id.to_string(),
        method: operation.method.clone(),
        path: operation.path.clone(),
    }
}

/// Compile a whole document
pub fn compile_document(mut document: ApiDocument, options: &CompileOptions) -> Result<CompiledSchema> {
    let operations = std::mem::take(&mut document.operations);
    let mut compiler = DocumentCompiler::new(document, options);

    for operation in &operations {
        compiler.add_operation(operation)?;
    }

    Ok(compiler.finish())
}
