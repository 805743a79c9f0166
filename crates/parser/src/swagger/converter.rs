//! Converts a Swagger spec into a dereferenced ApiDocument
//!
//! Every schema fragment is lowered into the document's `SchemaArena`.
//! Definitions get their ids before any body is lowered, so `$ref` cycles
//! simply point back at an id that already exists.

use super::types::{Parameter, Response, Schema, SwaggerSpec};
use indexmap::IndexMap;
use std::collections::HashMap;
use swagger_graphql_common::{
    ApiDocument, CompileError, Operation, Parameter as DocParameter, Result, SchemaArena,
    SchemaId, SchemaNode, MAX_SCHEMA_DEPTH,
};
use tracing::debug;

/// Convert a Swagger spec to an ApiDocument
pub fn convert_swagger_to_document(spec: &SwaggerSpec) -> Result<ApiDocument> {
    let mut deref = Dereferencer::new(spec);
    deref.lower_definitions()?;

    let mut operations = Vec::new();
    for (path, path_item) in &spec.paths {
        let shared = path_item
            .parameters
            .iter()
            .map(|param| deref.lower_parameter(param))
            .collect::<Result<Vec<_>>>()?;

        for (method, raw) in path_item.operations() {
            let op: super::types::Operation = serde_json::from_value(raw.clone()).map_err(|e| {
                CompileError::Parse(format!(
                    "Invalid {} operation at {}: {}",
                    method.to_uppercase(),
                    path,
                    e
                ))
            })?;
            operations.push(deref.lower_operation(path, method, &op, &shared)?);
        }
    }

    debug!(
        definitions = deref.definitions.len(),
        operations = operations.len(),
        nodes = deref.arena.len(),
        "dereferenced swagger document"
    );

    Ok(ApiDocument {
        title: spec.info.title.clone(),
        version: spec.info.version.clone(),
        schemas: deref.arena,
        definitions: deref.definitions,
        operations,
        security: spec.security.clone(),
        security_definitions: spec.security_definitions.clone(),
    })
}

struct Dereferencer<'a> {
    spec: &'a SwaggerSpec,
    arena: SchemaArena,
    definitions: IndexMap<String, SchemaId>,
    /// Lowered `#/parameters/*`, shared by every operation referencing them
    parameters: HashMap<String, DocParameter>,
    /// Lowered `#/responses/*`
    responses: HashMap<String, Option<SchemaId>>,
}

impl<'a> Dereferencer<'a> {
    fn new(spec: &'a SwaggerSpec) -> Self {
        Self {
            spec,
            arena: SchemaArena::new(),
            definitions: IndexMap::new(),
            parameters: HashMap::new(),
            responses: HashMap::new(),
        }
    }

    fn lower_definitions(&mut self) -> Result<()> {
        let spec = self.spec;

        // Reserve first so bodies can reference any definition, themselves included.
        let mut aliases = Vec::new();
        for (name, schema) in &spec.definitions {
            match &schema.ref_path {
                Some(ref_path) => aliases.push((name.clone(), ref_path.clone())),
                None => {
                    let id = self.arena.reserve();
                    self.definitions.insert(name.clone(), id);
                }
            }
        }

        // A definition that is only a `$ref` is the same node as its target.
        let mut alias_ids = HashMap::new();
        for (name, ref_path) in aliases {
            alias_ids.insert(name, self.resolve_alias(&ref_path)?);
        }
        let mut ordered = IndexMap::with_capacity(spec.definitions.len());
        for name in spec.definitions.keys() {
            if let Some(id) = alias_ids.get(name).or_else(|| self.definitions.get(name)) {
                ordered.insert(name.clone(), *id);
            }
        }
        self.definitions = ordered;

        for (name, schema) in &spec.definitions {
            if schema.ref_path.is_some() {
                continue;
            }
            let node = self.lower_node(schema, 0)?;
            self.arena.set(self.definitions[name], node);
        }

        Ok(())
    }

    fn resolve_alias(&self, ref_path: &str) -> Result<SchemaId> {
        let mut current = ref_path.to_string();
        for _ in 0..=self.spec.definitions.len() {
            let name = SwaggerSpec::definition_name(&current)
                .ok_or_else(|| CompileError::UnresolvedReference(current.clone()))?;
            if let Some(id) = self.definitions.get(name) {
                return Ok(*id);
            }
            match self.spec.definitions.get(name).and_then(|s| s.ref_path.clone()) {
                Some(next) => current = next,
                None => return Err(CompileError::UnresolvedReference(current)),
            }
        }

        Err(CompileError::UnresolvedReference(ref_path.to_string()))
    }

    fn definition_ref(&self, ref_path: &str) -> Result<SchemaId> {
        SwaggerSpec::definition_name(ref_path)
            .and_then(|name| self.definitions.get(name))
            .copied()
            .ok_or_else(|| CompileError::UnresolvedReference(ref_path.to_string()))
    }

    fn lower_schema(&mut self, schema: &Schema, depth: usize) -> Result<SchemaId> {
        if let Some(ref_path) = &schema.ref_path {
            return self.definition_ref(ref_path);
        }

        let node = self.lower_node(schema, depth)?;
        Ok(self.arena.alloc(node))
    }

    fn lower_node(&mut self, schema: &Schema, depth: usize) -> Result<SchemaNode> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(CompileError::SchemaTooDeep(MAX_SCHEMA_DEPTH));
        }

        let mut properties = IndexMap::with_capacity(schema.properties.len());
        for (name, property) in &schema.properties {
            properties.insert(name.clone(), self.lower_schema(property, depth + 1)?);
        }

        let items = match &schema.items {
            Some(items) => Some(self.lower_schema(items, depth + 1)?),
            None => None,
        };

        Ok(SchemaNode {
            schema_type: schema.schema_type.clone(),
            format: schema.format.clone(),
            description: schema.description.clone(),
            properties,
            required: schema.required.clone(),
            items,
            additional_properties: schema
                .additional_properties
                .as_ref()
                .is_some_and(|additional| additional.is_allowed()),
        })
    }

    fn lower_parameter(&mut self, param: &Parameter) -> Result<DocParameter> {
        if let Some(ref_path) = &param.ref_path {
            let name = SwaggerSpec::parameter_name(ref_path)
                .ok_or_else(|| CompileError::UnresolvedReference(ref_path.clone()))?;
            if let Some(lowered) = self.parameters.get(name) {
                return Ok(lowered.clone());
            }
            let spec = self.spec;
            let target = spec
                .parameters
                .get(name)
                .ok_or_else(|| CompileError::UnresolvedReference(ref_path.clone()))?;
            if target.ref_path.is_some() {
                return Err(CompileError::UnresolvedReference(ref_path.clone()));
            }
            let lowered = self.lower_parameter(target)?;
            self.parameters.insert(name.to_string(), lowered.clone());
            return Ok(lowered);
        }

        let name = param
            .name
            .clone()
            .ok_or_else(|| CompileError::Parse("Parameter without a name".to_string()))?;
        let location = param.location.clone().ok_or_else(|| {
            CompileError::Parse(format!("Parameter '{}' has no location", name))
        })?;

        let schema = match &param.schema {
            Some(schema) => self.lower_schema(schema, 0)?,
            None => {
                let items = match &param.items {
                    Some(items) => Some(self.lower_schema(items, 1)?),
                    None => None,
                };
                self.arena.alloc(SchemaNode {
                    schema_type: param.param_type.clone(),
                    format: param.format.clone(),
                    description: param.description.clone(),
                    items,
                    ..Default::default()
                })
            }
        };

        Ok(DocParameter {
            name,
            location,
            required: param.required,
            description: param.description.clone(),
            schema,
        })
    }

    fn lower_response(&mut self, response: &Response) -> Result<Option<SchemaId>> {
        if let Some(ref_path) = &response.ref_path {
            let name = SwaggerSpec::response_name(ref_path)
                .ok_or_else(|| CompileError::UnresolvedReference(ref_path.clone()))?;
            if let Some(lowered) = self.responses.get(name) {
                return Ok(*lowered);
            }
            let spec = self.spec;
            let target = spec
                .responses
                .get(name)
                .filter(|target| target.ref_path.is_none())
                .ok_or_else(|| CompileError::UnresolvedReference(ref_path.clone()))?;
            let lowered = match &target.schema {
                Some(schema) => Some(self.lower_schema(schema, 0)?),
                None => None,
            };
            self.responses.insert(name.to_string(), lowered);
            return Ok(lowered);
        }

        match &response.schema {
            Some(schema) => Ok(Some(self.lower_schema(schema, 0)?)),
            None => Ok(None),
        }
    }

    fn lower_operation(
        &mut self,
        path: &str,
        method: &str,
        op: &super::types::Operation,
        shared: &[DocParameter],
    ) -> Result<Operation> {
        let own = op
            .parameters
            .iter()
            .map(|param| self.lower_parameter(param))
            .collect::<Result<Vec<_>>>()?;

        // Operation parameters override path-level ones with the same name and location.
        let mut parameters: Vec<DocParameter> = shared
            .iter()
            .filter(|inherited| {
                !own.iter()
                    .any(|p| p.name == inherited.name && p.location == inherited.location)
            })
            .cloned()
            .collect();
        parameters.extend(own);

        let mut responses = IndexMap::with_capacity(op.responses.len());
        for (status, response) in &op.responses {
            responses.insert(status.clone(), self.lower_response(response)?);
        }

        Ok(Operation {
            operation_id: op.operation_id.clone(),
            method: method.to_uppercase(),
            path: path.to_string(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            parameters,
            responses,
            security: op.security.clone(),
            root_property: op.root_property.clone(),
        })
    }
}
