//! Operation compiler
//!
//! Turns one HTTP operation into a root field: its arguments, its result type
//! and the [`ResolverPlan`] the runtime follows to call the endpoint.

use crate::connection::CURSOR_ARGUMENTS;
use crate::context::CompilerContext;
use crate::naming::{argument_name, is_valid_name, make_unique_valid_name, normalize_operation_id};
use crate::registry::NameContext;
use std::collections::{HashMap, HashSet};
use swagger_graphql_common::{
    ArgumentDefinition, BodyMapping, BodyReader, BodyTemplate, CompileError, Field, FieldMapping,
    ObjectMapping, Operation, ParamBinding, RequestTemplate, ResolverPlan, ResponseShape, Result,
    SchemaArena, SchemaId, SchemaNode, SecurityConfig, MAX_SCHEMA_DEPTH,
};
use tracing::debug;

/// Status codes whose schema describes the success body, by precedence
pub const SUCCESS_STATUSES: [&str; 3] = ["200", "201", "204"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterLocation {
    Path,
    Query,
    Header,
    FormData,
    Body,
}

impl ParameterLocation {
    fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "formData" => Some(ParameterLocation::FormData),
            "body" => Some(ParameterLocation::Body),
            _ => None,
        }
    }
}

/// Root field name for an operation id: the name prefix plus the normalized id
pub fn field_name(name_prefix: &str, operation_id: &str) -> String {
    format!("{}{}", name_prefix, normalize_operation_id(operation_id))
}

/// Compile `operation` into a root field
pub fn compile_operation(ctx: &mut CompilerContext, operation: &Operation) -> Result<Field> {
    let operation_id = operation
        .operation_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CompileError::InvalidOperationId {
            id: String::new(),
            method: operation.method.clone(),
            path: operation.path.clone(),
        })?;
    let normalized = normalize_operation_id(operation_id);

    let mut request = RequestTemplate {
        path: operation.path.clone(),
        method: operation.method.clone(),
        ..Default::default()
    };
    let mut form = Vec::new();
    let mut body = None;
    let mut body_mapping = None;

    for parameter in &operation.parameters {
        let argument = argument_name(&parameter.name);
        let binding = ParamBinding::new(&parameter.name, &argument);

        match ParameterLocation::parse(&parameter.location) {
            Some(ParameterLocation::Path) => request.path_params.push(binding),
            Some(ParameterLocation::Query) => request.query.push(binding),
            Some(ParameterLocation::Header) => request.headers.push(binding),
            Some(ParameterLocation::FormData) => form.push(binding),
            Some(ParameterLocation::Body) => {
                body_mapping =
                    BodyMappingBuilder::new(&ctx.schemas).build(parameter.schema, &argument)?;
                body = Some(BodyTemplate::Argument(argument));
            }
            None => {
                return Err(CompileError::UnsupportedParameterLocation {
                    location: parameter.location.clone(),
                    parameter: parameter.name.clone(),
                    operation: operation_id.to_string(),
                })
            }
        }
    }

    request.body = if form.is_empty() {
        body
    } else {
        Some(BodyTemplate::Form(form))
    };

    let mut arguments = Vec::with_capacity(operation.parameters.len() + CURSOR_ARGUMENTS.len());
    for parameter in &operation.parameters {
        let ty = ctx.inputs.resolve(
            &ctx.schemas,
            &mut ctx.builtins,
            parameter.schema,
            parameter.required,
            None,
        )?;
        arguments.push(ArgumentDefinition {
            name: argument_name(&parameter.name),
            ty,
            description: parameter.description.clone(),
        });
    }

    let success = SUCCESS_STATUSES
        .iter()
        .find_map(|status| operation.responses.get(*status))
        .copied()
        .flatten();

    let payload = match (&operation.root_property, success) {
        (Some(property), Some(body)) => Some(
            *ctx.schemas
                .get(body)
                .properties
                .get(property)
                .ok_or_else(|| missing_root_property(operation_id, property))?,
        ),
        (Some(property), None) => return Err(missing_root_property(operation_id, property)),
        (None, body) => body,
    };

    let context = NameContext {
        parent: &normalized,
        hint: "Response",
    };

    let (ty, response) = match payload {
        None => {
            let empty = empty_response(&mut ctx.schemas);
            let ty = ctx
                .outputs
                .resolve(&ctx.schemas, &mut ctx.builtins, empty, false, Some(context))?;
            (ty, ResponseShape::Empty)
        }
        Some(list) if is_list(&ctx.schemas, list) => {
            let container = success.unwrap_or(list);
            let ty = ctx.connections.get(
                &mut ctx.schemas,
                &mut ctx.outputs,
                &mut ctx.builtins,
                container,
                operation.root_property.as_deref(),
            )?;

            request.paginate = true;
            for (name, scalar) in CURSOR_ARGUMENTS {
                arguments.push(ArgumentDefinition {
                    name: name.to_string(),
                    ty: ctx.builtins.scalar(scalar),
                    description: None,
                });
            }

            let shape = ResponseShape::Connection {
                root_property: operation.root_property.clone(),
            };
            (ty, shape)
        }
        Some(payload) => {
            let ty = ctx
                .outputs
                .resolve(&ctx.schemas, &mut ctx.builtins, payload, false, Some(context))?;
            let shape = match &operation.root_property {
                Some(property) => ResponseShape::RootProperty {
                    property: property.clone(),
                },
                None => ResponseShape::Plain,
            };
            (ty, shape)
        }
    };

    let body_reader = if payload.is_some() {
        BodyReader::Json
    } else {
        BodyReader::Text
    };

    debug!(
        operation = %operation_id,
        field = %normalized,
        result = %ty,
        "compiled operation"
    );

    Ok(Field {
        name: field_name(&ctx.name_prefix, operation_id),
        description: operation
            .summary
            .clone()
            .or_else(|| operation.description.clone()),
        arguments,
        ty,
        resolver: ResolverPlan {
            operation_id: operation_id.to_string(),
            request,
            security: security_config(ctx, operation),
            body_mapping,
            response,
            body_reader,
        },
    })
}

fn missing_root_property(operation_id: &str, property: &str) -> CompileError {
    CompileError::MissingRootProperty {
        operation: operation_id.to_string(),
        property: property.to_string(),
    }
}

fn is_list(schemas: &SchemaArena, node: SchemaId) -> bool {
    let node = schemas.get(node);
    node.is_array() && node.items.is_some()
}

/// `{rawResponseBody: string, rawInputOptions: object}`
fn empty_response(schemas: &mut SchemaArena) -> SchemaId {
    let body = schemas.alloc(SchemaNode::primitive("string"));
    let options = schemas.alloc(SchemaNode::primitive("object"));
    schemas.alloc(SchemaNode::object(
        vec![
            ("rawResponseBody".to_string(), body),
            ("rawInputOptions".to_string(), options),
        ],
        &[],
    ))
}

/// Operation security overrides the document default; empty means none
fn security_config(ctx: &CompilerContext, operation: &Operation) -> Option<SecurityConfig> {
    let security = operation.security.as_ref().or(ctx.security.as_ref())?;
    if security.is_empty() {
        return None;
    }

    let definitions = security
        .iter()
        .flat_map(|requirement| requirement.keys())
        .filter_map(|name| {
            ctx.security_definitions
                .get(name)
                .map(|definition| (name.clone(), definition.clone()))
        })
        .collect();

    Some(SecurityConfig {
        security: security.clone(),
        definitions,
    })
}

/// Builds the key restoration table of a body schema
///
/// Object shapes are keyed by schema identity, so a self-referencing body
/// yields a cyclic table instead of an unbounded one. Passthrough objects are
/// sent verbatim and get no entry.
struct BodyMappingBuilder<'a> {
    schemas: &'a SchemaArena,
    index: HashMap<SchemaId, usize>,
    objects: Vec<ObjectMapping>,
}

impl<'a> BodyMappingBuilder<'a> {
    fn new(schemas: &'a SchemaArena) -> Self {
        Self {
            schemas,
            index: HashMap::new(),
            objects: Vec::new(),
        }
    }

    /// `None` when no key anywhere in the body needs restoring
    fn build(mut self, node: SchemaId, argument: &str) -> Result<Option<BodyMapping>> {
        if self.object(node, 0)?.is_none() {
            return Ok(None);
        }

        let renames = self
            .objects
            .iter()
            .flat_map(|object| &object.fields)
            .any(|field| field.name != field.original_name);
        if !renames {
            return Ok(None);
        }

        Ok(Some(BodyMapping {
            argument: argument.to_string(),
            objects: self.objects,
        }))
    }

    /// Table entry of the object shape behind `node`, looking through lists
    fn object(&mut self, node: SchemaId, depth: usize) -> Result<Option<usize>> {
        let Some(node) = self.element(node)? else {
            return Ok(None);
        };
        if let Some(&index) = self.index.get(&node) {
            return Ok(Some(index));
        }
        if depth > MAX_SCHEMA_DEPTH {
            return Err(CompileError::SchemaTooDeep(MAX_SCHEMA_DEPTH));
        }

        let schemas = self.schemas;
        let schema = schemas.get(node);
        if schema.additional_properties || schema.properties.is_empty() {
            return Ok(None);
        }

        // Registered before the fields so cycles point back at this entry
        let index = self.objects.len();
        self.objects.push(ObjectMapping::default());
        self.index.insert(node, index);

        let mut used: HashSet<String> = schema.properties.keys().cloned().collect();
        let mut fields = Vec::new();
        for (key, &child) in &schema.properties {
            let name = if is_valid_name(key) {
                key.clone()
            } else {
                make_unique_valid_name(key, &mut used)
            };
            let object = self.object(child, depth + 1)?;

            if name != *key || object.is_some() {
                fields.push(FieldMapping {
                    name,
                    original_name: key.clone(),
                    object,
                });
            }
        }

        self.objects[index].fields = fields;
        Ok(Some(index))
    }

    /// Innermost item schema of nested arrays
    fn element(&self, mut node: SchemaId) -> Result<Option<SchemaId>> {
        for _ in 0..=MAX_SCHEMA_DEPTH {
            let schema = self.schemas.get(node);
            if !schema.is_array() {
                return Ok(Some(node));
            }
            match schema.items {
                Some(items) => node = items,
                None => return Ok(None),
            }
        }
        Err(CompileError::SchemaTooDeep(MAX_SCHEMA_DEPTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("", "getPetById"), "petById");
        assert_eq!(field_name("api", "addPet"), "apiaddPet");
    }

    #[test]
    fn test_parameter_locations() {
        assert_eq!(
            ParameterLocation::parse("formData"),
            Some(ParameterLocation::FormData)
        );
        assert_eq!(ParameterLocation::parse("cookie"), None);
    }

    fn mapping(arena: &SchemaArena, body: SchemaId) -> Option<BodyMapping> {
        BodyMappingBuilder::new(arena).build(body, "body").unwrap()
    }

    fn renamed(name: &str, original_name: &str, object: Option<usize>) -> FieldMapping {
        FieldMapping {
            name: name.to_string(),
            original_name: original_name.to_string(),
            object,
        }
    }

    #[test]
    fn test_maps_nested_objects() {
        let mut arena = SchemaArena::new();
        let value = arena.alloc(SchemaNode::primitive("string"));
        let inner = arena.alloc(SchemaNode::object(
            vec![("bad-name".to_string(), value)],
            &[],
        ));
        let body = arena.alloc(SchemaNode::object(
            vec![("1".to_string(), inner), ("ok".to_string(), value)],
            &[],
        ));

        let mapping = mapping(&arena, body).unwrap();
        assert_eq!(mapping.argument, "body");
        assert_eq!(
            mapping.objects,
            vec![
                ObjectMapping {
                    fields: vec![renamed("_1", "1", Some(1))],
                },
                ObjectMapping {
                    fields: vec![renamed("badName", "bad-name", None)],
                },
            ]
        );
    }

    #[test]
    fn test_recursive_body_maps_back_to_itself() {
        let mut arena = SchemaArena::new();
        let label = arena.alloc(SchemaNode::primitive("string"));
        let node = arena.reserve();
        arena.set(
            node,
            SchemaNode::object(
                vec![("tree-label".to_string(), label), ("sub-tree".to_string(), node)],
                &[],
            ),
        );

        let mapping = mapping(&arena, node).unwrap();
        assert_eq!(
            mapping.objects,
            vec![ObjectMapping {
                fields: vec![
                    renamed("treeLabel", "tree-label", None),
                    renamed("subTree", "sub-tree", Some(0)),
                ],
            }]
        );
    }

    #[test]
    fn test_array_items_are_mapped() {
        let mut arena = SchemaArena::new();
        let value = arena.alloc(SchemaNode::primitive("string"));
        let thing = arena.alloc(SchemaNode::object(
            vec![("display-name".to_string(), value)],
            &[],
        ));
        let rows = arena.alloc(SchemaNode::array(thing));
        let grid = arena.alloc(SchemaNode::array(rows));
        let body = arena.alloc(SchemaNode::object(
            vec![("items".to_string(), grid)],
            &[],
        ));

        let mapping = mapping(&arena, body).unwrap();
        assert_eq!(mapping.objects[0].fields, vec![renamed("items", "items", Some(1))]);
        assert_eq!(
            mapping.objects[1].fields,
            vec![renamed("displayName", "display-name", None)]
        );
    }

    #[test]
    fn test_legal_bodies_need_no_mapping() {
        let mut arena = SchemaArena::new();
        let value = arena.alloc(SchemaNode::primitive("string"));
        let mut free_form = SchemaNode::object(vec![("bad-key".to_string(), value)], &[]);
        free_form.additional_properties = true;
        let free_form = arena.alloc(free_form);
        let body = arena.alloc(SchemaNode::object(
            vec![("name".to_string(), value), ("extra".to_string(), free_form)],
            &[],
        ));

        assert_eq!(mapping(&arena, body), None);
        assert_eq!(mapping(&arena, value), None);
    }
}
