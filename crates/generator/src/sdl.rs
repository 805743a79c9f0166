//! Template context for the SDL rendering of a compiled schema

use serde::Serialize;
use swagger_graphql_common::{CompiledSchema, Field, TypeDefinition, TypeKind};

#[derive(Debug, Serialize)]
pub(crate) struct SdlType<'a> {
    keyword: &'static str,
    name: &'a str,
    description: Option<&'a str>,
    fields: Vec<SdlField<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SdlField<'a> {
    name: &'a str,
    ty: String,
    description: Option<&'a str>,
    arguments: Vec<SdlArgument<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SdlArgument<'a> {
    name: &'a str,
    ty: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SdlRoot<'a> {
    operation: &'static str,
    name: &'static str,
    fields: Vec<SdlField<'a>>,
}

impl<'a> From<&'a TypeDefinition> for SdlType<'a> {
    fn from(definition: &'a TypeDefinition) -> Self {
        let keyword = match definition.kind {
            TypeKind::Object => "type",
            TypeKind::InputObject => "input",
            TypeKind::Scalar => "scalar",
        };

        Self {
            keyword,
            name: &definition.name,
            description: definition.description.as_deref(),
            fields: definition
                .fields
                .iter()
                .map(|field| SdlField {
                    name: &field.name,
                    ty: field.ty.to_string(),
                    description: field.description.as_deref(),
                    arguments: Vec::new(),
                })
                .collect(),
        }
    }
}

impl<'a> From<&'a Field> for SdlField<'a> {
    fn from(field: &'a Field) -> Self {
        Self {
            name: &field.name,
            ty: field.ty.to_string(),
            description: field.description.as_deref(),
            arguments: field
                .arguments
                .iter()
                .map(|arg| SdlArgument {
                    name: &arg.name,
                    ty: arg.ty.to_string(),
                })
                .collect(),
        }
    }
}

pub(crate) fn types(schema: &CompiledSchema) -> Vec<SdlType<'_>> {
    schema.types.iter().map(SdlType::from).collect()
}

/// Root object types, skipping roots without fields
pub(crate) fn roots(schema: &CompiledSchema) -> Vec<SdlRoot<'_>> {
    [
        ("query", "Query", &schema.query),
        ("mutation", "Mutation", &schema.mutation),
    ]
    .into_iter()
    .filter(|(_, _, fields)| !fields.is_empty())
    .map(|(operation, name, fields)| SdlRoot {
        operation,
        name,
        fields: fields.iter().map(SdlField::from).collect(),
    })
    .collect()
}
