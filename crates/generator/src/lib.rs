//! Artifact generation for compiled Swagger GraphQL schemas
//!
//! Renders a [`CompiledSchema`] into GraphQL SDL and serializes the matching
//! [`ResolverManifest`] that the runtime executes.

mod sdl;
mod templates;

use std::fmt;
use std::fs;
use std::path::Path;
use swagger_graphql_common::{CompileError, CompiledSchema, ResolverManifest, Result};
use tera::Tera;
use tracing::info;

/// Serialization format of the resolver manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Json,
    Yaml,
}

impl ManifestFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ManifestFormat::Json => "json",
            ManifestFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Schema generator
///
/// Writes two artifacts:
/// - schema.graphql (type definitions, root types and schema block)
/// - resolvers.json or resolvers.yaml (resolver manifest)
pub struct SchemaGenerator {
    schema: CompiledSchema,
    tera: Tera,
}

impl SchemaGenerator {
    /// Create a new generator for a compiled schema
    pub fn new(schema: CompiledSchema) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self { schema, tera })
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    /// Generate all artifacts to a directory
    pub fn generate_to_directory(&self, output_dir: &Path, format: ManifestFormat) -> Result<()> {
        fs::create_dir_all(output_dir).map_err(|e| {
            CompileError::Generation(format!("Failed to create output directory: {}", e))
        })?;

        self.generate_schema(output_dir)?;
        self.generate_manifest(output_dir, format)?;

        info!(
            output = %output_dir.display(),
            types = self.schema.types.len(),
            "Generated schema artifacts"
        );

        Ok(())
    }

    /// Render the schema as GraphQL SDL
    pub fn render_sdl(&self) -> Result<String> {
        let context = self.create_context();
        self.tera
            .render("schema.graphql", &context)
            .map_err(|e| CompileError::Generation(format!("Template error: {:?}", e)))
    }

    /// Serialize the resolver manifest
    pub fn render_manifest(&self, format: ManifestFormat) -> Result<String> {
        let manifest = ResolverManifest::from_schema(&self.schema);
        let rendered = match format {
            ManifestFormat::Json => serde_json::to_string_pretty(&manifest)?,
            ManifestFormat::Yaml => serde_yaml::to_string(&manifest)?,
        };
        Ok(rendered)
    }

    /// Generate schema.graphql
    fn generate_schema(&self, output_dir: &Path) -> Result<()> {
        let rendered = self.render_sdl()?;

        let output_path = output_dir.join("schema.graphql");
        fs::write(output_path, rendered).map_err(|e| {
            CompileError::Generation(format!("Failed to write schema.graphql: {}", e))
        })?;

        Ok(())
    }

    /// Generate the resolver manifest
    fn generate_manifest(&self, output_dir: &Path, format: ManifestFormat) -> Result<()> {
        let rendered = self.render_manifest(format)?;

        let file_name = format!("resolvers.{}", format.extension());
        fs::write(output_dir.join(&file_name), rendered).map_err(|e| {
            CompileError::Generation(format!("Failed to write {}: {}", file_name, e))
        })?;

        Ok(())
    }

    fn create_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("title", &self.schema.title);
        context.insert("types", &sdl::types(&self.schema));
        context.insert("roots", &sdl::roots(&self.schema));
        context
    }
}

/// Generate schema artifacts (convenience function)
pub fn generate_schema(
    schema: CompiledSchema,
    output_path: &str,
    format: ManifestFormat,
) -> Result<()> {
    let generator = SchemaGenerator::new(schema)?;
    generator.generate_to_directory(Path::new(output_path), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_graphql_common::{
        ArgumentDefinition, BodyReader, BuiltinType, Field, FieldDefinition, RequestTemplate,
        ResolverPlan, ResponseShape, TypeDefinition, TypeKind, TypeRef,
    };

    fn plan(operation_id: &str) -> ResolverPlan {
        ResolverPlan {
            operation_id: operation_id.to_string(),
            request: RequestTemplate {
                path: "/pets".to_string(),
                method: "GET".to_string(),
                ..Default::default()
            },
            security: None,
            body_mapping: None,
            response: ResponseShape::Plain,
            body_reader: BodyReader::Json,
        }
    }

    fn schema() -> CompiledSchema {
        CompiledSchema {
            title: "Pets".to_string(),
            builtins: vec![BuiltinType::Object, BuiltinType::Schema, BuiltinType::String],
            types: vec![
                TypeDefinition {
                    name: "Blob".to_string(),
                    kind: TypeKind::Scalar,
                    description: None,
                    fields: vec![],
                },
                TypeDefinition {
                    name: "Pet".to_string(),
                    kind: TypeKind::Object,
                    description: Some("A pet".to_string()),
                    fields: vec![
                        FieldDefinition {
                            name: "name".to_string(),
                            ty: TypeRef::named("String").non_null(),
                            description: Some("Pet name".to_string()),
                            accessor: None,
                        },
                        FieldDefinition {
                            name: "data".to_string(),
                            ty: TypeRef::named("Blob"),
                            description: None,
                            accessor: None,
                        },
                    ],
                },
            ],
            query: vec![Field {
                name: "pet".to_string(),
                description: None,
                arguments: vec![
                    ArgumentDefinition {
                        name: "id".to_string(),
                        ty: TypeRef::named("ID").non_null(),
                        description: None,
                    },
                    ArgumentDefinition {
                        name: "tag".to_string(),
                        ty: TypeRef::named("String"),
                        description: None,
                    },
                ],
                ty: TypeRef::named("Pet"),
                resolver: plan("getPet"),
            }],
            mutation: vec![],
        }
    }

    #[test]
    fn test_render_sdl() {
        let generator = SchemaGenerator::new(schema()).unwrap();
        let sdl = generator.render_sdl().unwrap();

        let expected = r#"# Pets

scalar Blob

"""
A pet
"""
type Pet {
  """
  Pet name
  """
  name: String!
  data: Blob
}

type Query {
  pet(id: ID!, tag: String): Pet
}

schema {
  query: Query
}
"#;
        assert_eq!(sdl, expected);
    }

    #[test]
    fn test_empty_roots_are_omitted() {
        let mut schema = schema();
        schema.query.clear();
        let sdl = SchemaGenerator::new(schema).unwrap().render_sdl().unwrap();

        assert!(!sdl.contains("type Query"));
        assert!(!sdl.contains("schema {"));
    }

    #[test]
    fn test_manifest_extension() {
        assert_eq!(ManifestFormat::Json.extension(), "json");
        assert_eq!(ManifestFormat::Yaml.to_string(), "yaml");
    }
}
