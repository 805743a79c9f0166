//! Swagger spec file parser

use super::types::SwaggerSpec;
use std::fs;
use std::path::Path;
use swagger_graphql_common::{ApiDocument, CompileError, Result};

/// Serialization format of a spec file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Guess the format from a file extension
    ///
    /// YAML is a superset of JSON, so anything unrecognised is read as YAML.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SpecFormat::Json,
            _ => SpecFormat::Yaml,
        }
    }
}

/// Swagger 2.0 specification parser
///
/// Reads a Swagger document from JSON or YAML and dereferences it into an
/// [`ApiDocument`].
pub struct SwaggerParser {
    spec: SwaggerSpec,
}

impl SwaggerParser {
    /// Load a Swagger spec from file path, detecting the format from its extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::from_file_with_format(path, SpecFormat::detect(path))
    }

    pub fn from_file_with_format<P: AsRef<Path>>(path: P, format: SpecFormat) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CompileError::Parse(format!(
                "Failed to read Swagger file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_str_with_format(&content, format)
    }

    pub fn from_str_with_format(content: &str, format: SpecFormat) -> Result<Self> {
        match format {
            SpecFormat::Json => Self::from_json(content),
            SpecFormat::Yaml => Self::from_yaml(content),
        }
    }

    /// Parse Swagger spec from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: SwaggerSpec = serde_json::from_str(json)
            .map_err(|e| CompileError::Parse(format!("Failed to parse Swagger JSON: {}", e)))?;

        Ok(Self { spec })
    }

    /// Parse Swagger spec from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| CompileError::Parse(format!("Failed to parse Swagger YAML: {}", e)))?;

        // Status codes are integers in YAML but map keys are strings in the model.
        let spec: SwaggerSpec = serde_yaml::from_value(stringify_keys(value))
            .map_err(|e| CompileError::Parse(format!("Failed to parse Swagger YAML: {}", e)))?;

        Ok(Self { spec })
    }

    /// Dereference the spec into an [`ApiDocument`]
    pub fn parse(&self) -> Result<ApiDocument> {
        super::converter::convert_swagger_to_document(&self.spec)
    }

    /// Get reference to the underlying Swagger spec
    pub fn spec(&self) -> &SwaggerSpec {
        &self.spec
    }
}

fn stringify_keys(value: serde_yaml::Value) -> serde_yaml::Value {
    use serde_yaml::Value;

    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::Number(n) => Value::String(n.to_string()),
                        Value::Bool(b) => Value::String(b.to_string()),
                        other => other,
                    };
                    (key, stringify_keys(value))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(stringify_keys).collect()),
        Value::Tagged(tagged) => stringify_keys(tagged.value),
        other => other,
    }
}
