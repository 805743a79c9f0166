//! Swagger document loading for the GraphQL compiler
//!
//! This crate reads Swagger 2.0 documents and turns them into the
//! dereferenced intermediate representation (`ApiDocument`) consumed by the
//! compiler.
//!
//! ## Dereferencing Strategy
//!
//! Every schema fragment is stored once in a `SchemaArena` and addressed by a
//! `SchemaId` assigned during loading:
//! - named definitions are reserved before any body is lowered, so recursive
//!   definitions resolve to themselves
//! - inline fragments always get a fresh id, even when structurally equal
//! - non-body parameters become their own schema node

pub mod swagger;

pub use swagger::{SpecFormat, SwaggerParser};

use std::path::Path;
use swagger_graphql_common::{ApiDocument, Result};

/// Load and dereference a Swagger document
///
/// # Arguments
/// * `path` - Path to a `.json`, `.yaml` or `.yml` Swagger 2.0 document
///
/// # Returns
/// * `ApiDocument` - Dereferenced representation of the document
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<ApiDocument> {
    SwaggerParser::from_file(path)?.parse()
}
