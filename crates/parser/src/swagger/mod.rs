//! Swagger 2.0 specification parser
//!
//! Parses Swagger 2.0 documents (JSON or YAML) and dereferences every internal
//! `$ref` into an [`ApiDocument`](swagger_graphql_common::ApiDocument).
//!
//! ## Supported references
//! - `#/definitions/*` (shared identity: every reference yields the same schema id)
//! - `#/parameters/*`
//! - `#/responses/*`
//!
//! External references are not resolved.
//!
//! ## Usage
//! ```rust,ignore
//! use swagger_graphql_parser::swagger::SwaggerParser;
//!
//! let parser = SwaggerParser::from_file("petstore.yaml")?;
//! let document = parser.parse()?;
//! ```

mod converter;
mod parser;
mod types;

pub use parser::{SpecFormat, SwaggerParser};
pub use types::*;
