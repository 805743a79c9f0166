//! Resolver runtime for compiled Swagger GraphQL schemas
//!
//! Executes [`ResolverPlan`](swagger_graphql_common::ResolverPlan)s against a
//! host-supplied [`Fetch`] capability and implements the opaque cursor format
//! used by Connection fields.

pub mod accessors;
pub mod auth;
pub mod connection;
pub mod cursor;
pub mod fetch;
pub mod resolver;

pub use accessors::FieldAccessors;
pub use auth::VerifyAuth;
pub use connection::{
    build_connection, convert_array_to_connection, Connection, Edge, PageInfo, PaginationMeta,
};
pub use cursor::{
    decode_offset, derive_window, encode_offset, CursorArgs, CursorError, Window, NOOP_CURSOR,
};
pub use fetch::{Fetch, FetchError, FetchRequest, FetchResponse};
pub use resolver::{execute, ResolverContext};

use thiserror::Error;

/// Errors raised while executing a resolver plan
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[source] FetchError),

    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
