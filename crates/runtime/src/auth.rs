//! Optional authorization hook

use swagger_graphql_common::SecurityConfig;

/// Checks a call's security requirements before it is dispatched
///
/// Only consulted for operations that declare security. Returning an error
/// aborts the call with [`RuntimeError::Unauthorized`](crate::RuntimeError::Unauthorized).
#[cfg_attr(test, mockall::automock)]
pub trait VerifyAuth: Send + Sync {
    fn verify(&self, security: &SecurityConfig) -> Result<(), String>;
}
