//! The HTTP capability supplied by the host
//!
//! The runtime never performs I/O itself. Each resolver call issues exactly
//! one [`Fetch::fetch`]; retries, timeouts and transport concerns belong to the
//! implementation.

use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Options of one outbound call
///
/// Serializes as `{method, endpointName, qs, pathParams, headers, json}`;
/// absent groups are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub method: String,
    /// Operation id of the endpoint being called
    pub endpoint_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qs: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_params: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

/// Raw response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    body: String,
}

impl FetchResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Call the endpoint at `path`, a template such as `/pets/{petId}`
    async fn fetch(
        &self,
        path: &str,
        request: FetchRequest,
    ) -> std::result::Result<FetchResponse, FetchError>;
}
