//! Wrapping list results into Connection values

use crate::cursor::{encode_offset, NOOP_CURSOR};
use crate::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pagination metadata a backend returns next to a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationMeta {
    pub offset: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub cursor: String,
    pub node: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub nodes: Vec<Value>,
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
    pub total_count: u64,
}

impl Connection {
    /// Merge onto the envelope the list was taken from
    ///
    /// Envelope properties survive as Connection metadata, except
    /// `pagination` which is consumed.
    pub fn into_value(self, envelope: Option<&Map<String, Value>>) -> Result<Value> {
        let mut object = envelope.cloned().unwrap_or_default();
        object.remove("pagination");

        object.insert("nodes".to_string(), Value::Array(self.nodes));
        object.insert("edges".to_string(), serde_json::to_value(self.edges)?);
        object.insert("totalCount".to_string(), Value::from(self.total_count));
        object.insert("pageInfo".to_string(), serde_json::to_value(self.page_info)?);

        Ok(Value::Object(object))
    }
}

/// Build a Connection over `nodes`
///
/// With pagination metadata every node gets an offset cursor. Without it
/// every node gets the no-op cursor and the page is the whole list.
pub fn build_connection(pagination: Option<PaginationMeta>, nodes: Vec<Value>) -> Connection {
    let edges: Vec<Edge> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| Edge {
            cursor: match pagination {
                Some(meta) => encode_offset(meta.offset.saturating_add(index as u32)),
                None => NOOP_CURSOR.to_string(),
            },
            node: node.clone(),
        })
        .collect();

    let start_cursor = edges.first().map(|edge| edge.cursor.clone());
    let end_cursor = edges.last().map(|edge| edge.cursor.clone());

    let (page_info, total_count) = match pagination {
        Some(meta) => (
            PageInfo {
                end_cursor,
                has_next_page: u64::from(meta.offset) + (nodes.len() as u64) < meta.count,
                has_previous_page: meta.offset > 0,
                start_cursor,
            },
            meta.count,
        ),
        None => (
            PageInfo {
                end_cursor,
                has_next_page: false,
                has_previous_page: false,
                start_cursor,
            },
            nodes.len() as u64,
        ),
    };

    Connection {
        nodes,
        edges,
        page_info,
        total_count,
    }
}

/// Turn a list response into a Connection value
///
/// `envelope` is the object the list was extracted from, if any; its
/// `pagination` property supplies the metadata.
pub fn convert_array_to_connection(
    envelope: Option<&Map<String, Value>>,
    nodes: Vec<Value>,
) -> Result<Value> {
    let pagination = match envelope.and_then(|envelope| envelope.get("pagination")) {
        None | Some(Value::Null) => None,
        Some(meta) => Some(
            serde_json::from_value::<PaginationMeta>(meta.clone()).map_err(|e| {
                RuntimeError::UnexpectedResponse(format!("invalid pagination metadata: {}", e))
            })?,
        ),
    };

    build_connection(pagination, nodes).into_value(envelope)
}
