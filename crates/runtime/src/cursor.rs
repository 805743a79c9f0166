//! Opaque pagination cursors
//!
//! A cursor is base64 over `[tag, offset...]`. Tag `0` is the no-op cursor
//! handed out when the backend returns no pagination metadata; tag `1` carries
//! a big-endian offset in 1, 2 or 4 bytes, whichever is narrowest. The layout
//! is a stable interchange format.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const CURSOR_TYPE_NOOP: u8 = 0;
const CURSOR_TYPE_OFFSET: u8 = 1;

/// `base64([0])`
pub const NOOP_CURSOR: &str = "AA==";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor {0}")]
    Malformed(String),
}

/// Encode an offset cursor
pub fn encode_offset(offset: u32) -> String {
    let mut bytes = vec![CURSOR_TYPE_OFFSET];
    if offset <= 0xff {
        bytes.push(offset as u8);
    } else if offset <= 0xffff {
        bytes.extend_from_slice(&(offset as u16).to_be_bytes());
    } else {
        bytes.extend_from_slice(&offset.to_be_bytes());
    }
    STANDARD.encode(bytes)
}

/// Decode an offset cursor
///
/// No-op cursors, foreign tags and lengths other than 2, 3 or 5 bytes are
/// rejected.
pub fn decode_offset(cursor: &str) -> Result<u32, CursorError> {
    let malformed = || CursorError::Malformed(cursor.to_string());
    let bytes = STANDARD.decode(cursor).map_err(|_| malformed())?;

    if bytes.first() != Some(&CURSOR_TYPE_OFFSET) {
        return Err(malformed());
    }

    match bytes.len() {
        2 => Ok(u32::from(bytes[1])),
        3 => Ok(u32::from(u16::from_be_bytes([bytes[1], bytes[2]]))),
        5 => Ok(u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]])),
        _ => Err(malformed()),
    }
}

/// Relay pagination arguments of a field call
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CursorArgs {
    #[serde(default)]
    pub first: Option<i64>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub last: Option<i64>,
    #[serde(default)]
    pub before: Option<String>,
}

impl CursorArgs {
    /// Pick the pagination arguments out of a call's arguments
    ///
    /// Values of the wrong JSON type are treated as absent.
    pub fn from_arguments(arguments: &Map<String, Value>) -> Self {
        Self {
            first: arguments.get("first").and_then(Value::as_i64),
            after: arguments
                .get("after")
                .and_then(Value::as_str)
                .map(str::to_string),
            last: arguments.get("last").and_then(Value::as_i64),
            before: arguments
                .get("before")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Offset/limit query derived from pagination arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Window {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }
}

/// Derive the offset/limit window for `args`
///
/// Supports forward paging (`first` with optional `after`) and backward
/// paging with both `last` and `before`. Any other combination yields an empty
/// window, meaning an unfiltered query.
pub fn derive_window(args: &CursorArgs) -> Result<Window, CursorError> {
    let after = || -> Result<Option<i64>, CursorError> {
        args.after
            .as_deref()
            .map(|after| decode_offset(after).map(|offset| i64::from(offset) + 1))
            .transpose()
    };

    let window = match (args.first, args.last, &args.before) {
        (Some(first), _, _) => Window {
            offset: after()?,
            limit: Some(first),
        },
        (None, Some(last), Some(before)) => Window {
            offset: Some(i64::from(decode_offset(before)?) - last),
            limit: Some(last),
        },
        // bare `last`, or `last` with `after`
        (None, Some(_), None) => Window::default(),
        (None, None, _) => Window {
            offset: after()?,
            limit: None,
        },
    };

    Ok(window)
}
