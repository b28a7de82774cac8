//! Request envelope parsing and validation.
//!
//! Turns one framed message into an [`RpcRequest`] or a [`Rejection`]
//! describing the error response to send instead. Handlers only ever see
//! string parameters: every JSON value in `params` is flattened to text.

use serde_json::Value;

use crate::error::{ErrorCode, Rejection};

/// Protocol version every request must carry.
pub const JSONRPC_VERSION: &str = "2.0";

/// A validated request, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RpcRequest {
    /// Request id, 0 when absent.
    pub id: i32,
    /// Method name, empty when absent.
    pub method: String,
    /// Positional parameters in their textual form.
    pub params: Vec<String>,
}

/// Parse and validate a complete message (delimiter excluded).
pub fn parse_request(raw: &[u8]) -> Result<RpcRequest, Rejection> {
    let doc: Value = serde_json::from_slice(raw)
        .map_err(|e| Rejection::new(0, ErrorCode::ParseError, e.to_string()))?;

    // The id cannot be trusted until the envelope is known to be JSON-RPC.
    if doc.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(Rejection::new(
            0,
            ErrorCode::InvalidRequest,
            "Invalid protocol version",
        ));
    }

    let id = doc.get("id").map_or(0, coerce_id);

    let method = doc
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    let Some(Value::Array(items)) = doc.get("params") else {
        return Err(Rejection::new(id, ErrorCode::InvalidParams, "Array expected"));
    };
    let params = items.iter().map(param_text).collect();

    Ok(RpcRequest { id, method, params })
}

/// Integer view of an `id` value.
///
/// Numeric strings are read as numbers. Floats truncate toward zero.
/// Anything that does not fit an i32, or is not numeric at all, reads as 0.
fn coerce_id(v: &Value) -> i32 {
    match v {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).unwrap_or(0),
            None => n.as_f64().map_or(0, float_id),
        },
        Value::String(s) => match s.parse::<i64>() {
            Ok(i) => i32::try_from(i).unwrap_or(0),
            Err(_) => s.parse::<f64>().map_or(0, float_id),
        },
        Value::Bool(b) => i32::from(*b),
        _ => 0,
    }
}

fn float_id(f: f64) -> i32 {
    if f.is_finite() && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        f as i32
    } else {
        0
    }
}

/// Textual form of a parameter: strings without quotes, everything else
/// as compact JSON.
fn param_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
