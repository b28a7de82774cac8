//! Response encoding with pre-computed buffer sizing.
//!
//! Every response is bounded before it is built: the envelope overhead is
//! fixed, the payload bound follows from its shape. The output buffer is
//! allocated once at that size, serialized into, then written to the
//! transport followed by the delimiter and a flush.
//!
//! ```text
//! {"jsonrpc":"2.0","id":<i32>,"result":<payload>}
//! {"jsonrpc":"2.0","id":<i32>,"error":{"code":<i32>,"message":"..","data":".."}}
//! ```

use log::debug;
use serde::Serialize;
use serde_json::Value;

use super::request::JSONRPC_VERSION;
use super::transport::Transport;
use crate::error::{DecodeError, ErrorCode, LinkError};

// ── Size bounds ──────────────────────────────────────────────

/// `{"jsonrpc":"2.0","id":`
const ENVELOPE_HEAD: usize = 22;
/// Widest i32: `-2147483648`.
const MAX_I32_WIDTH: usize = 11;
/// `,"result":` plus the closing `}`.
const RESULT_FIELD: usize = 10 + 1;
/// `,"error":{"code":`
const ERROR_HEAD: usize = 17;
/// `,"message":`
const MESSAGE_FIELD: usize = 11;
/// `,"data":`
const DATA_FIELD: usize = 8;
/// `}}`
const ERROR_TAIL: usize = 2;
/// `[` and `]`
const ARRAY_BRACKETS: usize = 2;
/// `255,`
const MAX_BYTE_ELEMENT: usize = 4;
/// `-2147483648,`
const MAX_I32_ELEMENT: usize = MAX_I32_WIDTH + 1;

/// Overhead of a success envelope around its `result` payload.
pub const RESULT_OVERHEAD: usize = ENVELOPE_HEAD + MAX_I32_WIDTH + RESULT_FIELD;

/// Serialized length of `s` as a JSON string, quotes included.
pub fn json_string_len(s: &str) -> usize {
    2 + s
        .bytes()
        .map(|b| match b {
            b'"' | b'\\' | b'\n' | b'\r' | b'\t' | 0x08 | 0x0C => 2,
            0x00..=0x1F => 6,
            _ => 1,
        })
        .sum::<usize>()
}

/// Upper bound for a string result.
pub fn string_result_capacity(text: &str) -> usize {
    RESULT_OVERHEAD + json_string_len(text)
}

/// Upper bound for a byte-array result of `len` elements.
pub const fn byte_array_result_capacity(len: usize) -> usize {
    RESULT_OVERHEAD + ARRAY_BRACKETS + MAX_BYTE_ELEMENT * len
}

/// Upper bound for an i32-array result of `len` elements.
pub const fn integer_array_result_capacity(len: usize) -> usize {
    RESULT_OVERHEAD + ARRAY_BRACKETS + MAX_I32_ELEMENT * len
}

/// Upper bound for an error response.
pub fn error_capacity(message: &str, data: Option<&str>) -> usize {
    ENVELOPE_HEAD
        + MAX_I32_WIDTH
        + ERROR_HEAD
        + MAX_I32_WIDTH
        + MESSAGE_FIELD
        + json_string_len(message)
        + data.map_or(0, |d| DATA_FIELD + json_string_len(d))
        + ERROR_TAIL
}

// ── Envelopes ────────────────────────────────────────────────

#[derive(Serialize)]
struct ResultEnvelope<R> {
    jsonrpc: &'static str,
    id: i32,
    result: R,
}

#[derive(Serialize)]
struct ErrorObject<'a> {
    code: i32,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    jsonrpc: &'static str,
    id: i32,
    error: ErrorObject<'a>,
}

// ── Encoder ──────────────────────────────────────────────────

/// Writes framed responses to a borrowed transport.
pub struct ResponseEncoder<'a, T: Transport> {
    transport: &'a mut T,
    delimiter: u8,
}

impl<'a, T: Transport> ResponseEncoder<'a, T> {
    pub fn new(transport: &'a mut T, delimiter: u8) -> Self {
        Self {
            transport,
            delimiter,
        }
    }

    /// `{"jsonrpc":"2.0","id":id,"result":"text"}`
    pub fn send_string_result(&mut self, id: i32, text: &str) -> Result<(), LinkError<T::Error>> {
        let envelope = ResultEnvelope {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: text,
        };
        self.send(&envelope, string_result_capacity(text))
    }

    /// `{"jsonrpc":"2.0","id":id,"result":[b0,b1,..]}`
    pub fn send_byte_array_result(
        &mut self,
        id: i32,
        bytes: &[u8],
    ) -> Result<(), LinkError<T::Error>> {
        let envelope = ResultEnvelope {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: bytes,
        };
        self.send(&envelope, byte_array_result_capacity(bytes.len()))
    }

    /// `{"jsonrpc":"2.0","id":id,"result":[i0,i1,..]}`
    pub fn send_integer_array_result(
        &mut self,
        id: i32,
        ints: &[i32],
    ) -> Result<(), LinkError<T::Error>> {
        let envelope = ResultEnvelope {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: ints,
        };
        self.send(&envelope, integer_array_result_capacity(ints.len()))
    }

    /// Error object response; `data` is left out entirely when `None`.
    pub fn send_error(
        &mut self,
        id: i32,
        code: impl Into<i32>,
        message: &str,
        data: Option<&str>,
    ) -> Result<(), LinkError<T::Error>> {
        let envelope = ErrorEnvelope {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: ErrorObject {
                code: code.into(),
                message,
                data,
            },
        };
        self.send(&envelope, error_capacity(message, data))
    }

    /// Error response using the canonical message for `code`.
    pub fn send_error_code(
        &mut self,
        id: i32,
        code: ErrorCode,
        data: Option<&str>,
    ) -> Result<(), LinkError<T::Error>> {
        self.send_error(id, code, code.message(), data)
    }

    fn send<S: Serialize>(&mut self, envelope: &S, capacity: usize) -> Result<(), LinkError<T::Error>> {
        let mut buf = Vec::with_capacity(capacity);
        serde_json::to_writer(&mut buf, envelope)?;
        debug_assert!(
            buf.len() <= capacity,
            "response size {} exceeds bound {}",
            buf.len(),
            capacity
        );
        debug!("RPC: tx {} bytes (bound {})", buf.len(), capacity);

        self.transport
            .write_bytes(&buf)
            .map_err(LinkError::Transport)?;
        self.transport
            .write_bytes(&[self.delimiter])
            .map_err(LinkError::Transport)?;
        self.transport.flush().map_err(LinkError::Transport)
    }
}

// ── Helpers ──────────────────────────────────────────────────

/// Decode a JSON array of bytes (e.g. a string parameter such as
/// `"[1,2,3]"`) into `out`.
///
/// Returns the number of elements written. The element count is checked
/// against `out.len()` before anything is written, so on error `out` is
/// left untouched.
pub fn decode_byte_array(raw: &[u8], out: &mut [u8]) -> Result<usize, DecodeError> {
    let doc: Value = serde_json::from_slice(raw).map_err(|_| DecodeError::Malformed)?;
    let Value::Array(items) = doc else {
        return Err(DecodeError::NotAnArray);
    };

    if items.len() > out.len() {
        return Err(DecodeError::Overflow {
            len: items.len(),
            capacity: out.len(),
        });
    }

    if let Some(index) = items.iter().position(|item| as_byte(item).is_none()) {
        return Err(DecodeError::InvalidElement { index });
    }

    for (slot, item) in out.iter_mut().zip(&items) {
        *slot = as_byte(item).unwrap_or_default();
    }

    Ok(items.len())
}

fn as_byte(v: &Value) -> Option<u8> {
    v.as_u64().and_then(|n| u8::try_from(n).ok())
}
