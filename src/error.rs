//! Error types for the serial JSON-RPC link.
//!
//! Wire-level error codes live in [`ErrorCode`]; everything that can fail
//! while touching the transport funnels into [`LinkError`]. The byte-array
//! helper reports through [`DecodeError`], which deliberately shares
//! nothing with the RPC codes since it is never framed as a response on
//! its own.

use core::fmt;

// ---------------------------------------------------------------------------
// JSON-RPC error codes
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error codes (reserved range plus an "unknown" sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Inbound bytes did not decode as JSON.
    ParseError,
    /// Decoded, but not a valid JSON-RPC request (or too large to buffer).
    InvalidRequest,
    /// The handler has no such method.
    MethodNotFound,
    /// `params` is not an array, or the handler rejected the arguments.
    InvalidParams,
    /// The handler failed while executing the method.
    InternalError,
    /// Implementation-defined server error (-32000 to -32099).
    ServerError,
    /// Uncategorised failure.
    UnknownError,
}

impl ErrorCode {
    /// Numeric wire value.
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ServerError => -32000,
            Self::UnknownError => i16::MAX as i32,
        }
    }

    /// Canonical `message` text for this code.
    pub const fn message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::ServerError => "Server error",
            Self::UnknownError => "Unknown error",
        }
    }

    /// Map a numeric code back to its category.
    pub const fn from_code(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32099..=-32000 => Self::ServerError,
            _ => Self::UnknownError,
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

// ---------------------------------------------------------------------------
// Request rejections
// ---------------------------------------------------------------------------

/// A message the engine refused before reaching the handler.
///
/// Carries everything needed to emit the error response: the id to echo
/// (0 whenever the envelope could not be trusted), the code, and the
/// diagnostic placed in the error object's `data` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub id: i32,
    pub code: ErrorCode,
    pub data: String,
}

impl Rejection {
    pub fn new(id: i32, code: ErrorCode, data: impl Into<String>) -> Self {
        Self {
            id,
            code,
            data: data.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request {} rejected: {}: {}", self.id, self.code, self.data)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Failure while putting a response on the wire or pulling bytes off it.
#[derive(Debug)]
pub enum LinkError<E> {
    /// The response value could not be serialized.
    Serialize(serde_json::Error),
    /// The underlying transport failed.
    Transport(E),
}

impl<E: fmt::Debug> fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(e) => write!(f, "serialize: {e}"),
            Self::Transport(e) => write!(f, "transport: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for LinkError<E> {}

impl<E> From<serde_json::Error> for LinkError<E> {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}

// ---------------------------------------------------------------------------
// Byte-array decode errors
// ---------------------------------------------------------------------------

/// Failure of [`decode_byte_array`](crate::rpc::response::decode_byte_array).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Input is not valid JSON.
    Malformed,
    /// Input is valid JSON but not an array.
    NotAnArray,
    /// Element at `index` is not an integer in 0..=255.
    InvalidElement { index: usize },
    /// The array holds more elements than the output buffer.
    Overflow { len: usize, capacity: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed JSON"),
            Self::NotAnArray => write!(f, "array expected"),
            Self::InvalidElement { index } => write!(f, "element {index} is not a byte"),
            Self::Overflow { len, capacity } => {
                write!(f, "{len} elements exceed capacity {capacity}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}
