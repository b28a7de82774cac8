//! Host-side client for talking to a board over the serial link.
//!
//! Sends one request at a time and waits, with a deadline, for the single
//! delimited response. Runs on the host (std), never on the board.
//!
//! ```text
//!  host                                   board
//!   │ {"jsonrpc":"2.0","id":n,...}\n ──▶  RpcEngine
//!   │ ◀── {"jsonrpc":"2.0","id":n,"result":..}\n
//! ```

use core::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use super::request::JSONRPC_VERSION;
use super::transport::Transport;
use crate::config::ClientConfig;
use crate::error::ErrorCode;

// ── Error type ───────────────────────────────────────────────

#[derive(Debug)]
pub enum ClientError<E> {
    /// The transport failed.
    Transport(E),
    /// No complete response before the deadline.
    Timeout { method: String, waited_ms: u64 },
    /// Request could not be encoded or response is not JSON.
    Json(serde_json::Error),
    /// Response carries a missing or wrong `jsonrpc` field.
    InvalidVersion(Option<String>),
    /// The board answered with an error object.
    Rpc {
        code: i32,
        message: String,
        data: Option<String>,
    },
    /// Success response without a `result`.
    MissingResult,
}

impl<E> ClientError<E> {
    /// Category of an RPC error response, if this is one.
    pub fn rpc_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Rpc { code, .. } => Some(ErrorCode::from_code(*code)),
            _ => None,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for ClientError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e:?}"),
            Self::Timeout { method, waited_ms } => {
                write!(f, "no response to {method} after {waited_ms}ms")
            }
            Self::Json(e) => write!(f, "json: {e}"),
            Self::InvalidVersion(v) => write!(f, "invalid `jsonrpc` = {v:?}"),
            Self::Rpc {
                code,
                message,
                data,
            } => match data {
                Some(d) => write!(f, "error response {code}: {message} ({d})"),
                None => write!(f, "error response {code}: {message}"),
            },
            Self::MissingResult => write!(f, "missing `result`"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for ClientError<E> {}

// ── Wire types ───────────────────────────────────────────────

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: i32,
    method: &'a str,
    params: &'a [Value],
}

// ── Client ───────────────────────────────────────────────────

/// Sequential JSON-RPC client over a byte transport.
pub struct RpcClient<T: Transport> {
    transport: T,
    config: ClientConfig,
    next_id: i32,
}

impl<T: Transport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            next_id: 0,
        }
    }

    /// Wait for the board's greeting, if it sends one.
    ///
    /// Boards that reset when the port opens need the whole init timeout
    /// before they answer requests.
    pub fn init(&mut self) -> Result<Option<Value>, ClientError<T::Error>> {
        let timeout = Duration::from_millis(self.config.init_timeout_ms);
        match self.read_line(timeout)? {
            Some(line) => {
                let greeting = parse_response::<T::Error>(&line)?;
                info!("RPC client: board says {}", greeting);
                Ok(Some(greeting))
            }
            None => Ok(None),
        }
    }

    /// Send one request and wait for its result.
    ///
    /// Responses carrying another request's id (late replies to an earlier
    /// call that timed out) are skipped. An error response with id 0 is
    /// taken as the answer, since the board answers with id 0 when it could
    /// not read the request.
    pub fn send_request(
        &mut self,
        method: &str,
        params: &[Value],
    ) -> Result<Value, ClientError<T::Error>> {
        let id = self.next_id;
        let request = Request {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        };
        let mut bytes = serde_json::to_vec(&request).map_err(ClientError::Json)?;
        bytes.push(self.config.delimiter);
        self.next_id = self.next_id.wrapping_add(1);

        debug!("RPC client: tx {}", String::from_utf8_lossy(&bytes).trim_end());
        self.transport
            .write_bytes(&bytes)
            .map_err(ClientError::Transport)?;
        self.transport.flush().map_err(ClientError::Transport)?;

        let timeout_ms = self.config.read_timeout_ms;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(line) = self.read_line(remaining)? else {
                return Err(ClientError::Timeout {
                    method: method.to_owned(),
                    waited_ms: timeout_ms,
                });
            };

            let doc: Value = serde_json::from_slice(&line).map_err(ClientError::Json)?;
            if answers(&doc, id) {
                return response_result(doc);
            }
            warn!(
                "RPC client: skipping response with id {} while waiting for id {}",
                doc.get("id").map_or_else(|| "none".to_owned(), Value::to_string),
                id
            );
        }
    }

    /// Id the next request will carry.
    pub fn next_id(&self) -> i32 {
        self.next_id
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Read one non-empty delimited line, or `None` at the deadline.
    fn read_line(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, ClientError<T::Error>> {
        let deadline = Instant::now() + timeout;
        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let mut line = Vec::new();

        loop {
            while self.transport.available() {
                let byte = self.transport.read_byte().map_err(ClientError::Transport)?;
                if byte != self.config.delimiter {
                    line.push(byte);
                } else if !line.is_empty() {
                    debug!("RPC client: rx {}", String::from_utf8_lossy(&line));
                    return Ok(Some(line));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(poll);
        }
    }
}

/// Whether `doc` answers the request sent with `id`.
fn answers(doc: &Value, id: i32) -> bool {
    match doc.get("id").and_then(Value::as_i64) {
        Some(got) if got == i64::from(id) => true,
        Some(0) => doc.get("error").is_some_and(|e| !e.is_null()),
        _ => false,
    }
}

/// Validate a response line and extract its `result`.
pub fn parse_response<E>(line: &[u8]) -> Result<Value, ClientError<E>> {
    let doc: Value = serde_json::from_slice(line).map_err(ClientError::Json)?;
    response_result(doc)
}

fn response_result<E>(mut doc: Value) -> Result<Value, ClientError<E>> {
    match doc.get("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => {}
        other => {
            return Err(ClientError::InvalidVersion(other.map(Value::to_string)));
        }
    }

    if let Some(error) = doc.get("error").filter(|e| !e.is_null()) {
        return Err(ClientError::Rpc {
            code: error
                .get("code")
                .and_then(Value::as_i64)
                .and_then(|c| i32::try_from(c).ok())
                .unwrap_or(ErrorCode::UnknownError.code()),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            data: error.get("data").and_then(Value::as_str).map(str::to_owned),
        });
    }

    match doc.as_object_mut().and_then(|o| o.remove("result")) {
        None | Some(Value::Null) => Err(ClientError::MissingResult),
        Some(result) => Ok(result),
    }
}
