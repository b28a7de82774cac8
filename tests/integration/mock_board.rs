//! Mock board handler for integration tests.
//!
//! Records every dispatched call so tests can assert on the full request
//! history, and implements a few methods covering each response shape.

use serial_jsonrpc::{
    ErrorCode, LinkError, MemoryTransport, ResponseEncoder, RpcEngine, RpcHandler, Transport,
    decode_byte_array,
};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub id: i32,
    pub method: String,
    pub params: Vec<String>,
}

// ── MockBoard ─────────────────────────────────────────────────

/// Methods:
/// - `echo`  → string result, params joined with `,`
/// - `bytes` → decodes `params[0]` as a byte array (capacity 8) and sends it back
/// - `sum`   → integer-array result `[sum]` of the integer params
/// - anything else → `MethodNotFound`
#[derive(Default)]
pub struct MockBoard {
    pub calls: Vec<Call>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_call(&self) -> Option<&Call> {
        self.calls.last()
    }
}

impl<T: Transport> RpcHandler<T> for MockBoard {
    fn handle(
        &mut self,
        id: i32,
        method: &str,
        params: &[String],
        responder: &mut ResponseEncoder<'_, T>,
    ) -> Result<(), LinkError<T::Error>> {
        self.calls.push(Call {
            id,
            method: method.to_owned(),
            params: params.to_vec(),
        });

        match method {
            "echo" => responder.send_string_result(id, &params.join(",")),
            "bytes" => {
                let Some(raw) = params.first() else {
                    return responder.send_error_code(id, ErrorCode::InvalidParams, Some("missing"));
                };
                let mut buf = [0u8; 8];
                match decode_byte_array(raw.as_bytes(), &mut buf) {
                    Ok(n) => responder.send_byte_array_result(id, &buf[..n]),
                    Err(e) => {
                        let detail = e.to_string();
                        responder.send_error_code(id, ErrorCode::InvalidParams, Some(detail.as_str()))
                    }
                }
            }
            "sum" => {
                let parsed: Result<Vec<i32>, _> = params.iter().map(|p| p.parse::<i32>()).collect();
                match parsed {
                    Ok(values) => {
                        let total: i32 = values.iter().sum();
                        responder.send_integer_array_result(id, &[total])
                    }
                    Err(_) => responder.send_error_code(id, ErrorCode::InvalidParams, None),
                }
            }
            _ => responder.send_error_code(id, ErrorCode::MethodNotFound, Some(method)),
        }
    }
}

/// Engine with a reference-sized buffer over a simulated port.
pub type BoardEngine = RpcEngine<MemoryTransport, MockBoard>;

pub fn board(input: &[u8]) -> BoardEngine {
    RpcEngine::new(MemoryTransport::with_input(input), MockBoard::new())
}

/// Responses written so far, one per line, delimiter stripped.
pub fn responses(engine: &mut BoardEngine) -> Vec<serde_json::Value> {
    let out = engine.transport_mut().take_output();
    out.split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_slice(line).expect("response is valid JSON"))
        .collect()
}
