//! RPC engine: drains the transport and dispatches requests to a handler.
//!
//! The engine owns the transport, the receive buffer and the handler.
//! Each call to [`RpcEngine::feed_available_bytes`] reads whatever the
//! transport has ready without blocking, and stops after at most one
//! complete message:
//!
//! 1. **Framing**: bytes accumulate until the delimiter; an oversized
//!    message is answered with `InvalidRequest` and dropped.
//! 2. **Envelope check**: parse and validate; rejects are answered with
//!    the matching error response.
//! 3. **Dispatch**: the handler runs synchronously with a
//!    [`ResponseEncoder`] on the same transport and is responsible for its
//!    own reply, including `MethodNotFound` / `InvalidParams` errors.

use log::{debug, info, warn};

use super::codec::{LineAccumulator, Push};
use super::request::parse_request;
use super::response::ResponseEncoder;
use super::transport::Transport;
use crate::config::{DEFAULT_BUFFER_SIZE, LinkConfig};
use crate::error::{ErrorCode, LinkError};

/// `data` of the error sent when a message outgrows the receive buffer.
pub const MESSAGE_TOO_LARGE: &str = "message too large";

/// Device-side request handler.
///
/// Invoked once per valid request. Replies go through `responder`; a
/// handler that does not reply leaves the host waiting.
pub trait RpcHandler<T: Transport> {
    fn handle(
        &mut self,
        id: i32,
        method: &str,
        params: &[String],
        responder: &mut ResponseEncoder<'_, T>,
    ) -> Result<(), LinkError<T::Error>>;
}

/// Closure adapter returned by [`handler_fn`].
pub struct FnHandler<F>(F);

/// Use a closure as an [`RpcHandler`].
pub fn handler_fn<T, F>(f: F) -> FnHandler<F>
where
    T: Transport,
    F: FnMut(i32, &str, &[String], &mut ResponseEncoder<'_, T>) -> Result<(), LinkError<T::Error>>,
{
    FnHandler(f)
}

impl<T, F> RpcHandler<T> for FnHandler<F>
where
    T: Transport,
    F: FnMut(i32, &str, &[String], &mut ResponseEncoder<'_, T>) -> Result<(), LinkError<T::Error>>,
{
    fn handle(
        &mut self,
        id: i32,
        method: &str,
        params: &[String],
        responder: &mut ResponseEncoder<'_, T>,
    ) -> Result<(), LinkError<T::Error>> {
        (self.0)(id, method, params, responder)
    }
}

/// What a single [`RpcEngine::feed_available_bytes`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// No bytes were ready and nothing is buffered.
    Idle,
    /// A message is in progress (or being discarded after an overflow)
    /// and its delimiter has not arrived yet.
    Pending,
    /// A request reached the handler.
    Dispatched,
    /// A message was answered with an error response by the engine.
    Rejected(ErrorCode),
    /// The receive buffer overflowed; an error response was sent.
    Overflow,
}

/// Serial JSON-RPC engine with an `N`-byte receive buffer.
pub struct RpcEngine<T: Transport, H: RpcHandler<T>, const N: usize = DEFAULT_BUFFER_SIZE> {
    transport: T,
    handler: H,
    accumulator: LineAccumulator<N>,
    config: LinkConfig,
}

impl<T: Transport, H: RpcHandler<T>, const N: usize> RpcEngine<T, H, N> {
    pub fn new(transport: T, handler: H) -> Self {
        Self::with_config(transport, handler, LinkConfig::default())
    }

    pub fn with_config(transport: T, handler: H, config: LinkConfig) -> Self {
        Self {
            transport,
            handler,
            accumulator: LineAccumulator::new(),
            config,
        }
    }

    /// Open the transport at the configured baud rate.
    pub fn init(&mut self) -> Result<(), LinkError<T::Error>> {
        self.transport
            .begin(self.config.baudrate)
            .map_err(LinkError::Transport)?;
        info!(
            "RPC: link up at {} baud, {} byte receive buffer",
            self.config.baudrate, N
        );
        Ok(())
    }

    /// Drain the bytes the transport has ready, handling at most one
    /// complete message. Never blocks.
    pub fn feed_available_bytes(&mut self) -> Result<FeedOutcome, LinkError<T::Error>> {
        while self.transport.available() {
            let byte = self.transport.read_byte().map_err(LinkError::Transport)?;

            match self.accumulator.push(byte, self.config.delimiter) {
                Push::Buffered | Push::Dropped => {}
                Push::Complete => {
                    let outcome = self.process_message();
                    self.accumulator.reset();
                    return outcome;
                }
                Push::Overflow => {
                    warn!("RPC: message exceeds {} byte buffer, discarding to end of line", N);
                    self.responder().send_error_code(
                        0,
                        ErrorCode::InvalidRequest,
                        Some(MESSAGE_TOO_LARGE),
                    )?;
                    return Ok(FeedOutcome::Overflow);
                }
            }
        }

        Ok(if self.accumulator.is_empty() && !self.accumulator.is_discarding() {
            FeedOutcome::Idle
        } else {
            FeedOutcome::Pending
        })
    }

    fn process_message(&mut self) -> Result<FeedOutcome, LinkError<T::Error>> {
        let mut responder = ResponseEncoder::new(&mut self.transport, self.config.delimiter);

        match parse_request(self.accumulator.message()) {
            Ok(request) => {
                debug!(
                    "RPC: dispatch id={} method={:?} params={}",
                    request.id,
                    request.method,
                    request.params.len()
                );
                self.handler
                    .handle(request.id, &request.method, &request.params, &mut responder)?;
                Ok(FeedOutcome::Dispatched)
            }
            Err(rejection) => {
                warn!("RPC: {}", rejection);
                responder.send_error_code(rejection.id, rejection.code, Some(rejection.data.as_str()))?;
                Ok(FeedOutcome::Rejected(rejection.code))
            }
        }
    }

    /// Encoder for replies sent outside a handler call (e.g. a boot
    /// greeting).
    pub fn responder(&mut self) -> ResponseEncoder<'_, T> {
        ResponseEncoder::new(&mut self.transport, self.config.delimiter)
    }

    /// Bytes buffered towards the next message.
    pub fn buffered(&self) -> usize {
        self.accumulator.position()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_parts(self) -> (T, H) {
        (self.transport, self.handler)
    }
}

// ── Tests ────────────────────────────────────────────────────
