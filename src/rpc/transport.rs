//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations on a board are a UART or USB CDC serial port.
//! The in-memory transports below stand in for the wire on the host: one
//! for driving the engine from tests, one linked pair for running a board
//! and a host client side by side.
//!
//! The RPC engine is generic over `Transport`, so adding a new
//! transport requires zero changes to the RPC logic.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Open the channel at the given rate. Transports without a notion of
    /// baud rate keep the default no-op.
    fn begin(&mut self, _baudrate: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Check if a byte is ready to be read without blocking.
    fn available(&self) -> bool;

    /// Read one byte. Only called after `available()` returned `true`.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Write all of `data` to the transport.
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A null transport that discards all writes and never reads.
/// Useful as a default when nothing is attached to the port.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn available(&self) -> bool {
        false
    }

    fn read_byte(&mut self) -> Result<u8, ()> {
        Err(())
    }

    fn write_bytes(&mut self, _data: &[u8]) -> Result<(), ()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

// ── Simulated serial port ────────────────────────────────────

/// Simulated serial port: inbound bytes are queued by the test, outbound
/// bytes are captured for inspection.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    flushes: usize,
    baudrate: Option<u32>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport with `input` already waiting to be read.
    pub fn with_input(input: &[u8]) -> Self {
        let mut t = Self::new();
        t.push_input(input);
        t
    }

    /// Queue more inbound bytes.
    pub fn push_input(&mut self, input: &[u8]) {
        self.rx.extend(input.iter().copied());
    }

    /// Inbound bytes not yet consumed.
    pub fn pending_input(&self) -> usize {
        self.rx.len()
    }

    /// Everything written so far.
    pub fn output(&self) -> &[u8] {
        &self.tx
    }

    /// Drain the captured output.
    pub fn take_output(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Rate passed to `begin`, if it was called.
    pub fn baudrate(&self) -> Option<u32> {
        self.baudrate
    }
}

impl Transport for MemoryTransport {
    type Error = Infallible;

    fn begin(&mut self, baudrate: u32) -> Result<(), Infallible> {
        self.baudrate = Some(baudrate);
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, Infallible> {
        // Reading an empty port yields 0xFF, as a UART read with nothing
        // pending does on most boards.
        Ok(self.rx.pop_front().unwrap_or(0xFF))
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Infallible> {
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        self.flushes += 1;
        Ok(())
    }
}

// ── Linked pair ──────────────────────────────────────────────

type Pipe = Arc<Mutex<VecDeque<u8>>>;

/// One end of an in-memory, cross-connected serial link.
///
/// Bytes written on one end become readable on the other. Both ends are
/// `Send`, so a board engine and a host client can run on separate threads.
#[derive(Debug, Clone)]
pub struct LinkedTransport {
    rx: Pipe,
    tx: Pipe,
}

impl LinkedTransport {
    /// Create both ends of a link.
    pub fn pair() -> (Self, Self) {
        let a: Pipe = Arc::default();
        let b: Pipe = Arc::default();
        (
            Self {
                rx: Arc::clone(&a),
                tx: Arc::clone(&b),
            },
            Self { rx: b, tx: a },
        )
    }
}

impl Transport for LinkedTransport {
    type Error = Infallible;

    fn available(&self) -> bool {
        !self
            .rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, Infallible> {
        let mut rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rx.pop_front().unwrap_or(0xFF))
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Infallible> {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(data.iter().copied());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
