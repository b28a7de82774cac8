//! Delimiter frame codec.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────────┬────┐
//! │ JSON document (N B, N ≤ cap) │ \n │
//! └──────────────────────────────┴────┘
//! ```
//!
//! The accumulator takes bytes one at a time into a fixed-capacity
//! buffer and reports when a delimiter completes a message. It never
//! allocates: an oversized message is reported once as an overflow and
//! the rest of its line is discarded.
//!
//! ```text
//!   IDLE ──byte──▶ ACCUMULATING ──delimiter──▶ MESSAGE_READY ──reset──▶ IDLE
//!                       │
//!                       └──byte at capacity──▶ OVERFLOW ──delimiter──▶ IDLE
//!                                               (bytes dropped)
//! ```

use heapless::Vec;

/// Result of pushing one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    /// Byte stored, message still in progress.
    Buffered,
    /// Delimiter seen; [`LineAccumulator::message`] holds the message
    /// until the next [`LineAccumulator::reset`].
    Complete,
    /// Buffer was full before a delimiter arrived. The offending byte is
    /// dropped and the buffer has already been cleared.
    Overflow,
    /// Byte belongs to an overflowed message and was dropped. The
    /// delimiter ending that message also reports `Dropped`.
    Dropped,
}

/// Fixed-capacity line accumulator.
pub struct LineAccumulator<const N: usize> {
    buf: Vec<u8, N>,
    discarding: bool,
}

impl<const N: usize> LineAccumulator<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
        }
    }

    /// Push one byte from the transport.
    ///
    /// The delimiter is checked before the capacity, so a message of
    /// exactly `N` bytes followed by the delimiter is accepted. After an
    /// overflow nothing is buffered until the next delimiter.
    pub fn push(&mut self, byte: u8, delimiter: u8) -> Push {
        if self.discarding {
            if byte == delimiter {
                self.discarding = false;
            }
            return Push::Dropped;
        }

        if byte == delimiter {
            return Push::Complete;
        }

        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.discarding = true;
            return Push::Overflow;
        }

        Push::Buffered
    }

    /// Bytes accumulated since the last reset, delimiter excluded.
    pub fn message(&self) -> &[u8] {
        &self.buf
    }

    /// Write cursor, always `<= capacity()`.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// True while skipping the remainder of an overflowed message.
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Return to the idle state (e.g. after a message has been handled).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}

impl<const N: usize> Default for LineAccumulator<N> {
    fn default() -> Self {
        Self::new()
    }
}
