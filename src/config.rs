//! Link configuration parameters
//!
//! The only tunables of the serial link: receive capacity (a const generic
//! on the engine), baud rate and message delimiter on the board side, and
//! the read timeouts used by the host client.

use serde::{Deserialize, Serialize};

/// Receive buffer capacity in bytes.
///
/// Balances message size against board RAM; fits an UNO-class board.
pub const DEFAULT_BUFFER_SIZE: usize = 350;

/// Default serial baud rate.
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// `\n` works with both the host client and plain serial monitors.
pub const DEFAULT_DELIMITER: u8 = b'\n';

/// Board-side link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Transport rate handed to [`Transport::begin`](crate::rpc::transport::Transport::begin)
    pub baudrate: u32,
    /// Byte terminating every inbound and outbound message
    pub delimiter: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Host-side client configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// How long to wait for the board's greeting after opening the link.
    /// Boards that reset on connect need the full boot time here.
    pub init_timeout_ms: u64,
    /// How long to wait for the response to a single request
    pub read_timeout_ms: u64,
    /// Sleep between polls of an idle transport
    pub poll_interval_ms: u64,
    /// Delimiter expected on responses and appended to requests
    pub delimiter: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: 3000,
            read_timeout_ms: 2000,
            poll_interval_ms: 50,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}
