//! Serial JSON-RPC library.
//!
//! Line-delimited JSON-RPC 2.0 for boards with a couple of kilobytes of
//! RAM: a fixed-capacity receive buffer, string parameters for the
//! handler, and responses sized before they are built. The host-side
//! client shares the same wire types.

#![deny(unused_must_use)]

pub mod config;
pub mod error;
pub mod rpc;

pub use config::{ClientConfig, LinkConfig};
pub use error::{DecodeError, ErrorCode, LinkError, Rejection};
pub use rpc::client::{ClientError, RpcClient};
pub use rpc::engine::{FeedOutcome, RpcEngine, RpcHandler, handler_fn};
pub use rpc::response::{ResponseEncoder, decode_byte_array};
pub use rpc::transport::{LinkedTransport, MemoryTransport, NullTransport, Transport};
