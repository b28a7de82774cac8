//! Line-delimited JSON-RPC 2.0 over a byte stream.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      RPC Stack                             │
//! │                                                            │
//! │  ┌───────────┐   ┌───────────┐   ┌──────────┐   ┌───────┐ │
//! │  │ Transport │──▶│   Codec   │──▶│ Request  │──▶│Handler│ │
//! │  │ (trait)   │   │ (framing) │   │ (parse)  │   │ (user)│ │
//! │  └───────────┘   └───────────┘   └──────────┘   └───────┘ │
//! │       ▲                                             │      │
//! │       │             ┌───────────────────────────────┘      │
//! │       │             ▼                                      │
//! │  ┌───────────┐   ┌───────────┐                             │
//! │  │ Transport │◀──│ Response  │   (bounded, one per call)   │
//! │  │ (write)   │   │ (encoder) │                             │
//! │  └───────────┘   └───────────┘                             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`engine::RpcEngine`] wires the board side together; [`client::RpcClient`]
//! is the host side of the same link.

pub mod client;
pub mod codec;
pub mod engine;
pub mod request;
pub mod response;
pub mod transport;
