//! Wire Protocol Module
//!
//! Defines the value types shared by every mesh participant and the fixed-layout
//! datagram envelope they exchange over UDP.
//!
//! ## Envelope Layout
//! `[ kind: 1 byte ][ sender role: 1 byte ][ payload: remaining bytes ]`
//!
//! Payloads are either a single category ordinal, a serialized `Address`
//! (`[ host len ][ host bytes ][ port u16 BE ]`), a category followed by an
//! address, or empty (`Ping`/`Ack`).

pub mod codec;
pub mod types;

pub use codec::{DecodeError, EncodeError, Envelope, MAX_DATAGRAM};
pub use types::{Address, MessageKind, Role, ServiceCategory};

#[cfg(test)]
mod tests;
