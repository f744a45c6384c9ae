//! Linker Node Module
//!
//! A linker is a rendezvous node: services register with it, clients ask it for a
//! service address, and clients tell it when an address stops answering.
//!
//! ## Message Handling
//! - **REGISTER_SERVICE**: record the packet's source under the category, reply ACK.
//! - **REGISTER_SERVICE_FROM_LINKER**: record the relayed address, no reply.
//! - **REQUEST_SERVICE**: reply RESPONSE with a random address; stay silent if none.
//! - **SERVICE_DOWN**: reply ACK at once, then probe the suspect in a separate task.
//! - **REMOVE_SERVICE**: drop the address locally; never re-propagated.
//! - **PING**: reply ACK.
//!
//! ## Submodules
//! - **`detector`**: single-PING failure detector with a bounded timeout.
//! - **`propagation`**: one-hop removal broadcast to peer linkers.
//! - **`peers`**: static, ordered peer list loaded at startup.
//! - **`config`**: TOML-backed node tunables.
//! - **`handlers`**: optional HTTP diagnostics.

pub mod config;
pub mod detector;
pub mod handlers;
pub mod peers;
pub mod propagation;
pub mod service;

pub use config::LinkerConfig;
pub use peers::PeerSet;
pub use service::{LinkerNode, Verdict};
