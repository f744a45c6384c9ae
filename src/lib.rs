//! Linker Mesh Library
//!
//! A lightweight service-discovery mesh over UDP. A handful of rendezvous nodes
//! ("linkers") let short-lived worker processes advertise their address under a
//! service category, and let clients resolve a category to a concrete address.
//!
//! ## Architecture Modules
//! - **`protocol`**: Address and category value types plus the fixed-layout datagram envelope.
//! - **`registry`**: Category-to-addresses map with uniform random lookup.
//! - **`linker`**: The linker node: dispatch loop, failure detector, and one-hop removal
//!   propagation to the statically configured peer linkers.
//! - **`service`**: Demo workers that register with a linker and answer requests.
//! - **`client`**: Resolves categories, calls services, and reports unresponsive ones.
//!
//! Consistency between linkers is eventual and best-effort: only removals are gossiped,
//! and only one hop deep.

pub mod client;
pub mod error;
pub mod linker;
pub mod protocol;
pub mod registry;
pub mod service;

pub use error::{MeshError, Result};
