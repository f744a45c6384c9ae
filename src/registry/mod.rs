//! Service Registry Module
//!
//! Maps each `ServiceCategory` to the set of addresses currently believed alive.
//!
//! ## Guarantees
//! - **Set semantics**: an address appears at most once per category; re-registering is a no-op.
//! - **Atomic operations**: every operation runs under one lock, so concurrent handlers never
//!   observe a partially-updated set.
//! - **Uniform selection**: `lookup` draws an index uniformly over the membership at call time.

pub mod store;

pub use store::{Registry, Snapshot};
