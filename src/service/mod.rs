//! Demo Services Module
//!
//! Minimal workers that speak the mesh protocol: they register their socket with
//! a linker, answer liveness pings, and answer direct requests for their category.
//!
//! - **`handlers`**: per-category response logic (`LeetReply`, `TimeReply`).
//! - **`worker`**: the registration and serving loop shared by every service.

pub mod handlers;
pub mod worker;

pub use handlers::{LeetReply, ServiceHandler, TimeReply, handler_for};
pub use worker::ServiceNode;
