//! Error Taxonomy
//!
//! Registry mutation never fails; only lookups, the codec and the transport
//! have reportable error conditions. Probe timeouts are not errors at all:
//! they are the failure detector's normal "dead" outcome.

use crate::protocol::{DecodeError, EncodeError, ServiceCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("malformed envelope: {0}")]
    Decode(#[from] DecodeError),

    #[error("cannot encode envelope: {0}")]
    Encode(#[from] EncodeError),

    #[error("no service available for category {0}")]
    NoServiceAvailable(ServiceCategory),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("timed out waiting for a reply")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, MeshError>;
