//! Removal propagation: one-hop, fire-and-forget REMOVE_SERVICE to every peer.
//!
//! Receivers never re-propagate, and `Registry::remove` is idempotent, so
//! duplicate or lost notices only delay convergence.

use super::peers::PeerSet;
use crate::error::Result;
use crate::protocol::{Address, Envelope};

use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Propagator {
    local: Address,
    peers: PeerSet,
}

impl Propagator {
    pub fn new(local: Address, peers: PeerSet) -> Self {
        Self { local, peers }
    }

    /// Tells every peer except this node that `dead` is gone.
    ///
    /// Returns how many peers the notice was handed to; send failures are logged and skipped.
    pub async fn broadcast_removal(&self, socket: &UdpSocket, dead: &Address) -> Result<usize> {
        let encoded = Envelope::remove_service(dead)?.encode()?;

        let mut sent = 0;
        for peer in self.peers.others(&self.local) {
            match socket.send_to(&encoded, peer.as_target()).await {
                Ok(_) => {
                    debug!("Sent REMOVE_SERVICE({}) to {}", dead, peer);
                    sent += 1;
                }
                Err(e) => warn!("Failed to warn linker {} about {}: {}", peer, dead, e),
            }
        }

        info!("Propagated removal of {} to {} peer linker(s)", dead, sent);
        Ok(sent)
    }
}
