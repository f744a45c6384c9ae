//! Failure Detector
//!
//! A client's timeout only nominates a suspect; the linker decides. The decision
//! is a single application-level PING with a bounded wait: any reply means alive,
//! silence until the deadline means dead.

use crate::error::{MeshError, Result};
use crate::protocol::{Address, Envelope, MAX_DATAGRAM, Role};

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
}

#[derive(Debug, Clone)]
pub struct FailureDetector {
    timeout: Duration,
}

impl FailureDetector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one PING to `suspect` from a fresh ephemeral socket and waits for any reply.
    ///
    /// Errors only when the PING could not be sent at all (unresolvable host,
    /// bind or send failure); the caller should then leave the registry alone.
    pub async fn probe(&self, suspect: &Address) -> Result<Liveness> {
        let target = tokio::net::lookup_host(suspect.as_target())
            .await?
            .next()
            .ok_or_else(|| {
                MeshError::Transport(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} did not resolve", suspect),
                ))
            })?;

        let socket = UdpSocket::bind(unspecified_for(&target)).await?;
        let ping = Envelope::ping(Role::Linker).encode()?;
        socket.send_to(&ping, target).await?;

        debug!("Sent ping to suspect {} ({})", suspect, target);

        let mut buf = vec![0u8; MAX_DATAGRAM];
        let reply = tokio::time::timeout(self.timeout, async {
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((_, from)) => return from,
                    // ICMP errors surface here on some platforms; only a datagram counts
                    Err(e) => debug!("Probe socket error while waiting for {}: {}", suspect, e),
                }
            }
        })
        .await;

        match reply {
            Ok(from) => {
                debug!("Suspect {} answered from {}", suspect, from);
                Ok(Liveness::Alive)
            }
            Err(_) => Ok(Liveness::Dead),
        }
    }
}

fn unspecified_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}
