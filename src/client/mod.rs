//! Mesh Client Module
//!
//! The client side of discovery: ask any linker for a category, talk to the
//! returned service directly, and nominate it as a suspect when it goes quiet.
//! The client never decides that a service is dead; the linker does.

use crate::error::{MeshError, Result};
use crate::protocol::{Address, Envelope, MAX_DATAGRAM, MessageKind, ServiceCategory};

use rand::seq::SliceRandom;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// One request in flight at a time; methods take `&mut self` so replies cannot be stolen.
pub struct LinkerClient {
    socket: UdpSocket,
    linkers: Vec<Address>,
    request_timeout: Duration,
    max_attempts: usize,
}

impl LinkerClient {
    pub async fn bind(addr: SocketAddr, linkers: Vec<Address>) -> Result<Self> {
        if linkers.is_empty() {
            return Err(MeshError::Config("client needs at least one linker".to_string()));
        }

        Ok(Self {
            socket: UdpSocket::bind(addr).await?,
            linkers,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Asks a random linker for an address serving `category`.
    pub async fn resolve(&mut self, category: ServiceCategory) -> Result<Address> {
        let linker = self.pick_linker();
        self.send(&Envelope::request(category), &linker).await?;

        match self.wait_for(MessageKind::Response).await {
            Ok(envelope) => {
                let address = envelope.payload_address()?;
                debug!("Linker {} resolved {} to {}", linker, category, address);
                Ok(address)
            }
            Err(MeshError::Timeout) => Err(MeshError::NoServiceAvailable(category)),
            Err(e) => Err(e),
        }
    }

    /// Nominates `suspect` to a random linker and waits for its acknowledgement.
    pub async fn report_down(&mut self, suspect: &Address) -> Result<()> {
        let linker = self.pick_linker();
        self.send(&Envelope::service_down(suspect)?, &linker).await?;
        self.wait_for(MessageKind::Ack).await?;

        info!("Reported {} as not responding to linker {}", suspect, linker);
        Ok(())
    }

    /// Resolves `category` and sends `body` to the chosen service.
    ///
    /// A silent service is reported down and the call retried with a fresh resolution.
    pub async fn call(&mut self, category: ServiceCategory, body: &[u8]) -> Result<Vec<u8>> {
        let request = Envelope::request_with_body(category, body);

        for attempt in 1..=self.max_attempts {
            let service = self.resolve(category).await?;
            self.send(&request, &service).await?;

            match self.wait_for(MessageKind::Response).await {
                Ok(envelope) => return Ok(envelope.payload),
                Err(MeshError::Timeout) => {
                    warn!(
                        "{} service {} did not answer (attempt {}/{})",
                        category, service, attempt, self.max_attempts
                    );
                    if let Err(e) = self.report_down(&service).await {
                        warn!("Could not report {} down: {}", service, e);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(MeshError::NoServiceAvailable(category))
    }

    fn pick_linker(&self) -> Address {
        self.linkers
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| self.linkers[0].clone())
    }

    async fn send(&self, envelope: &Envelope, to: &Address) -> Result<()> {
        let encoded = envelope.encode()?;
        self.socket.send_to(&encoded, to.as_target()).await?;
        Ok(())
    }

    /// Waits for the first decodable envelope of `kind`; anything else is skipped.
    async fn wait_for(&self, kind: MessageKind) -> Result<Envelope> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        let received = tokio::time::timeout(self.request_timeout, async {
            loop {
                let (len, src) = match self.socket.recv_from(&mut buf).await {
                    Ok(received) => received,
                    Err(e) => return Err(MeshError::from(e)),
                };
                match Envelope::decode(&buf[..len]) {
                    Ok(envelope) if envelope.kind == kind => return Ok(envelope),
                    Ok(envelope) => debug!("Skipping {:?} from {}", envelope.kind, src),
                    Err(e) => debug!("Skipping undecodable datagram from {}: {}", src, e),
                }
            }
        })
        .await;

        match received {
            Ok(result) => result,
            Err(_) => Err(MeshError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests;
