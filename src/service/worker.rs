use super::handlers::ServiceHandler;
use crate::error::{MeshError, Result};
use crate::protocol::{Address, Envelope, MAX_DATAGRAM, MessageKind, Role};

use rand::seq::SliceRandom;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(1);

/// A worker process: registers its socket with one linker, then answers requests on it.
pub struct ServiceNode {
    socket: UdpSocket,
    handler: Box<dyn ServiceHandler>,
    linkers: Vec<Address>,
    registration_timeout: Duration,
}

impl ServiceNode {
    pub async fn bind(
        addr: SocketAddr,
        handler: Box<dyn ServiceHandler>,
        linkers: Vec<Address>,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;

        Ok(Self {
            socket,
            handler,
            linkers,
            registration_timeout: DEFAULT_REGISTRATION_TIMEOUT,
        })
    }

    pub fn with_registration_timeout(mut self, timeout: Duration) -> Self {
        self.registration_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Registers with a random linker, falling back to the others in random order.
    ///
    /// Sent from the serving socket, so the linker records the address clients must use.
    /// Returns the linker that acknowledged.
    pub async fn register(&self) -> Result<Address> {
        let mut candidates = self.linkers.clone();
        candidates.shuffle(&mut rand::thread_rng());

        let request = Envelope::register(self.handler.category()).encode()?;
        let mut buf = vec![0u8; MAX_DATAGRAM];

        for linker in candidates {
            if let Err(e) = self.socket.send_to(&request, linker.as_target()).await {
                warn!("Failed to send registration to {}: {}", linker, e);
                continue;
            }

            let acked = tokio::time::timeout(self.registration_timeout, async {
                loop {
                    let Ok((len, _)) = self.socket.recv_from(&mut buf).await else {
                        continue;
                    };
                    if let Ok(envelope) = Envelope::decode(&buf[..len])
                        && envelope.kind == MessageKind::Ack
                        && envelope.sender == Role::Linker
                    {
                        return;
                    }
                }
            })
            .await;

            match acked {
                Ok(()) => {
                    info!(
                        "Registered {} service with linker {}",
                        self.handler.category(),
                        linker
                    );
                    return Ok(linker);
                }
                Err(_) => warn!("Linker {} did not acknowledge registration", linker),
            }
        }

        Err(MeshError::Timeout)
    }

    /// Answers PING with ACK and REQUEST_SERVICE with the handler's response, forever.
    pub async fn serve(&self) {
        info!(
            "{} service listening for new messages...",
            self.handler.category()
        );

        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let (len, src) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    warn!("Failed to receive UDP packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            };

            let envelope = match Envelope::decode(&buf[..len]) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!("Message from {} could not be decoded: {}", src, e);
                    continue;
                }
            };

            if let Err(e) = self.handle_message(envelope, src).await {
                warn!("Error handling message from {}: {}", src, e);
            }
        }
    }

    pub async fn run(self) -> Result<()> {
        self.register().await?;
        self.serve().await;
        Ok(())
    }

    async fn handle_message(&self, envelope: Envelope, src: SocketAddr) -> Result<()> {
        match envelope.kind {
            MessageKind::Ping => {
                debug!("Ping from {}", src);
                let ack = Envelope::ack(Role::Service).encode()?;
                self.socket.send_to(&ack, src).await?;
            }

            MessageKind::RequestService => {
                let category = envelope.payload_category()?;
                if category != self.handler.category() {
                    warn!("{} asked a {} service for {}", src, self.handler.category(), category);
                    return Ok(());
                }

                let body = self.handler.respond(envelope.payload_body());
                let response = Envelope::response_body(body).encode()?;
                self.socket.send_to(&response, src).await?;
                debug!("Answered {} request from {}", category, src);
            }

            other => debug!("Discarding unexpected {:?} from {}", other, src),
        }

        Ok(())
    }
}
