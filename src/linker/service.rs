use super::config::LinkerConfig;
use super::detector::{FailureDetector, Liveness};
use super::peers::PeerSet;
use super::propagation::Propagator;
use crate::error::{MeshError, Result};
use crate::protocol::{Address, DecodeError, Envelope, MessageKind, Role};
use crate::registry::Registry;

use dashmap::DashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Outcome of confirming a suspect reported by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The suspect answered the probe; nothing changed.
    Alive,
    /// The suspect stayed silent; it was removed locally and announced to `propagated` peers.
    Dead { propagated: usize },
    /// The probe could not be sent; nothing changed.
    Abandoned,
}

/// A rendezvous node: owns the registry and answers every inbound datagram on one socket.
pub struct LinkerNode {
    pub local_addr: Address,
    registry: Arc<Registry>,
    socket: Arc<UdpSocket>,
    detector: FailureDetector,
    propagator: Propagator,
    probing: DashSet<Address>,
    config: LinkerConfig,
}

impl LinkerNode {
    /// Binds all interfaces on `local.port`. `local` is also this node's identity in `peers`.
    pub async fn bind(local: Address, peers: PeerSet, config: LinkerConfig) -> Result<Arc<Self>> {
        let ip: IpAddr = match local.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => Ipv6Addr::UNSPECIFIED.into(),
            _ => Ipv4Addr::UNSPECIFIED.into(),
        };

        let socket = UdpSocket::bind(SocketAddr::new(ip, local.port)).await?;
        info!("Linker bound to {} as {}", socket.local_addr()?, local);

        Ok(Self::with_socket(socket, local, peers, config))
    }

    pub fn with_socket(
        socket: UdpSocket,
        local: Address,
        peers: PeerSet,
        config: LinkerConfig,
    ) -> Arc<Self> {
        if !peers.iter().any(|peer| *peer == local) {
            warn!("Local address {} is not in the peer list", local);
        }

        Arc::new(Self {
            detector: FailureDetector::new(config.probe_timeout()),
            propagator: Propagator::new(local.clone(), peers),
            local_addr: local,
            registry: Arc::new(Registry::new()),
            socket: Arc::new(socket),
            probing: DashSet::new(),
            config,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Spawns the receive loop (and the stats reporter, if enabled).
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        if let Some(period) = self.config.stats_interval() {
            let node = self.clone();
            tokio::spawn(async move {
                node.stats_loop(period).await;
            });
        }

        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Listens until the process stops. Bad datagrams are logged and dropped.
    pub async fn run(self: Arc<Self>) {
        info!(
            "Listening for new messages on {}...",
            self.socket
                .local_addr()
                .map_or_else(|_| self.local_addr.to_string(), |a| a.to_string())
        );

        let mut buf = vec![0u8; self.config.max_datagram];

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, src)) => match Envelope::decode(&buf[..len]) {
                    Ok(envelope) => {
                        if let Err(e) = self.handle_message(envelope, src).await {
                            warn!("Error handling message from {}: {}", src, e);
                        }
                    }
                    Err(DecodeError::UnknownKind(kind)) => {
                        warn!("Got an unknown message kind {} from {}", kind, src);
                    }
                    Err(e) => {
                        warn!("Message from {} could not be decoded: {}", src, e);
                    }
                },
                Err(e) => {
                    error!("Failed to receive UDP packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    async fn handle_message(self: &Arc<Self>, envelope: Envelope, src: SocketAddr) -> Result<()> {
        debug!(
            "New {:?} message from {:?} at {}",
            envelope.kind, envelope.sender, src
        );

        match envelope.kind {
            MessageKind::RegisterService => {
                let category = envelope.payload_category()?;
                self.registry.register(category, Address::from(src)).await;
                self.reply(&Envelope::ack(Role::Linker), src).await?;
            }

            MessageKind::RegisterServiceFromLinker => {
                let (category, address) = envelope.payload_category_and_address()?;
                self.registry.register(category, address).await;
            }

            MessageKind::RequestService => {
                let category = envelope.payload_category()?;
                match self.registry.lookup(category).await {
                    Ok(address) => {
                        debug!("Sending {} service {} to {}", category, address, src);
                        self.reply(&Envelope::response_address(&address)?, src)
                            .await?;
                    }
                    Err(MeshError::NoServiceAvailable(_)) => {
                        debug!("No {} service available for {}; not replying", category, src);
                    }
                    Err(e) => return Err(e),
                }
            }

            MessageKind::ServiceDown => {
                // ACK means "report accepted": only for a decodable suspect, before probing
                let suspect = envelope.payload_address()?;
                self.reply(&Envelope::ack(Role::Linker), src).await?;

                info!("{} reported {} as not responding", src, suspect);
                self.spawn_probe(suspect);
            }

            MessageKind::RemoveService => {
                let dead = envelope.payload_address()?;
                info!("Linker {} reported {} dead", src, dead);
                self.registry.remove(&dead).await;
            }

            MessageKind::Ping => {
                self.reply(&Envelope::ack(Role::Linker), src).await?;
            }

            MessageKind::Ack | MessageKind::Response => {
                debug!("Discarding unexpected {:?} from {}", envelope.kind, src);
            }
        }

        Ok(())
    }

    async fn reply(&self, envelope: &Envelope, to: SocketAddr) -> Result<()> {
        let encoded = envelope.encode()?;
        self.socket.send_to(&encoded, to).await?;
        Ok(())
    }

    /// Runs `confirm_suspect` as its own task; at most one probe per suspect at a time.
    fn spawn_probe(self: &Arc<Self>, suspect: Address) {
        if !self.probing.insert(suspect.clone()) {
            debug!("Probe for {} already in flight", suspect);
            return;
        }

        let node = self.clone();
        tokio::spawn(async move {
            node.confirm_suspect(&suspect).await;
            node.probing.remove(&suspect);
        });
    }

    /// Probes `suspect`; on silence removes it locally and warns the other linkers.
    pub async fn confirm_suspect(&self, suspect: &Address) -> Verdict {
        match self.detector.probe(suspect).await {
            Ok(Liveness::Alive) => {
                info!("{} answered the probe; keeping it", suspect);
                Verdict::Alive
            }
            Ok(Liveness::Dead) => {
                info!(
                    "{} did not answer within {:?}; service is down",
                    suspect,
                    self.detector.timeout()
                );
                self.registry.remove(suspect).await;

                match self
                    .propagator
                    .broadcast_removal(&self.socket, suspect)
                    .await
                {
                    Ok(propagated) => Verdict::Dead { propagated },
                    Err(e) => {
                        warn!("Could not propagate removal of {}: {}", suspect, e);
                        Verdict::Dead { propagated: 0 }
                    }
                }
            }
            Err(e) => {
                warn!("Abandoning probe of {}: {}", suspect, e);
                Verdict::Abandoned
            }
        }
    }

    async fn stats_loop(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;

            let snapshot = self.registry.snapshot().await;
            let total: usize = snapshot.values().map(|set| set.len()).sum();
            info!("Registry stats: {} service(s) registered", total);
            for (category, addresses) in snapshot {
                debug!("  - {}: {} address(es)", category, addresses.len());
            }
        }
    }
}
