use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Network location of any mesh participant (linker, service or client).
///
/// Equality and hashing are by value, which is what deduplicates registrations.
/// The host is kept as text so that peer files may name hosts as well as IPs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Target usable with `UdpSocket::send_to` and `lookup_host`.
    pub fn as_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Self {
            host: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Address {
    type Err = String;

    /// Parses `host:port`, with optional brackets around IPv6 hosts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("missing port in '{}'", s))?;

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(format!("missing host in '{}'", s));
        }

        let port = port
            .parse::<u16>()
            .map_err(|e| format!("invalid port in '{}': {}", s, e))?;

        Ok(Self::new(host, port))
    }
}

/// The kind of work a service performs. Wire-encoded as its ordinal.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    Reply,
    Time,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 2] = [ServiceCategory::Reply, ServiceCategory::Time];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCategory::Reply => write!(f, "REPLY"),
            ServiceCategory::Time => write!(f, "TIME"),
        }
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reply" => Ok(ServiceCategory::Reply),
            "time" => Ok(ServiceCategory::Time),
            other => Err(format!("unknown service category '{}'", other)),
        }
    }
}

/// Who sent an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Service,
    Linker,
}

impl Role {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Role::Client),
            1 => Some(Role::Service),
            2 => Some(Role::Linker),
            _ => None,
        }
    }
}

/// Message kinds understood by linkers and services.
///
/// - `RegisterService` / `RegisterServiceFromLinker`: add an address to the registry.
/// - `RequestService` / `Response`: resolve a category (or call a service directly).
/// - `ServiceDown`: a client nominates a suspect address.
/// - `RemoveService`: a peer linker confirmed an address dead.
/// - `Ping` / `Ack`: liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    RegisterService,
    RequestService,
    ServiceDown,
    RemoveService,
    Ping,
    Ack,
    Response,
    RegisterServiceFromLinker,
}

impl MessageKind {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(byte: u8) -> Option<Self> {
        use MessageKind::*;

        match byte {
            0 => Some(RegisterService),
            1 => Some(RequestService),
            2 => Some(ServiceDown),
            3 => Some(RemoveService),
            4 => Some(Ping),
            5 => Some(Ack),
            6 => Some(Response),
            7 => Some(RegisterServiceFromLinker),
            _ => None,
        }
    }
}
