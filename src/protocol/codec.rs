use super::types::{Address, MessageKind, Role, ServiceCategory};
use thiserror::Error;

/// Largest datagram any participant sends or expects to receive.
pub const MAX_DATAGRAM: usize = 1024;

const HEADER_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated datagram: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("unknown message kind {0}")]
    UnknownKind(u8),

    #[error("unknown sender role {0}")]
    UnknownRole(u8),

    #[error("unknown service category {0}")]
    UnknownCategory(u8),

    #[error("address host is not valid UTF-8")]
    InvalidHost,

    #[error("{0} unexpected trailing bytes after address")]
    TrailingBytes(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("host '{0}' is longer than 255 bytes")]
    HostTooLong(String),

    #[error("envelope of {0} bytes exceeds the {MAX_DATAGRAM}-byte datagram limit")]
    Oversized(usize),
}

/// A decoded datagram: what it is, who sent it, and its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub kind: MessageKind,
    pub sender: Role,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(kind: MessageKind, sender: Role, payload: Vec<u8>) -> Self {
        Self {
            kind,
            sender,
            payload,
        }
    }

    pub fn register(category: ServiceCategory) -> Self {
        Self::new(
            MessageKind::RegisterService,
            Role::Service,
            vec![category.ordinal()],
        )
    }

    pub fn register_from_linker(
        category: ServiceCategory,
        address: &Address,
    ) -> Result<Self, EncodeError> {
        let mut payload = vec![category.ordinal()];
        encode_address(address, &mut payload)?;
        Ok(Self::new(
            MessageKind::RegisterServiceFromLinker,
            Role::Linker,
            payload,
        ))
    }

    pub fn request(category: ServiceCategory) -> Self {
        Self::new(
            MessageKind::RequestService,
            Role::Client,
            vec![category.ordinal()],
        )
    }

    /// A request addressed straight to a service, carrying a body after the category.
    pub fn request_with_body(category: ServiceCategory, body: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(1 + body.len());
        payload.push(category.ordinal());
        payload.extend_from_slice(body);
        Self::new(MessageKind::RequestService, Role::Client, payload)
    }

    pub fn response_address(address: &Address) -> Result<Self, EncodeError> {
        Ok(Self::new(
            MessageKind::Response,
            Role::Linker,
            address_payload(address)?,
        ))
    }

    pub fn response_body(body: Vec<u8>) -> Self {
        Self::new(MessageKind::Response, Role::Service, body)
    }

    pub fn service_down(suspect: &Address) -> Result<Self, EncodeError> {
        Ok(Self::new(
            MessageKind::ServiceDown,
            Role::Client,
            address_payload(suspect)?,
        ))
    }

    pub fn remove_service(dead: &Address) -> Result<Self, EncodeError> {
        Ok(Self::new(
            MessageKind::RemoveService,
            Role::Linker,
            address_payload(dead)?,
        ))
    }

    pub fn ping(sender: Role) -> Self {
        Self::new(MessageKind::Ping, sender, Vec::new())
    }

    pub fn ack(sender: Role) -> Self {
        Self::new(MessageKind::Ack, sender, Vec::new())
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let len = HEADER_LEN + self.payload.len();
        if len > MAX_DATAGRAM {
            return Err(EncodeError::Oversized(len));
        }

        let mut buf = Vec::with_capacity(len);
        buf.push(self.kind.ordinal());
        buf.push(self.sender.ordinal());
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::Truncated {
                needed: HEADER_LEN,
                got: buf.len(),
            });
        }

        let kind = MessageKind::from_ordinal(buf[0]).ok_or(DecodeError::UnknownKind(buf[0]))?;
        let sender = Role::from_ordinal(buf[1]).ok_or(DecodeError::UnknownRole(buf[1]))?;

        Ok(Self {
            kind,
            sender,
            payload: buf[HEADER_LEN..].to_vec(),
        })
    }

    /// Leading category byte. Anything after it is ignored.
    pub fn payload_category(&self) -> Result<ServiceCategory, DecodeError> {
        let byte = *self.payload.first().ok_or(DecodeError::Truncated {
            needed: 1,
            got: 0,
        })?;
        ServiceCategory::from_ordinal(byte).ok_or(DecodeError::UnknownCategory(byte))
    }

    /// Bytes following the category byte of a direct service request.
    pub fn payload_body(&self) -> &[u8] {
        self.payload.get(1..).unwrap_or_default()
    }

    /// The payload as exactly one serialized address.
    pub fn payload_address(&self) -> Result<Address, DecodeError> {
        let (address, used) = decode_address(&self.payload)?;
        match self.payload.len() - used {
            0 => Ok(address),
            extra => Err(DecodeError::TrailingBytes(extra)),
        }
    }

    /// `[category][address]`, as relayed between linkers.
    pub fn payload_category_and_address(&self) -> Result<(ServiceCategory, Address), DecodeError> {
        let category = self.payload_category()?;
        let rest = &self.payload[1..];
        let (address, used) = decode_address(rest)?;
        match rest.len() - used {
            0 => Ok((category, address)),
            extra => Err(DecodeError::TrailingBytes(extra)),
        }
    }
}

fn address_payload(address: &Address) -> Result<Vec<u8>, EncodeError> {
    let mut payload = Vec::with_capacity(3 + address.host.len());
    encode_address(address, &mut payload)?;
    Ok(payload)
}

pub fn encode_address(address: &Address, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let host = address.host.as_bytes();
    let host_len =
        u8::try_from(host.len()).map_err(|_| EncodeError::HostTooLong(address.host.clone()))?;

    out.push(host_len);
    out.extend_from_slice(host);
    out.extend_from_slice(&address.port.to_be_bytes());
    Ok(())
}

/// Returns the address and the number of bytes it occupied.
pub fn decode_address(buf: &[u8]) -> Result<(Address, usize), DecodeError> {
    let host_len = *buf.first().ok_or(DecodeError::Truncated {
        needed: 1,
        got: 0,
    })? as usize;

    let needed = 1 + host_len + 2;
    if buf.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            got: buf.len(),
        });
    }

    let host = std::str::from_utf8(&buf[1..1 + host_len]).map_err(|_| DecodeError::InvalidHost)?;
    let port = u16::from_be_bytes([buf[1 + host_len], buf[2 + host_len]]);

    Ok((Address::new(host, port), needed))
}
