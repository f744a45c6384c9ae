//! Static peer list: the full, ordered set of linkers in the mesh.

use crate::error::{MeshError, Result};
use crate::protocol::Address;

use std::path::Path;

/// Ordered linker addresses, fixed at startup. Includes this node's own entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSet {
    peers: Vec<Address>,
}

impl PeerSet {
    pub fn new(peers: Vec<Address>) -> Self {
        Self { peers }
    }

    /// Parses one `host:port` per line. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let mut peers = Vec::new();

        for (lineno, line) in content.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let address = line
                .parse::<Address>()
                .map_err(|e| MeshError::Config(format!("line {}: {}", lineno + 1, e)))?;
            peers.push(address);
        }

        Ok(Self { peers })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MeshError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn get(&self, index: usize) -> Option<&Address> {
        self.peers.get(index)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.peers.iter()
    }

    /// Every peer except `local`, compared by value.
    pub fn others<'a>(&'a self, local: &'a Address) -> impl Iterator<Item = &'a Address> + 'a {
        self.peers.iter().filter(move |peer| *peer != local)
    }
}
