use crate::error::{MeshError, Result};
use crate::protocol::{Address, ServiceCategory};

use rand::Rng;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Read-only copy of the registry contents.
pub type Snapshot = HashMap<ServiceCategory, HashSet<Address>>;

/// Registry owned by a single linker node.
///
/// Categories whose last address is removed are dropped entirely, so an
/// absent category and an empty one look the same to callers.
#[derive(Default)]
pub struct Registry {
    services: RwLock<HashMap<ServiceCategory, HashSet<Address>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `address` under `category`. Returns `true` if it was not already present.
    pub async fn register(&self, category: ServiceCategory, address: Address) -> bool {
        let mut services = self.services.write().await;
        let inserted = services
            .entry(category)
            .or_default()
            .insert(address.clone());

        if inserted {
            info!("Registered {} service at {}", category, address);
        } else {
            debug!("{} service at {} already registered", category, address);
        }

        inserted
    }

    /// Picks one address registered under `category`, uniformly at random.
    pub async fn lookup(&self, category: ServiceCategory) -> Result<Address> {
        let services = self.services.read().await;

        let candidates: Vec<&Address> = services
            .get(&category)
            .map(|set| set.iter().collect())
            .unwrap_or_default();

        if candidates.is_empty() {
            return Err(MeshError::NoServiceAvailable(category));
        }

        let idx = rand::thread_rng().gen_range(0..candidates.len());
        Ok(candidates[idx].clone())
    }

    /// Removes `address` from every category. Returns whether anything was removed.
    pub async fn remove(&self, address: &Address) -> bool {
        let mut services = self.services.write().await;

        let mut removed = false;
        for set in services.values_mut() {
            removed |= set.remove(address);
        }
        services.retain(|_, set| !set.is_empty());

        if removed {
            info!("Removed {} from registry", address);
        } else {
            debug!("{} was not registered; nothing to remove", address);
        }

        removed
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.services.read().await.clone()
    }

    /// Number of addresses registered under `category`.
    pub async fn count(&self, category: ServiceCategory) -> usize {
        self.services
            .read()
            .await
            .get(&category)
            .map_or(0, HashSet::len)
    }

    /// Total number of (category, address) entries.
    pub async fn len(&self) -> usize {
        self.services.read().await.values().map(HashSet::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
