//! Host registry contract and an in-memory implementation
//!
//! The reconciler only needs existence checks plus create and move
//! mutations. Implementations must make each mutation atomic per address;
//! the reconciler does not serialize concurrent replies for the same host.

use hddp_core::{HostDescription, HostLocation, HostRecord, MacAddress, ProviderId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
    #[error("Registry rejected host {address}: {reason}")]
    Rejected { address: MacAddress, reason: String },
    #[error("Host {address} is configured by {owner} and cannot be overwritten")]
    Conflict { address: MacAddress, owner: ProviderId },
}

/// Service of record mapping host addresses to attachment points
pub trait HostRegistry: Send + Sync {
    /// Whether a host is registered under `address`
    fn exists(&self, address: &MacAddress) -> bool;

    /// Register a newly discovered host
    fn register(&self, host: HostDescription) -> Result<(), RegistryError>;

    /// Re-register an existing host at the location in `host`, overwriting
    /// the previous one
    fn relocate(&self, host: HostDescription) -> Result<(), RegistryError>;
}

/// Registry change notification
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Host registered for the first time
    HostAdded(HostRecord),
    /// Host re-registered at a different attachment point
    HostMoved {
        record: HostRecord,
        previous: HostLocation,
    },
    /// Host re-registered at the same attachment point
    HostUpdated(HostRecord),
}

/// Registry kept in process memory
///
/// Operator-configured hosts (`auto_discovered == false`) are never
/// overwritten by auto-discovered descriptions.
pub struct InMemoryHostRegistry {
    hosts: RwLock<HashMap<MacAddress, HostRecord>>,
    event_tx: broadcast::Sender<HostEvent>,
}

impl Default for InMemoryHostRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHostRegistry {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            hosts: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    /// Subscribe to registry events
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.event_tx.subscribe()
    }

    pub fn get(&self, address: &MacAddress) -> Option<HostRecord> {
        self.read().get(address).cloned()
    }

    /// All hosts, ordered by address
    pub fn hosts(&self) -> Vec<HostRecord> {
        let mut hosts: Vec<HostRecord> = self.read().values().cloned().collect();
        hosts.sort_by_key(|h| h.address());
        hosts
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<MacAddress, HostRecord>> {
        self.hosts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn upsert(&self, host: HostDescription) -> Result<(), RegistryError> {
        let mut hosts = self.hosts.write().unwrap_or_else(PoisonError::into_inner);
        let address = host.address;

        let event = match hosts.entry(address) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                if !existing.description.auto_discovered && host.auto_discovered {
                    return Err(RegistryError::Conflict {
                        address,
                        owner: existing.description.provider.clone(),
                    });
                }
                let previous = existing.location().clone();
                existing.refresh(host);
                if previous != *existing.location() {
                    HostEvent::HostMoved {
                        record: existing.clone(),
                        previous,
                    }
                } else {
                    HostEvent::HostUpdated(existing.clone())
                }
            }
            Entry::Vacant(entry) => {
                let record = HostRecord::new(host);
                entry.insert(record.clone());
                HostEvent::HostAdded(record)
            }
        };
        drop(hosts);

        debug!(address = %address, "Host registry updated");
        let _ = self.event_tx.send(event);
        Ok(())
    }
}

impl HostRegistry for InMemoryHostRegistry {
    fn exists(&self, address: &MacAddress) -> bool {
        self.read().contains_key(address)
    }

    fn register(&self, host: HostDescription) -> Result<(), RegistryError> {
        self.upsert(host)
    }

    fn relocate(&self, host: HostDescription) -> Result<(), RegistryError> {
        self.upsert(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hddp_core::GatewayId;

    fn description(id: u64, gateway: u64, port: u32) -> HostDescription {
        let address = MacAddress::from_id(id).unwrap();
        HostDescription {
            address,
            vlan: None,
            location: HostLocation::new(GatewayId::from_device_id(gateway), port),
            label: format!("Humidity Sensor\n{}", address),
            auto_discovered: true,
            provider: ProviderId::new("hddp", "org.hddp.hosts"),
        }
    }

    #[test]
    fn test_register_and_exists() {
        let registry = InMemoryHostRegistry::new();
        let host = description(0xA1B2C3, 0x5, 2);
        let address = host.address;

        assert!(!registry.exists(&address));
        registry.register(host).unwrap();
        assert!(registry.exists(&address));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&address).unwrap().location().port, 2);
    }

    #[test]
    fn test_relocate_overwrites_location() {
        let registry = InMemoryHostRegistry::new();
        registry.register(description(0xA1B2C3, 0x5, 2)).unwrap();
        registry.relocate(description(0xA1B2C3, 0x6, 4)).unwrap();

        let record = registry.hosts().pop().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(record.location().gateway.as_str(), "sw:6");
        assert_eq!(record.location().port, 4);
    }

    #[test]
    fn test_configured_host_not_overwritten() {
        let registry = InMemoryHostRegistry::new();
        let mut configured = description(0xA1B2C3, 0x5, 2);
        configured.auto_discovered = false;
        configured.provider = ProviderId::new("cfg", "operator");
        registry.register(configured).unwrap();

        let err = registry.relocate(description(0xA1B2C3, 0x6, 4)).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
        assert_eq!(registry.hosts()[0].location().port, 2);
    }

    #[tokio::test]
    async fn test_events() {
        let registry = InMemoryHostRegistry::new();
        let mut rx = registry.subscribe();

        registry.register(description(0xA1B2C3, 0x5, 2)).unwrap();
        registry.relocate(description(0xA1B2C3, 0x5, 2)).unwrap();
        registry.relocate(description(0xA1B2C3, 0x6, 1)).unwrap();

        assert!(matches!(rx.recv().await.unwrap(), HostEvent::HostAdded(_)));
        assert!(matches!(rx.recv().await.unwrap(), HostEvent::HostUpdated(_)));
        match rx.recv().await.unwrap() {
            HostEvent::HostMoved { record, previous } => {
                assert_eq!(previous.port, 2);
                assert_eq!(record.location().port, 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
