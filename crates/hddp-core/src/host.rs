//! Host types for tracking discovered endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::MacAddress;

/// Identifier of a gateway switch in the topology
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GatewayId(pub String);

impl GatewayId {
    /// URI scheme used for switches discovered by HDDP
    pub const SCHEME: &'static str = "sw";

    /// Create a gateway id from the numeric identifier carried in a reply
    pub fn from_device_id(id: u64) -> Self {
        Self(format!("{}:{:x}", Self::SCHEME, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GatewayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an endpoint connects into the topology: a gateway and the port
/// on that gateway facing the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostLocation {
    pub gateway: GatewayId,
    pub port: u32,
}

impl HostLocation {
    pub fn new(gateway: GatewayId, port: u32) -> Self {
        Self { gateway, port }
    }
}

impl std::fmt::Display for HostLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.gateway, self.port)
    }
}

/// Identity of the component that issued a registry mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId {
    pub scheme: String,
    pub id: String,
}

impl ProviderId {
    pub fn new(scheme: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scheme, self.id)
    }
}

/// Description of a host as submitted to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDescription {
    /// Canonical hardware address (registry key)
    pub address: MacAddress,
    /// VLAN tag; sensors are always untagged
    pub vlan: Option<u16>,
    /// Attachment point
    pub location: HostLocation,
    /// Human-readable label
    pub label: String,
    /// Learned from discovery rather than configured by an operator
    pub auto_discovered: bool,
    /// Component that issued the mutation
    pub provider: ProviderId,
}

/// A host as stored by a registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    pub description: HostDescription,
    /// When the host was first registered
    pub first_seen: DateTime<Utc>,
    /// When the host was last registered or relocated
    pub last_seen: DateTime<Utc>,
}

impl HostRecord {
    pub fn new(description: HostDescription) -> Self {
        let now = Utc::now();
        Self {
            description,
            first_seen: now,
            last_seen: now,
        }
    }

    pub fn address(&self) -> MacAddress {
        self.description.address
    }

    pub fn location(&self) -> &HostLocation {
        &self.description.location
    }

    /// Replace the description, keeping the original first-seen time
    pub fn refresh(&mut self, description: HostDescription) {
        self.description = description;
        self.last_seen = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(port: u32) -> HostDescription {
        HostDescription {
            address: MacAddress::from_id(0xA1B2C3).unwrap(),
            vlan: None,
            location: HostLocation::new(GatewayId::from_device_id(0x5), port),
            label: "Temperature Sensor\n00:00:00:a1:b2:c3".to_string(),
            auto_discovered: true,
            provider: ProviderId::new("hddp", "org.hddp.hosts"),
        }
    }

    #[test]
    fn test_gateway_id_from_device_id() {
        assert_eq!(GatewayId::from_device_id(0x5).as_str(), "sw:5");
        assert_eq!(GatewayId::from_device_id(0x1000ab).as_str(), "sw:1000ab");
    }

    #[test]
    fn test_location_display() {
        let location = HostLocation::new(GatewayId::from_device_id(0x5), 2);
        assert_eq!(location.to_string(), "sw:5/2");
    }

    #[test]
    fn test_record_refresh_keeps_first_seen() {
        let mut record = HostRecord::new(description(2));
        let first_seen = record.first_seen;
        record.refresh(description(4));
        assert_eq!(record.first_seen, first_seen);
        assert_eq!(record.location().port, 4);
        assert!(record.last_seen >= first_seen);
    }
}
