//! Topology snapshot grouping discovered hosts under their gateway

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::MacAddress;
use crate::host::{GatewayId, HostRecord};

/// An endpoint attached to a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointNode {
    pub address: MacAddress,
    pub label: String,
    /// Port on the gateway facing this endpoint
    pub port: u32,
}

/// A gateway and the endpoints attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayNode {
    pub id: GatewayId,
    pub endpoints: Vec<EndpointNode>,
}

/// Hosts indexed by attachment gateway
#[derive(Debug, Clone, Default)]
pub struct Topology {
    gateways: BTreeMap<GatewayId, Vec<EndpointNode>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from registry records
    pub fn from_hosts(hosts: &[HostRecord]) -> Self {
        let mut topology = Self::new();
        for host in hosts {
            topology.add_host(host);
        }
        topology
    }

    /// Attach a host under its gateway, ordered by port then address
    pub fn add_host(&mut self, host: &HostRecord) {
        let location = host.location();
        let endpoints = self.gateways.entry(location.gateway.clone()).or_default();
        endpoints.push(EndpointNode {
            address: host.address(),
            label: host.description.label.clone(),
            port: location.port,
        });
        endpoints.sort_by_key(|e| (e.port, e.address));
    }

    pub fn gateways(&self) -> impl Iterator<Item = &GatewayId> {
        self.gateways.keys()
    }

    /// Endpoints attached to a gateway
    pub fn endpoints(&self, gateway: &GatewayId) -> &[EndpointNode] {
        self.gateways.get(gateway).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn endpoint_count(&self) -> usize {
        self.gateways.values().map(Vec::len).sum()
    }

    /// Get topology as JSON-serializable structure
    pub fn to_graph(&self) -> TopologyGraph {
        TopologyGraph {
            gateways: self
                .gateways
                .iter()
                .map(|(id, endpoints)| GatewayNode {
                    id: id.clone(),
                    endpoints: endpoints.clone(),
                })
                .collect(),
        }
    }
}

/// Serializable topology graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyGraph {
    pub gateways: Vec<GatewayNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostDescription, HostLocation, ProviderId};

    fn record(id: u64, gateway: u64, port: u32) -> HostRecord {
        let address = MacAddress::from_id(id).unwrap();
        HostRecord::new(HostDescription {
            address,
            vlan: None,
            location: HostLocation::new(GatewayId::from_device_id(gateway), port),
            label: format!("Light Sensor\n{}", address),
            auto_discovered: true,
            provider: ProviderId::new("hddp", "org.hddp.hosts"),
        })
    }

    #[test]
    fn test_topology_from_hosts() {
        let hosts = vec![record(0x10, 0x5, 3), record(0x11, 0x5, 1), record(0x12, 0x6, 2)];
        let topology = Topology::from_hosts(&hosts);

        assert_eq!(topology.gateways().count(), 2);
        assert_eq!(topology.endpoint_count(), 3);

        let gw5 = topology.endpoints(&GatewayId::from_device_id(0x5));
        assert_eq!(gw5.len(), 2);
        assert_eq!(gw5[0].port, 1);
        assert_eq!(gw5[0].address.to_string(), "00:00:00:00:00:11");

        assert!(topology.endpoints(&GatewayId::from_device_id(0x7)).is_empty());
    }

    #[test]
    fn test_graph_serializes() {
        let topology = Topology::from_hosts(&[record(0xA1B2C3, 0x5, 2)]);
        let json = serde_json::to_value(topology.to_graph()).unwrap();
        assert_eq!(json["gateways"][0]["id"], "sw:5");
        assert_eq!(json["gateways"][0]["endpoints"][0]["address"], "00:00:00:a1:b2:c3");
        assert_eq!(json["gateways"][0]["endpoints"][0]["port"], 2);
    }
}
