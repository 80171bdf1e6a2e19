//! HDDP Core - Core types for hybrid-topology host discovery
//!
//! This crate provides the foundational types for the HDDP host provider:
//! - Hardware address codec for 48-bit device identifiers
//! - Decoded discovery replies with typed access to device entries
//! - Host descriptions, attachment points and provider identity
//! - Topology snapshot grouping endpoints by gateway

pub mod address;
pub mod host;
pub mod packet;
pub mod topology;

pub use address::{to_hardware_address, AddressError, MacAddress};
pub use host::{GatewayId, HostDescription, HostLocation, HostRecord, ProviderId};
pub use packet::{DeviceEntry, DiscoveryPacket, PacketError};
pub use topology::{Topology, TopologyGraph};
