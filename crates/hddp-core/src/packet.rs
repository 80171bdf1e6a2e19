//! Decoded HDDP reply packets
//!
//! A reply lists the devices seen behind a gateway as parallel arrays.
//! `device_types[pos]` and `device_ids[pos]` describe the device itself,
//! while `device_ids[pos + 1]` and `out_ports[pos + 1]` describe where it
//! attaches: the upstream gateway and that gateway's port facing the device.
//! The id and port arrays therefore carry one extra trailing entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Packet field {field} has {len} entries, entry {index} requested")]
    Truncated {
        field: &'static str,
        index: usize,
        len: usize,
    },
}

/// A decoded discovery reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPacket {
    /// Number of device entries
    pub num_devices: usize,
    /// Type code per device
    pub device_types: Vec<u16>,
    /// Hardware identifiers, one per device plus the trailing gateway
    pub device_ids: Vec<u64>,
    /// Output ports, same layout as `device_ids`
    pub out_ports: Vec<u32>,
    /// Protocol operating mode
    pub mode: u16,
}

/// One device entry with its attachment point resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceEntry {
    pub device_type: u16,
    /// The device's own identifier
    pub device_id: u64,
    /// Identifier of the gateway the device hangs off
    pub gateway_id: u64,
    /// Port on the gateway facing the device
    pub gateway_port: u32,
}

impl DiscoveryPacket {
    /// Type code of the device at `pos`. Does not touch the attachment
    /// columns, so entries that are never turned into hosts may omit them.
    pub fn device_type(&self, pos: usize) -> Result<u16, PacketError> {
        field(&self.device_types, "device_types", pos)
    }

    /// Device entry at `pos`, with the attachment point taken from `pos + 1`
    pub fn device_at(&self, pos: usize) -> Result<DeviceEntry, PacketError> {
        Ok(DeviceEntry {
            device_type: self.device_type(pos)?,
            device_id: field(&self.device_ids, "device_ids", pos)?,
            gateway_id: field(&self.device_ids, "device_ids", pos + 1)?,
            gateway_port: field(&self.out_ports, "out_ports", pos + 1)?,
        })
    }
}

fn field<T: Copy>(values: &[T], name: &'static str, index: usize) -> Result<T, PacketError> {
    values.get(index).copied().ok_or(PacketError::Truncated {
        field: name,
        index,
        len: values.len(),
    })
}
