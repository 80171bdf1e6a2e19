//! Reconciliation of discovery replies against the host registry
//!
//! Each eligible sensor in a reply is either registered (first sighting) or
//! re-registered at the attachment point reported by the reply. The move
//! path always overwrites, even when the location is unchanged, so replaying
//! a reply converges to the same registry state.
//!
//! Hosts are never withdrawn here: a sensor that stops appearing in replies
//! keeps its last registered location.

use hddp_core::{
    AddressError, DeviceEntry, DiscoveryPacket, GatewayId, HostDescription, HostLocation,
    MacAddress, PacketError, ProviderId,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::eligibility::{classify, Eligibility, SENSOR_TYPE_THRESHOLD};
use crate::registry::{HostRegistry, RegistryError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Malformed packet at device {index}: {source}")]
    Packet {
        index: usize,
        #[source]
        source: PacketError,
    },
    #[error("Device {index} has no usable hardware address: {source}")]
    Address {
        index: usize,
        #[source]
        source: AddressError,
    },
    #[error("Device {index} has sensor type {device_type} but only {labels} sensor labels are known")]
    UnknownSensorType {
        index: usize,
        device_type: u16,
        labels: usize,
    },
    #[error("Registry failed for device {index} ({address}): {source}")]
    Registry {
        index: usize,
        address: MacAddress,
        #[source]
        source: RegistryError,
    },
}

/// What happened to one eligible device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Created,
    Moved,
}

/// Per-packet counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub moved: usize,
    pub skipped: usize,
}

impl ReconcileSummary {
    /// Number of registry mutations issued
    pub fn mutations(&self) -> usize {
        self.created + self.moved
    }
}

/// Turns discovery replies into registry mutations
pub struct HostReconciler {
    registry: Arc<dyn HostRegistry>,
    provider: ProviderId,
    sensor_labels: Vec<String>,
}

impl HostReconciler {
    /// Create a reconciler issuing mutations as `provider`. `sensor_labels`
    /// is indexed by `device_type - SENSOR_TYPE_THRESHOLD`.
    pub fn new(registry: Arc<dyn HostRegistry>, provider: ProviderId, sensor_labels: Vec<String>) -> Self {
        Self {
            registry,
            provider,
            sensor_labels,
        }
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Reconcile a reply using the configured sensor labels
    pub fn reconcile(&self, packet: &DiscoveryPacket) -> Result<ReconcileSummary, ReconcileError> {
        self.reconcile_with_labels(packet, &self.sensor_labels)
    }

    /// Reconcile a reply with an explicit label table.
    ///
    /// Stops at the first failing device. Devices already applied in this
    /// call stay applied; the next reply re-drives the rest.
    pub fn reconcile_with_labels(
        &self,
        packet: &DiscoveryPacket,
        sensor_labels: &[String],
    ) -> Result<ReconcileSummary, ReconcileError> {
        let mut summary = ReconcileSummary::default();

        for index in 0..packet.num_devices {
            let packet_error = |source| ReconcileError::Packet { index, source };
            let device_type = packet.device_type(index).map_err(packet_error)?;

            if let Eligibility::Skip(reason) = classify(device_type, packet.mode) {
                debug!(index, device_type, %reason, "Skipping device");
                summary.skipped += 1;
                continue;
            }

            // Attachment columns are only read for eligible entries
            let entry = packet.device_at(index).map_err(packet_error)?;

            match self.reconcile_device(index, &entry, sensor_labels) {
                Ok(HostAction::Created) => summary.created += 1,
                Ok(HostAction::Moved) => summary.moved += 1,
                Err(e) => {
                    warn!(index, error = %e, "Host reconciliation aborted");
                    return Err(e);
                }
            }
        }

        debug!(
            created = summary.created,
            moved = summary.moved,
            skipped = summary.skipped,
            "Reply reconciled"
        );
        Ok(summary)
    }

    /// Whether the registry currently knows `address`
    pub fn device_exists(&self, address: &MacAddress) -> bool {
        self.registry.exists(address)
    }

    fn reconcile_device(
        &self,
        index: usize,
        entry: &DeviceEntry,
        sensor_labels: &[String],
    ) -> Result<HostAction, ReconcileError> {
        let address = MacAddress::from_id(entry.device_id)
            .map_err(|source| ReconcileError::Address { index, source })?;
        let host = self.describe(index, entry, address, sensor_labels)?;
        let location = host.location.clone();
        let registry_error = |source| ReconcileError::Registry {
            index,
            address,
            source,
        };

        if !self.device_exists(&address) {
            self.registry.register(host).map_err(registry_error)?;
            info!(address = %address, location = %location, "Host created");
            Ok(HostAction::Created)
        } else {
            self.registry.relocate(host).map_err(registry_error)?;
            info!(address = %address, location = %location, "Host moved");
            Ok(HostAction::Moved)
        }
    }

    fn describe(
        &self,
        index: usize,
        entry: &DeviceEntry,
        address: MacAddress,
        sensor_labels: &[String],
    ) -> Result<HostDescription, ReconcileError> {
        let label = (entry.device_type - SENSOR_TYPE_THRESHOLD) as usize;
        let sensor = sensor_labels
            .get(label)
            .ok_or(ReconcileError::UnknownSensorType {
                index,
                device_type: entry.device_type,
                labels: sensor_labels.len(),
            })?;

        Ok(HostDescription {
            address,
            vlan: None,
            location: HostLocation::new(
                GatewayId::from_device_id(entry.gateway_id),
                entry.gateway_port,
            ),
            label: format!("{} Sensor\n{}", sensor, address),
            auto_discovered: true,
            provider: self.provider.clone(),
        })
    }
}
