//! Host provider identity

use hddp_core::{MacAddress, ProviderId};
use tracing::trace;

use crate::reconcile::HostReconciler;

/// A source of host information for the registry
pub trait HostProvider {
    /// Identity attached to every mutation this provider issues
    fn id(&self) -> &ProviderId;

    /// Ask the provider to confirm a host is still reachable
    fn trigger_probe(&self, address: &MacAddress);
}

impl HostProvider for HostReconciler {
    fn id(&self) -> &ProviderId {
        self.provider()
    }

    /// Sensors announce themselves through discovery replies, so there is
    /// nothing to send here.
    fn trigger_probe(&self, address: &MacAddress) {
        trace!(address = %address, provider = %self.provider(), "Probe requested, waiting for next reply");
    }
}
