//! HDDP Hosts - Host reconciliation for hybrid-topology discovery
//!
//! This crate turns decoded HDDP replies into host registry mutations:
//! - Eligibility filtering by device type and protocol mode
//! - Registry contract plus an in-memory registry with change events
//! - Create-or-move reconciliation per sensor

pub mod eligibility;
pub mod provider;
pub mod reconcile;
pub mod registry;

pub use eligibility::{classify, is_eligible, Eligibility, SkipReason, SENSOR_TYPE_THRESHOLD};
pub use provider::HostProvider;
pub use reconcile::{HostAction, HostReconciler, ReconcileError, ReconcileSummary};
pub use registry::{HostEvent, HostRegistry, InMemoryHostRegistry, RegistryError};
