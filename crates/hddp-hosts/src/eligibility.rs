//! Which packet entries may become hosts

/// Lowest device type code that denotes a sensor. Codes below it are
/// switches and non-SDN nodes.
pub const SENSOR_TYPE_THRESHOLD: u16 = 3;

/// The only protocol mode in which hosts are created or moved
pub const CREATION_MODE: u16 = 0;

/// Why a packet entry was not turned into a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Packet mode does not allow host creation
    ModeDisabled(u16),
    /// Device type is below the sensor threshold
    NotSensor(u16),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ModeDisabled(mode) => write!(f, "mode {} disables host creation", mode),
            SkipReason::NotSensor(device_type) => write!(f, "device type {} is not a sensor", device_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Skip(SkipReason),
}

/// Classify a device entry. Mode is checked first since it applies to the
/// whole packet.
pub fn classify(device_type: u16, mode: u16) -> Eligibility {
    if mode != CREATION_MODE {
        Eligibility::Skip(SkipReason::ModeDisabled(mode))
    } else if device_type < SENSOR_TYPE_THRESHOLD {
        Eligibility::Skip(SkipReason::NotSensor(device_type))
    } else {
        Eligibility::Eligible
    }
}

pub fn is_eligible(device_type: u16, mode: u16) -> bool {
    classify(device_type, mode) == Eligibility::Eligible
}
