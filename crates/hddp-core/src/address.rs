//! Hardware address codec for HDDP device identifiers
//!
//! Discovery replies carry device identifiers as 48-bit integers. Hosts are
//! keyed by the canonical colon-separated form of that integer, left-padded
//! with zeros to six octets.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// Number of hex digits in a 48-bit hardware address
pub const HEX_DIGITS: usize = 12;

/// Largest identifier that fits in a hardware address
pub const MAX_DEVICE_ID: u64 = 0xffff_ffff_ffff;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Empty hardware identifier")]
    Empty,
    #[error("Hardware identifier '{0}' is longer than 12 hex digits")]
    TooLong(String),
    #[error("Hardware identifier '{0}' is not hexadecimal")]
    InvalidHex(String),
    #[error("Device id {0:#x} does not fit in 48 bits")]
    IdTooWide(u64),
    #[error("Invalid hardware address '{0}', expected xx:xx:xx:xx:xx:xx")]
    InvalidFormat(String),
}

/// Canonical 6-octet hardware address of a discovered endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Encode a numeric device identifier as a hardware address
    pub fn from_id(id: u64) -> Result<Self, AddressError> {
        if id > MAX_DEVICE_ID {
            return Err(AddressError::IdTooWide(id));
        }
        to_hardware_address(&format!("{:x}", id))
    }

    /// Numeric identifier this address was derived from
    pub fn to_id(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }
}

/// Convert a hex identifier (up to 12 digits) to a canonical hardware address.
///
/// Short identifiers are left-padded with `0`, so `"a1b2c3"` becomes
/// `00:00:00:a1:b2:c3`. Upper-case digits are accepted and normalized.
pub fn to_hardware_address(identifier: &str) -> Result<MacAddress, AddressError> {
    if identifier.is_empty() {
        return Err(AddressError::Empty);
    }
    if identifier.len() > HEX_DIGITS {
        return Err(AddressError::TooLong(identifier.to_string()));
    }
    if !identifier.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHex(identifier.to_string()));
    }

    let padded = format!("{:0>width$}", identifier, width = HEX_DIGITS);
    let mut octets = [0u8; 6];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = u8::from_str_radix(&padded[i * 2..i * 2 + 2], 16)
            .map_err(|_| AddressError::InvalidHex(identifier.to_string()))?;
    }

    let address = MacAddress(octets);
    trace!(identifier = identifier, address = %address, "Normalized hardware address");
    Ok(address)
}

impl std::fmt::Display for MacAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

impl FromStr for MacAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 || parts.iter().any(|p| p.len() != 2) {
            return Err(AddressError::InvalidFormat(s.to_string()));
        }
        to_hardware_address(&parts.concat())
    }
}

impl TryFrom<String> for MacAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(address: MacAddress) -> Self {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical(s: &str) -> bool {
        let parts: Vec<&str> = s.split(':').collect();
        parts.len() == 6
            && parts.iter().all(|p| {
                p.len() == 2 && p.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
            })
    }

    #[test]
    fn test_pads_short_identifier() {
        let mac = to_hardware_address("a1b2c3").unwrap();
        assert_eq!(mac.to_string(), "00:00:00:a1:b2:c3");
    }

    #[test]
    fn test_full_length_identifier() {
        let mac = to_hardware_address("0123456789ab").unwrap();
        assert_eq!(mac.to_string(), "01:23:45:67:89:ab");
    }

    #[test]
    fn test_from_id() {
        let mac = MacAddress::from_id(0xA1B2C3).unwrap();
        assert_eq!(mac.to_string(), "00:00:00:a1:b2:c3");
        assert_eq!(MacAddress::from_id(0).unwrap().to_string(), "00:00:00:00:00:00");
        assert_eq!(
            MacAddress::from_id(MAX_DEVICE_ID).unwrap().to_string(),
            "ff:ff:ff:ff:ff:ff"
        );
    }

    #[test]
    fn test_canonical_form_for_every_width() {
        let mut id: u64 = 0x1;
        for _ in 0..HEX_DIGITS {
            let mac = MacAddress::from_id(id).unwrap();
            let rendered = mac.to_string();
            assert!(is_canonical(&rendered), "{rendered}");
            // Re-encoding the same value yields the same address
            assert_eq!(MacAddress::from_id(mac.to_id()).unwrap(), mac);
            assert_eq!(rendered.parse::<MacAddress>().unwrap(), mac);
            id = (id << 4) | 0xd;
        }
    }

    #[test]
    fn test_uppercase_normalized() {
        let mac = to_hardware_address("A1B2C3").unwrap();
        assert_eq!(mac.to_string(), "00:00:00:a1:b2:c3");
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_eq!(to_hardware_address(""), Err(AddressError::Empty));
        assert!(matches!(
            to_hardware_address("1234567890abc"),
            Err(AddressError::TooLong(_))
        ));
        assert!(matches!(
            to_hardware_address("12zz"),
            Err(AddressError::InvalidHex(_))
        ));
        assert_eq!(
            MacAddress::from_id(1 << 48),
            Err(AddressError::IdTooWide(1 << 48))
        );
        assert!("00:00:00:a1:b2".parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let mac = MacAddress::from_id(0xA1B2C3).unwrap();
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"00:00:00:a1:b2:c3\"");
        let back: MacAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mac);
    }
}
