// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Invalid prefix length: {0} (must be 0-32)")]
    InvalidPrefixLength(u8),

    #[error("CIDR has host bits set: {0}")]
    HostBitsSet(String),

    #[error("Invalid port range: {from}-{to}")]
    InvalidPortRange { from: u16, to: u16 },
}

/// IPv4 network in CIDR notation value object
///
/// Invariants:
/// - Prefix length 0-32
/// - Host bits are clear (the address is the network address)
///
/// # Examples
///
/// ```rust
/// use ruwu_infrastructure::domain::CidrBlock;
///
/// let cidr: CidrBlock = "10.66.0.64/28".parse().unwrap();
/// assert_eq!(cidr.prefix(), 28);
/// assert!(cidr.contains("10.66.0.69".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrBlock {
    network: Ipv4Addr,
    prefix: u8,
}

impl CidrBlock {
    /// The whole IPv4 address space, `0.0.0.0/0`
    pub const ANY: CidrBlock = CidrBlock {
        network: Ipv4Addr::new(0, 0, 0, 0),
        prefix: 0,
    };

    /// Create a new CIDR block with validation
    ///
    /// # Invariants
    /// - Prefix length 0-32
    /// - No host bits set below the prefix
    pub fn new(network: Ipv4Addr, prefix: u8) -> Result<Self, NetworkError> {
        if prefix > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix));
        }

        let bits = u32::from(network);
        if bits & !Self::mask_bits(prefix) != 0 {
            return Err(NetworkError::HostBitsSet(format!("{network}/{prefix}")));
        }

        Ok(Self { network, prefix })
    }

    /// Get the network address
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Get the prefix length
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Check whether an address falls inside this block
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & Self::mask_bits(self.prefix) == u32::from(self.network)
    }

    /// Check whether two blocks share any addresses
    ///
    /// Two prefix networks overlap exactly when one contains the other's
    /// network address.
    pub fn overlaps(&self, other: &CidrBlock) -> bool {
        self.contains(other.network) || other.contains(self.network)
    }

    fn mask_bits(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix)
        }
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for CidrBlock {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, prefix_str) = s
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(s.to_string()))?;

        let network = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidAddress(addr_str.to_string()))?;

        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(s.to_string()))?;

        Self::new(network, prefix)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Protocol matched by an ACL rule
///
/// The provisioning engine's rule model identifies protocols by their
/// assigned numbers, with -1 standing for "all protocols".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    All,
    Tcp,
    Udp,
}

impl Protocol {
    /// The protocol number the rule evaluation model uses
    pub fn number(&self) -> i8 {
        match self {
            Protocol::All => -1,
            Protocol::Tcp => 6,
            Protocol::Udp => 17,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::All => write!(f, "all"),
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// Inclusive port range value object
///
/// # Invariants
/// - `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    from: u16,
    to: u16,
}

impl PortRange {
    /// Create a new port range with validation
    pub fn new(from: u16, to: u16) -> Result<Self, NetworkError> {
        if from > to {
            return Err(NetworkError::InvalidPortRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// A range covering a single port
    pub fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }

    pub fn from(&self) -> u16 {
        self.from
    }

    pub fn to(&self) -> u16 {
        self.to
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// ICMP type and code matched by an ACL rule, -1 for "any"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IcmpTypeCode {
    pub icmp_type: i16,
    pub code: i16,
}
