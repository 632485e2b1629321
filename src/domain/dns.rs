// Copyright (c) 2025 - Cowboy AI, Inc.
//! Private DNS Zone and Record Value Objects
//!
//! Record names are validated on construction against RFC 1123 label rules
//! so that a typo in the posture fails at plan-construction time rather
//! than at the provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Record name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordNameError {
    #[error("Record name is empty")]
    Empty,

    #[error("Record name exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Invalid character in record name: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),
}

/// DNS record or zone name value object
///
/// # Invariants
/// - Non-empty, total length <= 253 characters
/// - Dot-separated labels of 1-63 alphanumeric-or-hyphen characters
/// - Labels never start or end with a hyphen
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordName(String);

impl RecordName {
    /// Maximum total length (RFC 1123)
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length for a single label (RFC 1123)
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Create a new record name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, RecordNameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(RecordNameError::Empty);
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(RecordNameError::TooLong(name.len()));
        }

        for label in name.split('.') {
            Self::validate_label(label)?;
        }

        Ok(Self(name))
    }

    fn validate_label(label: &str) -> Result<(), RecordNameError> {
        if label.is_empty() {
            return Err(RecordNameError::Empty);
        }

        if label.len() > Self::MAX_LABEL_LENGTH {
            return Err(RecordNameError::LabelTooLong(label.to_string()));
        }

        for ch in label.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '-' {
                return Err(RecordNameError::InvalidCharacter(ch));
            }
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(RecordNameError::InvalidLabelFormat(label.to_string()));
        }

        Ok(())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name equals `zone` or falls under it
    pub fn is_within(&self, zone: &RecordName) -> bool {
        self.0 == zone.0 || self.0.ends_with(&format!(".{}", zone.0))
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for RecordName {
    type Error = RecordNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Address record with a fixed private address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub name: RecordName,
    pub address: Ipv4Addr,
    pub ttl_seconds: u32,
}

impl DnsRecord {
    /// Default TTL for records in a private zone
    pub const DEFAULT_TTL_SECONDS: u32 = 5;

    /// Create an A-record with the default 5-second TTL
    pub fn a(name: RecordName, address: Ipv4Addr) -> Self {
        Self {
            name,
            address,
            ttl_seconds: Self::DEFAULT_TTL_SECONDS,
        }
    }

    /// Override the TTL
    pub fn with_ttl(mut self, ttl_seconds: u32) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

/// Private DNS zone with its fixed records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsZone {
    pub name: RecordName,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    pub records: Vec<DnsRecord>,
}

impl DnsZone {
    pub fn new(name: RecordName) -> Self {
        Self {
            name,
            comment: None,
            records: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_record(mut self, record: DnsRecord) -> Self {
        self.records.push(record);
        self
    }
}
