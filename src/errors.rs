//! Error types for plan-construction operations

use thiserror::Error;

use crate::domain::acl::{CatalogError, RulePriority};
use crate::domain::dns::RecordNameError;
use crate::domain::network::{CidrBlock, NetworkError};

/// Errors that can occur while constructing a provisioning plan
///
/// Everything here is raised synchronously during plan construction.
/// Provider-side provisioning failures are the external engine's domain and
/// never surface through this type.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Bootstrap metadata attached twice to the same instance spec
    #[error("bootstrap metadata already attached when composing configuration for: {0}")]
    BootstrapConflict(String),

    /// A segment's rule catalog failed validation
    #[error("invalid rule catalog for segment {segment}: {source}")]
    InvalidCatalog {
        segment: String,
        #[source]
        source: CatalogError,
    },

    /// A rule catalog is keyed by a segment that is not declared
    #[error("rule catalog references unknown segment: {0}")]
    UnknownCatalogSegment(String),

    /// Two segments have overlapping CIDR blocks
    #[error("segment CIDR blocks overlap: {first} ({first_cidr}) and {second} ({second_cidr})")]
    SegmentOverlap {
        first: String,
        first_cidr: CidrBlock,
        second: String,
        second_cidr: CidrBlock,
    },

    /// Two segments share the same name
    #[error("duplicate segment name: {0}")]
    DuplicateSegment(String),

    /// Two segments reserve the same ACL base priority
    #[error("segments {first} and {second} reserve the same ACL base priority {priority}")]
    DuplicateAclBasePriority {
        first: String,
        second: String,
        priority: RulePriority,
    },

    /// Two security groups share the same name
    #[error("duplicate security group name: {0}")]
    DuplicateSecurityGroup(String),

    /// A DNS record does not belong to its zone
    #[error("record {record} is outside zone {zone}")]
    RecordOutsideZone { record: String, zone: String },

    /// An instance references a segment that is not declared
    #[error("instance {instance} references unknown segment: {segment}")]
    UnknownSegment { instance: String, segment: String },

    /// An instance references a security group that is not declared
    #[error("instance {instance} references unknown security group: {group}")]
    UnknownSecurityGroup { instance: String, group: String },

    /// Two instances in one provisioning batch share a logical name
    #[error("duplicate instance name in provisioning batch: {0}")]
    DuplicateInstance(String),

    /// A bootstrap phase-set references a phase that was never defined
    #[error("phase-set {set} references unknown phase: {phase}")]
    UnknownPhase { set: String, phase: String },

    /// The log-aggregation pipeline supports a fixed number of monitored hosts
    #[error("monitoring pipeline expects exactly {expected} monitored hosts, got {actual}")]
    MonitoredHostCount { expected: usize, actual: usize },

    /// Network value object error
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// DNS value object error
    #[error("dns error: {0}")]
    Dns(#[from] RecordNameError),

    /// Rule catalog error outside any segment context
    #[error("rule catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for plan-construction operations
pub type PlanResult<T> = Result<T, PlanError>;
