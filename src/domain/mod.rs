// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Topology Domain Models
//!
//! Core domain concepts for the plan builder: network segments, ACL rule
//! catalogs, security-group policies, DNS records, and instance
//! specifications, all modeled as value objects validated on construction
//! or by explicit pure validation functions that run before a plan is
//! emitted.
//!
//! # Value Objects with Invariants
//!
//! - [`CidrBlock`] - IPv4 network, prefix 0-32, host bits clear
//! - [`RulePriority`] - ACL rule ordering (1-32766)
//! - [`NetworkSegment`] - named subdivision with CIDR and ACL base priority
//! - [`RecordName`] - DNS-validated record and zone names (RFC 1123)
//! - [`InstanceSpec`] - single-owner machine description

pub mod acl;
pub mod dns;
pub mod instance;
pub mod network;
pub mod security_group;
pub mod segment;

// Re-export value objects
pub use acl::{
    blanket_rules, deny_all_rules, ssh_rules, vpn_rules, AclRule, CatalogError, Direction,
    RuleAction, RuleCatalog, RulePriority,
};
pub use dns::{DnsRecord, DnsZone, RecordName, RecordNameError};
pub use instance::{InstanceSpec, MachineImage, StartupScript};
pub use network::{CidrBlock, IcmpTypeCode, NetworkError, PortRange, Protocol};
pub use security_group::SecurityGroupPolicy;
pub use segment::{validate_segments, NetworkSegment};
