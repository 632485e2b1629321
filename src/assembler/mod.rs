// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Assembler
//!
//! Consumes the posture table and composed instance specs and emits the
//! declarative resource graph the external provisioning engine applies.
//! Assembly is pure construction plus eager validation; ordering,
//! parallelism, retries, and rollback during apply are entirely the
//! engine's responsibility.

pub mod instance_stack;
pub mod monitoring_stack;
pub mod network_stack;
pub mod resource;

// Re-export commonly used types
pub use instance_stack::build_instance_stack;
pub use monitoring_stack::{build_monitoring_stack, SNMP_SECRET_NAME};
pub use network_stack::build_network_stack;
pub use resource::{Output, Resource, ResourceKind, Stack};
