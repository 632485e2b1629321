// Copyright (c) 2025 - Cowboy AI, Inc.
//! Security Group Policy Value Object

use serde::{Deserialize, Serialize};

/// Stateful firewall policy for one logical role
///
/// One policy per role, defined once in configuration. Outbound traffic is
/// allowed by default; inbound must be opted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupPolicy {
    pub name: String,
    pub description: String,
    pub allow_all_inbound: bool,
    pub allow_all_outbound: bool,
}

impl SecurityGroupPolicy {
    /// Create a restricted policy: all outbound, no inbound
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            allow_all_inbound: false,
            allow_all_outbound: true,
        }
    }

    /// Opt into allowing all inbound traffic
    pub fn allow_all_inbound(mut self) -> Self {
        self.allow_all_inbound = true;
        self
    }

    /// Override the allow-all-outbound default
    pub fn outbound(mut self, allow: bool) -> Self {
        self.allow_all_outbound = allow;
        self
    }
}
