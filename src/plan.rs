// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Plan Document
//!
//! The top-level artifact handed to the external provisioning engine: an
//! identified, timestamped, ordered set of stacks. The plan is built once,
//! in memory, synchronously, and serialized exactly once; the engine owns
//! everything that happens after that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use uuid::Uuid;

use crate::assembler::{
    build_instance_stack, build_monitoring_stack, build_network_stack, Stack,
};
use crate::domain::InstanceSpec;
use crate::errors::PlanResult;
use crate::posture::NetworkPosture;

/// Stack name the network definition is published under
pub const NETWORK_STACK: &str = "ruwu-network";

/// Stack name of the general instance fleet
pub const INSTANCE_STACK: &str = "ruwu-instances";

/// Stack name of the SNMP/Logstash monitoring batch
pub const MONITORING_STACK: &str = "ruwu-monitoring";

/// Unique identifier for one synthesized plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(Uuid);

impl PlanId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete declarative resource graph for one estate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningPlan {
    pub id: PlanId,
    pub synthesized_at: DateTime<Utc>,
    pub region: String,
    pub stacks: Vec<Stack>,
}

impl ProvisioningPlan {
    /// Synthesize the full plan: network, instance fleet, and monitoring
    ///
    /// The posture is validated before any stack is emitted; dependent
    /// stacks reference the network stack by name and its identifiers by
    /// export name.
    pub fn synthesize(
        region: &str,
        posture: &NetworkPosture,
        fleet: &[InstanceSpec],
    ) -> PlanResult<Self> {
        let network = build_network_stack(NETWORK_STACK, posture)?;
        let instances = build_instance_stack(INSTANCE_STACK, posture, fleet, NETWORK_STACK)?;
        let monitoring = build_monitoring_stack(MONITORING_STACK, posture, region, NETWORK_STACK)?;

        let plan = Self {
            id: PlanId::new(),
            synthesized_at: Utc::now(),
            region: region.to_string(),
            stacks: vec![network, instances, monitoring],
        };

        info!(
            plan = %plan.id,
            stacks = plan.stacks.len(),
            region,
            "synthesized provisioning plan"
        );

        Ok(plan)
    }

    /// Look up a stack by name
    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name == name)
    }

    /// Serialize the plan for the provisioning engine
    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
