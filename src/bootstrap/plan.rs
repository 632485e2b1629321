// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bootstrap Plan
//!
//! The structured init-metadata document: named phase-sets select and order
//! named phases, each phase holding an ordered list of directives. The
//! instance's own init agent interprets the serialized form at first boot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::directive::InitDirective;
use crate::errors::{PlanError, PlanResult};

/// Per-machine bootstrap metadata
///
/// # Invariants
/// - Every phase named by a phase-set must be defined (checked by
///   [`BootstrapPlan::validate`] before assembly)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapPlan {
    /// Phase-set name to ordered phase names
    config_sets: BTreeMap<String, Vec<String>>,
    /// Phase name to ordered directives
    phases: BTreeMap<String, Vec<InitDirective>>,
}

impl BootstrapPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a phase-set selecting phases in execution order
    pub fn with_config_set<I, S>(mut self, name: impl Into<String>, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_sets
            .insert(name.into(), phases.into_iter().map(Into::into).collect());
        self
    }

    /// Define a phase's ordered directives
    pub fn with_phase(mut self, name: impl Into<String>, directives: Vec<InitDirective>) -> Self {
        self.phases.insert(name.into(), directives);
        self
    }

    /// The phase names a set runs, in order
    pub fn config_set(&self, name: &str) -> Option<&[String]> {
        self.config_sets.get(name).map(Vec::as_slice)
    }

    /// A phase's directives, in order
    pub fn phase(&self, name: &str) -> Option<&[InitDirective]> {
        self.phases.get(name).map(Vec::as_slice)
    }

    pub fn config_sets(&self) -> &BTreeMap<String, Vec<String>> {
        &self.config_sets
    }

    pub fn phases(&self) -> &BTreeMap<String, Vec<InitDirective>> {
        &self.phases
    }

    /// Validate that every phase-set references only defined phases
    pub fn validate(&self) -> PlanResult<()> {
        for (set, phases) in &self.config_sets {
            for phase in phases {
                if !self.phases.contains_key(phase) {
                    return Err(PlanError::UnknownPhase {
                        set: set.clone(),
                        phase: phase.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Render the document the init agent consumes at boot
    pub fn to_document(&self) -> PlanResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
