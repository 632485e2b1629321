// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Segment Value Object and Invariants

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::acl::RulePriority;
use super::network::CidrBlock;
use crate::errors::{PlanError, PlanResult};

/// Logical network subdivision with its own CIDR block and ACL
///
/// Defined once in configuration, consumed at plan-construction time, never
/// mutated after.
///
/// # Invariants
/// - Unique name within one posture
/// - CIDR blocks across segments must not overlap
/// - Unique ACL base priority within one posture
///
/// All three are enforced by [`validate_segments`], which runs before any
/// plan is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSegment {
    pub name: String,
    pub cidr: CidrBlock,
    pub acl_base_priority: RulePriority,
}

impl NetworkSegment {
    pub fn new(name: impl Into<String>, cidr: CidrBlock, acl_base_priority: RulePriority) -> Self {
        Self {
            name: name.into(),
            cidr,
            acl_base_priority,
        }
    }
}

/// Validate a posture's segment table
///
/// # Rules
/// - Segment names are unique
/// - No two segments' CIDR blocks overlap
/// - ACL base priorities are unique
pub fn validate_segments(segments: &[NetworkSegment]) -> PlanResult<()> {
    let mut priorities: HashMap<RulePriority, &str> = HashMap::new();

    for (idx, segment) in segments.iter().enumerate() {
        if segments[..idx].iter().any(|s| s.name == segment.name) {
            return Err(PlanError::DuplicateSegment(segment.name.clone()));
        }

        if let Some(first) = priorities.insert(segment.acl_base_priority, segment.name.as_str()) {
            return Err(PlanError::DuplicateAclBasePriority {
                first: first.to_string(),
                second: segment.name.clone(),
                priority: segment.acl_base_priority,
            });
        }

        for earlier in &segments[..idx] {
            if earlier.cidr.overlaps(&segment.cidr) {
                return Err(PlanError::SegmentOverlap {
                    first: earlier.name.clone(),
                    first_cidr: earlier.cidr,
                    second: segment.name.clone(),
                    second_cidr: segment.cidr,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(name: &str, cidr: &str, priority: u16) -> NetworkSegment {
        NetworkSegment::new(
            name,
            cidr.parse().unwrap(),
            RulePriority::new(priority).unwrap(),
        )
    }

    #[test]
    fn test_disjoint_segments_pass() {
        let segments = vec![
            segment("r-ventas", "10.66.0.0/27", 500),
            segment("r-ti", "10.66.0.32/27", 400),
            segment("r-datacenter", "10.66.0.64/28", 300),
        ];
        assert!(validate_segments(&segments).is_ok());
    }

    #[test]
    fn test_overlapping_segments_fail() {
        let segments = vec![
            segment("r-ventas", "10.66.0.0/27", 500),
            segment("r-bad", "10.66.0.16/28", 400),
        ];
        let err = validate_segments(&segments).unwrap_err();
        assert!(matches!(err, PlanError::SegmentOverlap { .. }));
    }

    #[test]
    fn test_duplicate_name_fails() {
        let segments = vec![
            segment("r-ventas", "10.66.0.0/27", 500),
            segment("r-ventas", "10.66.0.32/27", 400),
        ];
        let err = validate_segments(&segments).unwrap_err();
        assert!(matches!(err, PlanError::DuplicateSegment(name) if name == "r-ventas"));
    }

    #[test]
    fn test_duplicate_base_priority_fails() {
        let segments = vec![
            segment("r-ventas", "10.66.0.0/27", 500),
            segment("r-ti", "10.66.0.32/27", 500),
        ];
        let err = validate_segments(&segments).unwrap_err();
        assert!(matches!(err, PlanError::DuplicateAclBasePriority { .. }));
    }
}
