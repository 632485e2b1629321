// Copyright (c) 2025 - Cowboy AI, Inc.
//! ACL Rule Catalog Builder
//!
//! Turns high-level traffic intents into ordered, directional ACL rule
//! records. The rule evaluation model is first-match-wins in ascending
//! priority order and has no implicit default, so every catalog is expected
//! to end with the explicit deny-everything sentinel pair.
//!
//! The builders are pure data transformation: they never deduplicate and
//! never check for priority collisions between intents. Collision detection
//! is [`RuleCatalog::validate`]'s job and runs before any plan is emitted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::network::{CidrBlock, IcmpTypeCode, PortRange, Protocol};

/// Rule catalog validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate {direction} rule priority {priority}")]
    DuplicatePriority {
        direction: Direction,
        priority: RulePriority,
    },

    #[error("invalid rule priority: {0} (must be 1-32766)")]
    InvalidPriority(u16),
}

/// Traffic direction of an ACL rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}

/// Whether a matching rule permits or rejects traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Allow,
    Deny,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Allow => write!(f, "allow"),
            RuleAction::Deny => write!(f, "deny"),
        }
    }
}

/// ACL rule priority value object
///
/// Rules are evaluated in ascending priority order; the first match wins.
///
/// # Invariants
/// - Priority must be 1-32766 (the rule evaluation model's valid range)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulePriority(u16);

impl RulePriority {
    /// Minimum valid priority
    pub const MIN: u16 = 1;

    /// Maximum valid priority
    pub const MAX: u16 = 32766;

    /// Fixed priority of the SSH allow pair
    pub const SSH: RulePriority = RulePriority(5);

    /// Fixed priority of the VPN allow-all pair
    pub const VPN: RulePriority = RulePriority(500);

    /// Sentinel priority of the catch-all deny pair
    pub const DENY_ALL: RulePriority = RulePriority(999);

    /// Step between consecutive blanket rules
    pub const STEP: u16 = 10;

    /// Create a new rule priority with validation
    pub fn new(priority: u16) -> Result<Self, CatalogError> {
        if !(Self::MIN..=Self::MAX).contains(&priority) {
            return Err(CatalogError::InvalidPriority(priority));
        }
        Ok(Self(priority))
    }

    /// Get the priority value
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Priority `steps` blanket-rule steps above this one
    ///
    /// Saturates at [`RulePriority::MAX`]; a saturated collision is caught
    /// by catalog validation.
    pub fn stepped(self, steps: usize) -> RulePriority {
        let raw = u32::from(self.0) + u32::from(Self::STEP) * steps as u32;
        RulePriority(raw.min(u32::from(Self::MAX)) as u16)
    }
}

impl fmt::Display for RulePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ordered, directional ACL rule record
///
/// # Invariants
/// - Unique priority per direction within one segment's catalog (validated
///   by [`RuleCatalog::validate`], not by construction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub priority: RulePriority,
    pub protocol: Protocol,
    pub cidr: CidrBlock,
    pub direction: Direction,
    pub action: RuleAction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub port_range: Option<PortRange>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icmp: Option<IcmpTypeCode>,
}

/// Blanket rules over all protocols for a list of source CIDRs
///
/// Produces a symmetric inbound/outbound pair per CIDR. Both directions of
/// a pair share the same priority, stepping by [`RulePriority::STEP`] from
/// `base` per CIDR, so composing a second intent requires a base offset
/// clear of the first.
pub fn blanket_rules(action: RuleAction, cidrs: &[CidrBlock], base: RulePriority) -> Vec<AclRule> {
    cidrs
        .iter()
        .enumerate()
        .flat_map(|(idx, cidr)| {
            let priority = base.stepped(idx);
            [Direction::Inbound, Direction::Outbound].map(|direction| AclRule {
                priority,
                protocol: Protocol::All,
                cidr: *cidr,
                direction,
                action,
                port_range: None,
                icmp: None,
            })
        })
        .collect()
}

/// The fixed SSH allow intent: TCP 22 from anywhere, both directions
pub fn ssh_rules() -> Vec<AclRule> {
    [Direction::Inbound, Direction::Outbound]
        .map(|direction| AclRule {
            priority: RulePriority::SSH,
            protocol: Protocol::Tcp,
            cidr: CidrBlock::ANY,
            direction,
            action: RuleAction::Allow,
            port_range: Some(PortRange::single(22)),
            icmp: Some(IcmpTypeCode {
                icmp_type: 22,
                code: -1,
            }),
        })
        .to_vec()
}

/// The fixed VPN intent: allow everything, both directions
pub fn vpn_rules() -> Vec<AclRule> {
    [Direction::Inbound, Direction::Outbound]
        .map(|direction| AclRule {
            priority: RulePriority::VPN,
            protocol: Protocol::All,
            cidr: CidrBlock::ANY,
            direction,
            action: RuleAction::Allow,
            port_range: None,
            icmp: None,
        })
        .to_vec()
}

/// The terminal deny-everything sentinel pair
///
/// The rule evaluation model has no implicit default, so every catalog
/// needs this pair (or an equivalent) as its catch-all.
pub fn deny_all_rules() -> Vec<AclRule> {
    [Direction::Inbound, Direction::Outbound]
        .map(|direction| AclRule {
            priority: RulePriority::DENY_ALL,
            protocol: Protocol::All,
            cidr: CidrBlock::ANY,
            direction,
            action: RuleAction::Deny,
            port_range: None,
            icmp: None,
        })
        .to_vec()
}

/// Ordered rule catalog for one network segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCatalog {
    rules: Vec<AclRule>,
}

impl RuleCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an intent's rules, preserving order
    pub fn with(mut self, rules: Vec<AclRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// The rules in evaluation-independent declaration order
    pub fn rules(&self) -> &[AclRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate the per-direction priority uniqueness invariant
    ///
    /// The builders never check collisions themselves; this runs before a
    /// catalog is turned into ACL entries so that a bad composition fails
    /// at plan-construction time instead of at the provider.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert((rule.direction, rule.priority)) {
                return Err(CatalogError::DuplicatePriority {
                    direction: rule.direction,
                    priority: rule.priority,
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<AclRule>> for RuleCatalog {
    fn from(rules: Vec<AclRule>) -> Self {
        Self { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cidrs(specs: &[&str]) -> Vec<CidrBlock> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_blanket_rules_symmetric_pairs() {
        let base = RulePriority::new(10).unwrap();
        let rules = blanket_rules(
            RuleAction::Allow,
            &cidrs(&["10.66.0.32/27", "10.66.0.64/28", "10.66.0.96/28"]),
            base,
        );

        assert_eq!(rules.len(), 6);
        for pair in rules.chunks(2) {
            assert_eq!(pair[0].direction, Direction::Inbound);
            assert_eq!(pair[1].direction, Direction::Outbound);
            assert_eq!(pair[0].priority, pair[1].priority);
            assert_eq!(pair[0].cidr, pair[1].cidr);
        }

        let priorities: Vec<u16> = rules.iter().map(|r| r.priority.value()).collect();
        assert_eq!(priorities, vec![10, 10, 20, 20, 30, 30]);
    }

    #[test]
    fn test_blanket_rules_respect_base_offset() {
        let base = RulePriority::new(20).unwrap();
        let rules = blanket_rules(RuleAction::Allow, &cidrs(&["10.66.0.0/24"]), base);

        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.priority.value() == 20));
        assert!(rules.iter().all(|r| r.action == RuleAction::Allow));
        assert!(rules.iter().all(|r| r.protocol == Protocol::All));
    }

    #[test]
    fn test_ssh_rules_literal() {
        let rules = ssh_rules();
        assert_eq!(rules.len(), 2);

        let inbound: Vec<_> = rules
            .iter()
            .filter(|r| r.direction == Direction::Inbound)
            .collect();
        let outbound: Vec<_> = rules
            .iter()
            .filter(|r| r.direction == Direction::Outbound)
            .collect();
        assert_eq!(inbound.len(), 1);
        assert_eq!(outbound.len(), 1);

        for rule in &rules {
            assert_eq!(rule.protocol, Protocol::Tcp);
            assert_eq!(rule.port_range, Some(PortRange::single(22)));
            assert_eq!(rule.cidr, CidrBlock::ANY);
            assert_eq!(rule.action, RuleAction::Allow);
            assert_eq!(rule.priority, RulePriority::SSH);
        }
    }

    #[test]
    fn test_deny_all_sentinel() {
        let rules = deny_all_rules();
        assert_eq!(rules.len(), 2);
        for rule in &rules {
            assert_eq!(rule.priority, RulePriority::DENY_ALL);
            assert_eq!(rule.action, RuleAction::Deny);
            assert_eq!(rule.protocol, Protocol::All);
            assert_eq!(rule.cidr, CidrBlock::ANY);
        }
    }

    #[test]
    fn test_vpn_rules_literal() {
        let rules = vpn_rules();
        assert_eq!(rules.len(), 2);
        for rule in &rules {
            assert_eq!(rule.priority, RulePriority::VPN);
            assert_eq!(rule.action, RuleAction::Allow);
            assert_eq!(rule.protocol, Protocol::All);
        }
    }

    #[test]
    fn test_priority_validation() {
        assert!(RulePriority::new(1).is_ok());
        assert!(RulePriority::new(32766).is_ok());
        assert!(RulePriority::new(0).is_err());
        assert!(RulePriority::new(32767).is_err());
    }

    #[test]
    fn test_catalog_validates_clean_composition() {
        let base = RulePriority::new(10).unwrap();
        let catalog = RuleCatalog::new()
            .with(ssh_rules())
            .with(blanket_rules(
                RuleAction::Allow,
                &cidrs(&["10.66.0.32/27", "10.66.0.64/28"]),
                base,
            ))
            .with(deny_all_rules());

        assert_eq!(catalog.len(), 8);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_catalog_rejects_reused_base_offset() {
        let base = RulePriority::new(10).unwrap();
        let catalog = RuleCatalog::new()
            .with(blanket_rules(
                RuleAction::Deny,
                &cidrs(&["10.66.0.80/28"]),
                base,
            ))
            .with(blanket_rules(RuleAction::Allow, &cidrs(&["10.66.0.0/24"]), base));

        let err = catalog.validate().unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicatePriority {
                direction: Direction::Inbound,
                priority: RulePriority::new(10).unwrap(),
            }
        );
    }

    #[test]
    fn test_rule_serde_omits_absent_fields() {
        let rule = &deny_all_rules()[0];
        let json = serde_json::to_value(rule).unwrap();
        assert!(json.get("port_range").is_none());
        assert!(json.get("icmp").is_none());
        assert_eq!(json["priority"], 999);
    }
}
