// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Rule Catalog Builder
//!
//! proptest verification of the generator contract: for every CIDR list
//! and base offset, the blanket builder emits exactly 2N rules in
//! symmetric pairs stepping by 10 from the base, and composing the fixed
//! intents around it always yields a collision-free catalog.

use proptest::prelude::*;
use std::net::Ipv4Addr;

use ruwu_infrastructure::domain::{
    blanket_rules, deny_all_rules, ssh_rules, CidrBlock, Direction, Protocol, RuleAction,
    RuleCatalog, RulePriority,
};

fn arb_cidrs(max: usize) -> impl Strategy<Value = Vec<CidrBlock>> {
    prop::collection::vec((0u8..=255, 0u8..=255), 1..=max).prop_map(|octets| {
        octets
            .into_iter()
            .map(|(a, b)| {
                CidrBlock::new(Ipv4Addr::new(10, a, b, 0), 24).expect("canonical /24 network")
            })
            .collect()
    })
}

fn arb_action() -> impl Strategy<Value = RuleAction> {
    prop_oneof![Just(RuleAction::Allow), Just(RuleAction::Deny)]
}

proptest! {
    /// 2N rules, one inbound/outbound pair per CIDR
    #[test]
    fn blanket_emits_two_rules_per_cidr(
        cidrs in arb_cidrs(20),
        action in arb_action(),
        base in 1u16..=30_000,
    ) {
        let rules = blanket_rules(action, &cidrs, RulePriority::new(base).unwrap());

        prop_assert_eq!(rules.len(), 2 * cidrs.len());
        for direction in [Direction::Inbound, Direction::Outbound] {
            prop_assert_eq!(
                rules.iter().filter(|r| r.direction == direction).count(),
                cidrs.len()
            );
        }
    }

    /// Pairs share a priority; priorities step by exactly 10 from the base
    #[test]
    fn blanket_priorities_step_from_base(
        cidrs in arb_cidrs(20),
        action in arb_action(),
        base in 1u16..=30_000,
    ) {
        let rules = blanket_rules(action, &cidrs, RulePriority::new(base).unwrap());

        for (idx, pair) in rules.chunks(2).enumerate() {
            prop_assert_eq!(pair[0].priority, pair[1].priority);
            prop_assert_eq!(&pair[0].cidr, &pair[1].cidr);
            prop_assert_eq!(
                pair[0].priority.value(),
                base + RulePriority::STEP * idx as u16
            );
        }
    }

    /// Every emitted blanket rule covers all protocols with the requested action
    #[test]
    fn blanket_rules_cover_all_protocols(
        cidrs in arb_cidrs(10),
        action in arb_action(),
        base in 1u16..=30_000,
    ) {
        let rules = blanket_rules(action, &cidrs, RulePriority::new(base).unwrap());

        for rule in &rules {
            prop_assert_eq!(rule.protocol, Protocol::All);
            prop_assert_eq!(rule.action, action);
            prop_assert!(rule.port_range.is_none());
            prop_assert!(rule.icmp.is_none());
        }
    }

    /// The canonical composition (SSH, blanket, deny-all) never collides
    /// when the base offset clears the fixed intents
    #[test]
    fn canonical_composition_validates(
        cidrs in arb_cidrs(8),
        base in 10u16..=900,
    ) {
        let catalog = RuleCatalog::new()
            .with(ssh_rules())
            .with(blanket_rules(
                RuleAction::Allow,
                &cidrs,
                RulePriority::new(base).unwrap(),
            ))
            .with(deny_all_rules());

        prop_assert!(catalog.validate().is_ok());
    }
}
