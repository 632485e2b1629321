// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for the rule catalog builder
//!
//! These verify the generator contract end to end: symmetric pair
//! production, priority stepping from the caller-supplied base, the fixed
//! intents' literal content, and eager collision detection over composed
//! catalogs.

use pretty_assertions::assert_eq;
use test_case::test_case;

use ruwu_infrastructure::domain::{
    blanket_rules, deny_all_rules, ssh_rules, vpn_rules, CidrBlock, Direction, Protocol,
    RuleAction, RuleCatalog, RulePriority,
};

fn cidr_list(count: usize) -> Vec<CidrBlock> {
    (0..count)
        .map(|i| format!("10.{i}.0.0/16").parse().unwrap())
        .collect()
}

fn priority(value: u16) -> RulePriority {
    RulePriority::new(value).unwrap()
}

#[test_case(RuleAction::Allow, 1, 10; "one allow from base ten")]
#[test_case(RuleAction::Allow, 3, 10; "three allows from base ten")]
#[test_case(RuleAction::Deny, 1, 10; "one deny from base ten")]
#[test_case(RuleAction::Allow, 2, 20; "two allows from offset base")]
#[test_case(RuleAction::Deny, 5, 100; "five denies from high base")]
fn blanket_rules_produce_symmetric_pairs(action: RuleAction, count: usize, base: u16) {
    let rules = blanket_rules(action, &cidr_list(count), priority(base));

    assert_eq!(rules.len(), 2 * count);

    for (idx, pair) in rules.chunks(2).enumerate() {
        assert_eq!(pair[0].direction, Direction::Inbound);
        assert_eq!(pair[1].direction, Direction::Outbound);
        assert_eq!(pair[0].priority, pair[1].priority);
        assert_eq!(pair[0].cidr, pair[1].cidr);
        assert_eq!(pair[0].priority.value(), base + 10 * idx as u16);
        assert_eq!(pair[0].action, action);
        assert_eq!(pair[0].protocol, Protocol::All);
    }
}

#[test]
fn blanket_priorities_increase_strictly_per_direction() {
    let rules = blanket_rules(RuleAction::Allow, &cidr_list(6), priority(10));

    for direction in [Direction::Inbound, Direction::Outbound] {
        let priorities: Vec<u16> = rules
            .iter()
            .filter(|r| r.direction == direction)
            .map(|r| r.priority.value())
            .collect();
        assert_eq!(priorities, vec![10, 20, 30, 40, 50, 60]);
    }
}

#[test]
fn ssh_intent_is_literal() {
    let rules = ssh_rules();
    assert_eq!(rules.len(), 2);

    assert_eq!(
        rules
            .iter()
            .filter(|r| r.direction == Direction::Inbound)
            .count(),
        1
    );
    assert_eq!(
        rules
            .iter()
            .filter(|r| r.direction == Direction::Outbound)
            .count(),
        1
    );

    for rule in &rules {
        assert_eq!(rule.protocol, Protocol::Tcp);
        assert_eq!(rule.action, RuleAction::Allow);
        assert_eq!(rule.cidr.to_string(), "0.0.0.0/0");
        let ports = rule.port_range.expect("ssh rule carries a port range");
        assert_eq!((ports.from(), ports.to()), (22, 22));
    }
}

#[test]
fn deny_sentinel_sorts_after_every_allow() {
    let catalog = RuleCatalog::new()
        .with(ssh_rules())
        .with(blanket_rules(RuleAction::Allow, &cidr_list(4), priority(10)))
        .with(deny_all_rules());

    for direction in [Direction::Inbound, Direction::Outbound] {
        let mut rules: Vec<_> = catalog
            .rules()
            .iter()
            .filter(|r| r.direction == direction)
            .collect();
        rules.sort_by_key(|r| r.priority);

        let last = rules.last().expect("catalog is not empty");
        assert_eq!(last.action, RuleAction::Deny);
        assert_eq!(last.priority, RulePriority::DENY_ALL);
        assert!(rules[..rules.len() - 1]
            .iter()
            .all(|r| r.priority < RulePriority::DENY_ALL));
    }
}

#[test]
fn vpn_intent_is_an_allow_all_pair() {
    let rules = vpn_rules();
    assert_eq!(rules.len(), 2);
    for rule in &rules {
        assert_eq!(rule.priority, RulePriority::VPN);
        assert_eq!(rule.protocol, Protocol::All);
        assert_eq!(rule.action, RuleAction::Allow);
        assert_eq!(rule.cidr.to_string(), "0.0.0.0/0");
        assert!(rule.port_range.is_none());
    }
}

#[test]
fn builders_do_not_deduplicate() {
    // Composing the same intent twice is the caller's mistake; the builder
    // emits both and validation catches it.
    let catalog = RuleCatalog::new()
        .with(blanket_rules(RuleAction::Allow, &cidr_list(1), priority(10)))
        .with(blanket_rules(RuleAction::Allow, &cidr_list(1), priority(10)));

    assert_eq!(catalog.len(), 4);
    assert!(catalog.validate().is_err());
}

#[test_case(10, 20; "adjacent bases clear of each other")]
#[test_case(10, 50; "distant bases")]
fn distinct_bases_compose_cleanly(first: u16, second: u16) {
    let catalog = RuleCatalog::new()
        .with(blanket_rules(
            RuleAction::Deny,
            &cidr_list(1),
            priority(first),
        ))
        .with(blanket_rules(
            RuleAction::Allow,
            &cidr_list(1),
            priority(second),
        ))
        .with(deny_all_rules());

    assert!(catalog.validate().is_ok());
}
