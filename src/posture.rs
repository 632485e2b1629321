// Copyright (c) 2025 - Cowboy AI, Inc.
//! Security Posture Table
//!
//! The complete security configuration of one network as an explicit value:
//! segments, per-segment rule catalogs, security-group policies, and the
//! private DNS zone. Nothing here is ambient state; a posture is built by a
//! constructor and passed into plan construction, and
//! [`NetworkPosture::validate`] runs every eager check before a single
//! resource is emitted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::domain::{
    blanket_rules, deny_all_rules, ssh_rules, validate_segments, CidrBlock, DnsRecord, DnsZone,
    InstanceSpec, NetworkSegment, RecordName, RuleAction, RuleCatalog, RulePriority,
    SecurityGroupPolicy,
};
use crate::errors::{PlanError, PlanResult};

/// Static mapping from a network's segments to their rule catalogs,
/// security-group policies, and DNS records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPosture {
    pub network_name: String,
    pub cidr: CidrBlock,
    pub segments: Vec<NetworkSegment>,
    /// Segment name to its rule catalog
    pub catalogs: BTreeMap<String, RuleCatalog>,
    pub security_groups: Vec<SecurityGroupPolicy>,
    pub zone: DnsZone,
}

impl NetworkPosture {
    /// Look up a segment by name
    pub fn segment(&self, name: &str) -> Option<&NetworkSegment> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// Look up a security-group policy by name
    pub fn security_group(&self, name: &str) -> Option<&SecurityGroupPolicy> {
        self.security_groups.iter().find(|g| g.name == name)
    }

    /// Run every eager validation over the posture
    ///
    /// # Rules
    /// - Segment names, CIDRs, and ACL base priorities obey
    ///   [`validate_segments`]
    /// - Every rule catalog is keyed by a declared segment and passes
    ///   [`RuleCatalog::validate`]
    /// - Security-group names are unique
    /// - Every DNS record belongs to the zone
    pub fn validate(&self) -> PlanResult<()> {
        validate_segments(&self.segments)?;

        for (segment, catalog) in &self.catalogs {
            if self.segment(segment).is_none() {
                return Err(PlanError::UnknownCatalogSegment(segment.clone()));
            }
            catalog
                .validate()
                .map_err(|source| PlanError::InvalidCatalog {
                    segment: segment.clone(),
                    source,
                })?;
        }

        for (idx, group) in self.security_groups.iter().enumerate() {
            if self.security_groups[..idx].iter().any(|g| g.name == group.name) {
                return Err(PlanError::DuplicateSecurityGroup(group.name.clone()));
            }
        }

        for record in &self.zone.records {
            if !record.name.is_within(&self.zone.name) {
                return Err(PlanError::RecordOutsideZone {
                    record: record.name.to_string(),
                    zone: self.zone.name.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// The ruwu network's posture
///
/// Five segments carved out of `10.66.0.0/24`, each with an SSH-open,
/// default-deny catalog. Inter-segment reachability is expressed against
/// the segment table itself, so renumbering a segment renumbers every rule
/// that references it.
pub fn default_posture() -> PlanResult<NetworkPosture> {
    let cidr: CidrBlock = "10.66.0.0/24".parse()?;

    let ventas = NetworkSegment::new("r-ventas", "10.66.0.0/27".parse()?, RulePriority::new(500)?);
    let ti = NetworkSegment::new("r-ti", "10.66.0.32/27".parse()?, RulePriority::new(400)?);
    let datacenter =
        NetworkSegment::new("r-datacenter", "10.66.0.64/28".parse()?, RulePriority::new(300)?);
    let visitas =
        NetworkSegment::new("r-visitas", "10.66.0.80/28".parse()?, RulePriority::new(200)?);
    let rrhh = NetworkSegment::new("r-rrhh", "10.66.0.96/28".parse()?, RulePriority::new(100)?);

    let base = RulePriority::new(10)?;
    let above = RulePriority::new(20)?;

    let mut catalogs = BTreeMap::new();
    catalogs.insert(
        rrhh.name.clone(),
        RuleCatalog::new()
            .with(ssh_rules())
            .with(blanket_rules(
                RuleAction::Allow,
                &[ti.cidr, datacenter.cidr, rrhh.cidr],
                base,
            ))
            .with(deny_all_rules()),
    );
    catalogs.insert(
        visitas.name.clone(),
        RuleCatalog::new()
            .with(ssh_rules())
            .with(blanket_rules(RuleAction::Allow, &[visitas.cidr, ti.cidr], base))
            .with(deny_all_rules()),
    );
    catalogs.insert(
        datacenter.name.clone(),
        RuleCatalog::new()
            .with(ssh_rules())
            .with(blanket_rules(RuleAction::Deny, &[visitas.cidr], base))
            .with(blanket_rules(RuleAction::Allow, &[cidr], above))
            .with(deny_all_rules()),
    );
    catalogs.insert(
        ti.name.clone(),
        RuleCatalog::new()
            .with(ssh_rules())
            .with(blanket_rules(RuleAction::Allow, &[cidr], base))
            .with(deny_all_rules()),
    );
    catalogs.insert(
        ventas.name.clone(),
        RuleCatalog::new()
            .with(ssh_rules())
            .with(blanket_rules(
                RuleAction::Allow,
                &[ti.cidr, datacenter.cidr, ventas.cidr],
                base,
            ))
            .with(deny_all_rules()),
    );

    let zone = DnsZone::new(RecordName::new("ruwu.com")?)
        .with_comment("Private hosted zone for ruwu.com")
        .with_record(DnsRecord::a(
            RecordName::new("ruwu.com")?,
            Ipv4Addr::new(10, 66, 0, 74),
        ))
        .with_record(DnsRecord::a(
            RecordName::new("ldap.ruwu.com")?,
            Ipv4Addr::new(10, 66, 0, 69),
        ));

    Ok(NetworkPosture {
        network_name: "ruwu".to_string(),
        cidr,
        segments: vec![ventas, ti, datacenter, visitas, rrhh],
        catalogs,
        security_groups: vec![SecurityGroupPolicy::new(
            "r-allow-everything",
            "First security group with allow all traffic",
        )
        .allow_all_inbound()],
        zone,
    })
}

/// The ruwu instance fleet: directory services, the HR web host, and the
/// sales workstation
pub fn default_fleet() -> Vec<InstanceSpec> {
    vec![
        InstanceSpec::new("r-ldap", "t2.micro", "r-datacenter", "r-allow-everything")
            .with_image("ami-0c24ed26a1382e217")
            .with_key_pair("Llaves globales"),
        InstanceSpec::new("r-RRHH-web", "t2.micro", "r-datacenter", "r-allow-everything")
            .with_key_pair("Llaves globales"),
        InstanceSpec::new("r-ventas-1", "t2.micro", "r-ventas", "r-allow-everything")
            .with_image("ami-09a531af1a86baf16")
            .with_key_pair("Llaves globales"),
    ]
}
