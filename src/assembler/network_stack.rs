// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Stack Assembly
//!
//! Turns a validated posture into the network stack: the network itself,
//! its gateway, one subnet + route table + default route per segment, the
//! per-segment ACLs with one entry per catalog rule, the security groups,
//! and the private DNS zone. Subnet, route-table, and security-group
//! identifiers are exported under stable names for dependent stacks.

use tracing::{debug, info};

use super::resource::{Output, Resource, ResourceKind, Stack};
use crate::domain::acl::Direction;
use crate::domain::network::CidrBlock;
use crate::errors::PlanResult;
use crate::posture::NetworkPosture;
use crate::value::{Attribute, Value};

/// Assemble the network stack from a posture
///
/// Validates the posture first, so overlapping segments, colliding rule
/// priorities, or stray catalog keys fail here rather than at the
/// provider.
pub fn build_network_stack(name: &str, posture: &NetworkPosture) -> PlanResult<Stack> {
    posture.validate()?;

    let mut stack = Stack::new(name);
    let network = posture.network_name.as_str();
    let network_ref = Value::reference(network, Attribute::Id);

    stack.push(
        Resource::new(
            network,
            ResourceKind::Network {
                cidr: posture.cidr,
                enable_dns_support: true,
                enable_dns_hostnames: true,
            },
        )
        .with_name_tag(network),
    );

    stack.push(
        Resource::new("InternetGateway", ResourceKind::InternetGateway)
            .with_name_tag(format!("{network}-igw")),
    );
    stack.push(Resource::new(
        "IGWAttachment",
        ResourceKind::GatewayAttachment {
            network: network_ref.clone(),
            gateway: Value::reference("InternetGateway", Attribute::Id),
        },
    ));

    // Subnet, route table, association, and default route per segment
    for segment in &posture.segments {
        let subnet_id = segment.name.clone();
        let route_table_id = format!("{}-rt", segment.name);

        stack.push(
            Resource::new(
                &subnet_id,
                ResourceKind::Subnet {
                    network: network_ref.clone(),
                    cidr: segment.cidr,
                    map_public_ip_on_launch: true,
                },
            )
            .with_name_tag(&segment.name),
        );

        stack.push(
            Resource::new(
                &route_table_id,
                ResourceKind::RouteTable {
                    network: network_ref.clone(),
                },
            )
            .with_name_tag(&route_table_id),
        );

        stack.push(Resource::new(
            format!("RTAssociation-{}", segment.name),
            ResourceKind::RouteTableAssociation {
                subnet: Value::reference(&subnet_id, Attribute::Id),
                route_table: Value::reference(&route_table_id, Attribute::Id),
            },
        ));

        stack.push(Resource::new(
            format!("Route-IGW-{}", segment.name),
            ResourceKind::Route {
                route_table: Value::reference(&route_table_id, Attribute::Id),
                destination: CidrBlock::ANY,
                gateway: Value::reference("InternetGateway", Attribute::Id),
            },
        ));
    }

    // Network ACL, association, and one entry per catalog rule
    for segment in &posture.segments {
        let Some(catalog) = posture.catalogs.get(&segment.name) else {
            continue;
        };

        let acl_id = format!("NAcl-{}", segment.name);
        stack.push(
            Resource::new(
                &acl_id,
                ResourceKind::NetworkAcl {
                    network: network_ref.clone(),
                },
            )
            .with_name_tag(format!("{}-nacl", segment.name)),
        );

        stack.push(Resource::new(
            format!("NAclAssociation-{}", segment.name),
            ResourceKind::NetworkAclAssociation {
                subnet: Value::reference(&segment.name, Attribute::Id),
                network_acl: Value::reference(&acl_id, Attribute::Id),
            },
        ));

        for (index, rule) in catalog.rules().iter().enumerate() {
            let direction = match rule.direction {
                Direction::Inbound => "Inbound",
                Direction::Outbound => "Outbound",
            };
            stack.push(Resource::new(
                format!("Nacl{direction}Rule-{}-{index}", segment.name),
                ResourceKind::NetworkAclEntry {
                    network_acl: Value::reference(&acl_id, Attribute::Id),
                    rule: rule.clone(),
                },
            ));
        }

        debug!(segment = %segment.name, rules = catalog.len(), "assembled segment ACL");
    }

    for group in &posture.security_groups {
        stack.push(
            Resource::new(
                &group.name,
                ResourceKind::SecurityGroup {
                    network: network_ref.clone(),
                    policy: group.clone(),
                },
            )
            .with_name_tag(&group.name),
        );
    }

    stack.push(Resource::new(
        "PrivateHostedZone",
        ResourceKind::PrivateDnsZone {
            network: network_ref.clone(),
            name: posture.zone.name.clone(),
            comment: posture.zone.comment.clone(),
        },
    ));
    for record in &posture.zone.records {
        stack.push(Resource::new(
            format!("ARecord-{}", record.name.as_str().replace('.', "-")),
            ResourceKind::DnsARecord {
                zone: Value::reference("PrivateHostedZone", Attribute::Id),
                record: record.clone(),
            },
        ));
    }

    // Outputs: identifiers dependent stacks import by export name
    stack.push_output(Output::new(
        "NetworkId",
        network_ref,
        "Network ID",
    ));

    for group in &posture.security_groups {
        stack.push_output(
            Output::new(
                format!("SecurityGroup-{}", group.name),
                Value::reference(&group.name, Attribute::Id),
                format!("Security group {} ID", group.name),
            )
            .exported(format!("{}-Id", group.name)),
        );
    }

    stack.push_output(Output::new(
        "HostedZoneId",
        Value::reference("PrivateHostedZone", Attribute::Id),
        "Private hosted zone ID",
    ));

    for segment in &posture.segments {
        stack.push_output(
            Output::new(
                format!("Subnet-{}-Id", segment.name),
                Value::reference(&segment.name, Attribute::Id),
                format!("Subnet {} ID", segment.name),
            )
            .exported(format!("{}-SubnetId", segment.name)),
        );
        stack.push_output(
            Output::new(
                format!("RouteTable-{}-Id", segment.name),
                Value::reference(format!("{}-rt", segment.name), Attribute::Id),
                format!("Route table {} ID", segment.name),
            )
            .exported(format!("{}-RouteTableId", segment.name)),
        );
    }

    info!(
        stack = name,
        resources = stack.resources.len(),
        outputs = stack.outputs.len(),
        "assembled network stack"
    );

    Ok(stack)
}
