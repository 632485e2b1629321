// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarative Resource Graph
//!
//! The serializable output of plan construction: typed resources with
//! logical ids, tags, and dependency edges, grouped into stacks that
//! publish named outputs. The external provisioning engine diffs this
//! graph against live state and applies changes; nothing here issues a
//! provider call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bootstrap::BootstrapPlan;
use crate::domain::acl::AclRule;
use crate::domain::dns::{DnsRecord, RecordName};
use crate::domain::instance::MachineImage;
use crate::domain::network::CidrBlock;
use crate::domain::security_group::SecurityGroupPolicy;
use crate::value::Value;

/// One provisionable construct, by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    /// The virtual network itself
    Network {
        cidr: CidrBlock,
        enable_dns_support: bool,
        enable_dns_hostnames: bool,
    },
    /// Gateway to the outside
    InternetGateway,
    /// Attachment binding a gateway to a network
    GatewayAttachment { network: Value, gateway: Value },
    /// One segment's subnet
    Subnet {
        network: Value,
        cidr: CidrBlock,
        map_public_ip_on_launch: bool,
    },
    /// Per-segment route table
    RouteTable { network: Value },
    /// Association binding a route table to a subnet
    RouteTableAssociation { subnet: Value, route_table: Value },
    /// A route entry in a route table
    Route {
        route_table: Value,
        destination: CidrBlock,
        gateway: Value,
    },
    /// Per-segment network ACL
    NetworkAcl { network: Value },
    /// Association binding an ACL to a subnet
    NetworkAclAssociation { subnet: Value, network_acl: Value },
    /// One ordered rule inside an ACL
    NetworkAclEntry { network_acl: Value, rule: AclRule },
    /// Stateful security group with its policy
    SecurityGroup {
        network: Value,
        policy: SecurityGroupPolicy,
    },
    /// Private DNS zone scoped to the network
    PrivateDnsZone {
        network: Value,
        name: RecordName,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        comment: Option<String>,
    },
    /// Address record in a private zone
    DnsARecord { zone: Value, record: DnsRecord },
    /// Managed secret holding a generated credential pair
    Secret {
        name: String,
        secret_string_template: serde_json::Value,
        generate_string_key: String,
    },
    /// A virtual machine
    Instance {
        machine_class: String,
        subnet: Value,
        security_group: Value,
        image: MachineImage,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        key_pair: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        user_data: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        init: Option<BootstrapPlan>,
    },
}

/// A resource in a stack: logical id, kind, tags, dependency edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(flatten)]
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            tags: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Add an arbitrary tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add the conventional `Name` tag
    pub fn with_name_tag(self, name: impl Into<String>) -> Self {
        self.with_tag("Name", name)
    }

    /// Require other resources in the same stack to exist first
    pub fn with_depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// Named value a stack publishes, optionally exported for other stacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub id: String,
    pub value: Value,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub export: Option<String>,
}

impl Output {
    pub fn new(id: impl Into<String>, value: Value, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value,
            description: description.into(),
            export: None,
        }
    }

    /// Publish the output under a stable export name
    pub fn exported(mut self, name: impl Into<String>) -> Self {
        self.export = Some(name.into());
        self
    }
}

/// One provisioning batch: resources plus published outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub depends_on: Vec<String>,
    pub resources: Vec<Resource>,
    pub outputs: Vec<Output>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Require another stack to be applied first
    pub fn add_dependency(&mut self, stack: impl Into<String>) {
        self.depends_on.push(stack.into());
    }

    pub fn push(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn push_output(&mut self, output: Output) {
        self.outputs.push(output);
    }

    /// Look up a resource by logical id
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Look up an output by logical id
    pub fn output(&self, id: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id == id)
    }

    /// Look up an output by export name
    pub fn export(&self, name: &str) -> Option<&Output> {
        self.outputs
            .iter()
            .find(|o| o.export.as_deref() == Some(name))
    }

    /// Every export name this stack publishes
    pub fn export_names(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter_map(|o| o.export.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Attribute;

    #[test]
    fn test_resource_serde_is_flat() {
        let resource = Resource::new(
            "r-ventas",
            ResourceKind::Subnet {
                network: Value::reference("ruwu", Attribute::Id),
                cidr: "10.66.0.0/27".parse().unwrap(),
                map_public_ip_on_launch: true,
            },
        )
        .with_name_tag("r-ventas");

        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "subnet");
        assert_eq!(json["id"], "r-ventas");
        assert_eq!(json["cidr"], "10.66.0.0/27");
        assert_eq!(json["tags"]["Name"], "r-ventas");
    }

    #[test]
    fn test_stack_export_lookup() {
        let mut stack = Stack::new("ruwu-network");
        stack.push_output(
            Output::new(
                "Subnet-r-ventas-Id",
                Value::reference("r-ventas", Attribute::Id),
                "Subnet r-ventas ID",
            )
            .exported("r-ventas-SubnetId"),
        );
        stack.push_output(Output::new(
            "NetworkId",
            Value::reference("ruwu", Attribute::Id),
            "Network ID",
        ));

        assert!(stack.export("r-ventas-SubnetId").is_some());
        assert!(stack.export("NetworkId").is_none()); // Not exported
        assert_eq!(stack.export_names(), vec!["r-ventas-SubnetId"]);
    }
}
