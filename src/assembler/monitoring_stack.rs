// Copyright (c) 2025 - Cowboy AI, Inc.
//! Monitoring Stack Assembly
//!
//! The SNMP/Logstash batch: a managed secret holding the generated
//! read-only credential pair, two SNMP client machines, and the Logstash
//! aggregation server whose pipeline is pointed at the clients' private
//! addresses. The clients boot before the server so the addresses the
//! server substitutes at boot already exist.

use serde_json::json;
use tracing::info;

use super::instance_stack::emit_instances;
use super::resource::{Resource, ResourceKind, Stack};
use crate::bootstrap::{compose, BootstrapRole, StackContext};
use crate::domain::InstanceSpec;
use crate::errors::PlanResult;
use crate::posture::NetworkPosture;
use crate::value::{Attribute, Value};

/// Name of the managed secret the monitoring hosts read at boot
pub const SNMP_SECRET_NAME: &str = "SNMPSecret";

const SECRET_RESOURCE: &str = "r-snmp-secret";
const CLIENT_NAMES: [&str; 2] = ["r-snmp-instance-1", "r-snmp-instance-2"];
const SERVER_NAME: &str = "r-logstash-server";

fn monitoring_spec(name: &str) -> InstanceSpec {
    InstanceSpec::new(name, "t2.micro", "r-datacenter", "r-allow-everything")
        .with_key_pair("Llaves globales")
}

/// Assemble the monitoring stack
pub fn build_monitoring_stack(
    name: &str,
    posture: &NetworkPosture,
    region: &str,
    network_stack: &str,
) -> PlanResult<Stack> {
    posture.validate()?;

    let ctx = StackContext::new(name, region);
    let mut stack = Stack::new(name);
    stack.add_dependency(network_stack);

    stack.push(Resource::new(
        SECRET_RESOURCE,
        ResourceKind::Secret {
            name: SNMP_SECRET_NAME.to_string(),
            secret_string_template: json!({ "username": "readonlyuser" }),
            generate_string_key: "password".to_string(),
        },
    ));

    let mut clients = Vec::with_capacity(CLIENT_NAMES.len());
    for client_name in CLIENT_NAMES {
        clients.push(compose(
            monitoring_spec(client_name),
            BootstrapRole::Client {
                secret_id: SNMP_SECRET_NAME.to_string(),
            },
            &ctx,
        )?);
    }
    // Clients fetch the credential pair at boot, so the secret must exist first
    emit_instances(&mut stack, posture, &clients, &[SECRET_RESOURCE])?;

    let server = compose(
        monitoring_spec(SERVER_NAME),
        BootstrapRole::Server {
            secret_id: SNMP_SECRET_NAME.to_string(),
            monitored_hosts: CLIENT_NAMES
                .iter()
                .map(|client| Value::reference(*client, Attribute::PrivateIp))
                .collect(),
        },
        &ctx,
    )?;
    let server_deps: Vec<&str> = std::iter::once(SECRET_RESOURCE)
        .chain(CLIENT_NAMES)
        .collect();
    emit_instances(
        &mut stack,
        posture,
        std::slice::from_ref(&server),
        &server_deps,
    )?;

    info!(
        stack = name,
        clients = CLIENT_NAMES.len(),
        "assembled monitoring stack"
    );

    Ok(stack)
}
