// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Stack Assembly
//!
//! Turns instance specs into a stack of machine resources. Subnets and
//! security groups are consumed by export name from the network stack, so
//! an instance batch can be applied (and re-applied) independently of the
//! network definition.

use tracing::info;

use super::resource::{Output, Resource, ResourceKind, Stack};
use crate::domain::instance::{InstanceSpec, StartupScript};
use crate::errors::{PlanError, PlanResult};
use crate::posture::NetworkPosture;
use crate::value::{Attribute, Value};

/// Assemble an instance stack from a batch of specs
pub fn build_instance_stack(
    name: &str,
    posture: &NetworkPosture,
    specs: &[InstanceSpec],
    network_stack: &str,
) -> PlanResult<Stack> {
    posture.validate()?;

    let mut stack = Stack::new(name);
    stack.add_dependency(network_stack);
    emit_instances(&mut stack, posture, specs, &[])?;

    info!(
        stack = name,
        instances = specs.len(),
        "assembled instance stack"
    );

    Ok(stack)
}

/// Emit one instance resource plus its outputs per spec
///
/// Checks the batch invariants eagerly: unique logical names, declared
/// segment and security-group references, and well-formed bootstrap
/// metadata.
pub(super) fn emit_instances(
    stack: &mut Stack,
    posture: &NetworkPosture,
    specs: &[InstanceSpec],
    depends_on: &[&str],
) -> PlanResult<()> {
    for spec in specs {
        if stack.resource(&spec.name).is_some() {
            return Err(PlanError::DuplicateInstance(spec.name.clone()));
        }
        if posture.segment(&spec.segment).is_none() {
            return Err(PlanError::UnknownSegment {
                instance: spec.name.clone(),
                segment: spec.segment.clone(),
            });
        }
        if posture.security_group(&spec.security_group).is_none() {
            return Err(PlanError::UnknownSecurityGroup {
                instance: spec.name.clone(),
                group: spec.security_group.clone(),
            });
        }
        if let Some(plan) = &spec.bootstrap {
            plan.validate()?;
        }

        let mut resource = Resource::new(
            &spec.name,
            ResourceKind::Instance {
                machine_class: spec.machine_class.clone(),
                subnet: Value::import(format!("{}-SubnetId", spec.segment)),
                security_group: Value::import(format!("{}-Id", spec.security_group)),
                image: spec.image.clone(),
                key_pair: spec.key_pair.clone(),
                user_data: spec.startup_script.as_ref().map(StartupScript::render),
                init: spec.bootstrap.clone(),
            },
        )
        .with_name_tag(&spec.name);

        for (key, value) in &spec.tags {
            resource = resource.with_tag(key, value);
        }
        if !depends_on.is_empty() {
            resource = resource.with_depends_on(depends_on.iter().copied());
        }
        stack.push(resource);

        stack.push_output(Output::new(
            format!("{}-InstanceId", spec.name),
            Value::reference(&spec.name, Attribute::Id),
            format!("Instance ID for {}", spec.name),
        ));
        stack.push_output(Output::new(
            format!("{}-PrivateIp", spec.name),
            Value::reference(&spec.name, Attribute::PrivateIp),
            format!("Private IP for {}", spec.name),
        ));
    }

    Ok(())
}
