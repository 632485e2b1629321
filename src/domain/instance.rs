// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Specification
//!
//! An [`InstanceSpec`] is authored in configuration (or synthesized by the
//! bootstrap composer) and consumed exactly once by the topology assembler.
//! Specs are plain owned values: composition produces a new spec rather
//! than mutating a shared one, so two specs can never alias a bootstrap
//! plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bootstrap::BootstrapPlan;

/// Machine image selection
///
/// Falls back to the current default base image when no fixed image id is
/// pinned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineImage {
    /// Latest default base image at apply time
    #[default]
    DefaultBase,
    /// A pinned image identifier
    Fixed(String),
}

/// Startup script handed to the machine verbatim at first boot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupScript {
    shebang: String,
    commands: Vec<String>,
}

impl StartupScript {
    /// A Linux script that echoes commands and stops on first failure
    pub fn for_linux() -> Self {
        Self {
            shebang: "#!/bin/bash -xe".to_string(),
            commands: Vec::new(),
        }
    }

    /// Append a command
    pub fn add_command(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    /// Append a sequence of commands in order
    pub fn add_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for command in commands {
            self.add_command(command);
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Render the script as it will be written to the machine
    pub fn render(&self) -> String {
        let mut script = String::with_capacity(64);
        script.push_str(&self.shebang);
        for command in &self.commands {
            script.push('\n');
            script.push_str(command);
        }
        script.push('\n');
        script
    }
}

/// Declarative description of one virtual machine
///
/// # Invariants
/// - Logical name unique within a provisioning batch (validated by the
///   assembler)
/// - Bootstrap metadata attaches at most once; the composer refuses a spec
///   that already carries a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub name: String,
    pub machine_class: String,
    pub segment: String,
    pub security_group: String,
    #[serde(default)]
    pub image: MachineImage,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key_pair: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub startup_script: Option<StartupScript>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bootstrap: Option<BootstrapPlan>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub tags: BTreeMap<String, String>,
}

impl InstanceSpec {
    /// Create a minimal spec on the default base image
    pub fn new(
        name: impl Into<String>,
        machine_class: impl Into<String>,
        segment: impl Into<String>,
        security_group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            machine_class: machine_class.into(),
            segment: segment.into(),
            security_group: security_group.into(),
            image: MachineImage::DefaultBase,
            key_pair: None,
            startup_script: None,
            bootstrap: None,
            tags: BTreeMap::new(),
        }
    }

    /// Pin a fixed machine image
    pub fn with_image(mut self, image_id: impl Into<String>) -> Self {
        self.image = MachineImage::Fixed(image_id.into());
        self
    }

    /// Name the key pair granting access
    pub fn with_key_pair(mut self, key_pair: impl Into<String>) -> Self {
        self.key_pair = Some(key_pair.into());
        self
    }

    /// Provide a literal startup script
    pub fn with_startup_script(mut self, script: StartupScript) -> Self {
        self.startup_script = Some(script);
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Whether bootstrap metadata is already attached
    pub fn has_bootstrap(&self) -> bool {
        self.bootstrap.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_spec_defaults() {
        let spec = InstanceSpec::new("r-ldap", "t2.micro", "r-datacenter", "r-allow-everything");
        assert_eq!(spec.image, MachineImage::DefaultBase);
        assert!(spec.key_pair.is_none());
        assert!(!spec.has_bootstrap());
    }

    #[test]
    fn test_spec_builder() {
        let spec = InstanceSpec::new("r-ldap", "t2.micro", "r-datacenter", "r-allow-everything")
            .with_image("ami-0c24ed26a1382e217")
            .with_key_pair("Llaves globales")
            .with_tag("role", "directory");

        assert_eq!(
            spec.image,
            MachineImage::Fixed("ami-0c24ed26a1382e217".to_string())
        );
        assert_eq!(spec.key_pair.as_deref(), Some("Llaves globales"));
        assert_eq!(spec.tags.get("role").map(String::as_str), Some("directory"));
    }

    #[test]
    fn test_startup_script_render() {
        let mut script = StartupScript::for_linux();
        script.add_commands(["yum update -y aws-cfn-bootstrap", "echo ready"]);

        assert_eq!(
            script.render(),
            "#!/bin/bash -xe\nyum update -y aws-cfn-bootstrap\necho ready\n"
        );
    }
}
