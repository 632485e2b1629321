// Copyright (c) 2025 - Cowboy AI, Inc.
//! Machine Bootstrap Composer
//!
//! Attaches a role-specific bootstrap plan and startup script to an
//! instance spec. Composition is a pure builder: the spec is consumed and a
//! new one returned, so two composed specs can never share a plan
//! allocation. A spec that already carries bootstrap metadata is a
//! configuration conflict and composition fails.
//!
//! The startup script always ends with the init-agent run plus the
//! completion-signal pair, so the provisioning engine can mark the resource
//! healthy or failed. Credentials are pulled from the managed secret store
//! at boot time; plans only ever carry the secret's name.

use std::fmt;
use tracing::debug;

use super::directive::{
    FileMode, InitCommand, InitDirective, InitFile, InitPackage, InitService, InitSource,
};
use super::plan::BootstrapPlan;
use crate::domain::instance::{InstanceSpec, StartupScript};
use crate::errors::{PlanError, PlanResult};
use crate::value::Value;

/// The phase-set every composed plan runs at first boot
pub const INSTALL_AND_RUN: &str = "InstallAndRun";

const PREPARE: &str = "Prepare";
const INSTALL: &str = "Install";

/// Addresses the checked-out pipeline configuration uses as stand-ins for
/// the monitored hosts, substituted at boot
const MONITORED_HOST_PLACEHOLDERS: [&str; 2] = ["111.111.111.111", "222.222.222.222"];

const ELASTIC_GPG_KEY_URL: &str = "https://artifacts.elastic.co/GPG-KEY-elasticsearch";
const PIPELINE_CHECKOUT_DIR: &str = "/tmp/repo";

const LOGSTASH_REPO_DEFINITION: &str = "[logstash-7.x]
name=Elastic repository for 7.x packages
baseurl=https://artifacts.elastic.co/packages/7.x/yum
gpgcheck=1
gpgkey=https://artifacts.elastic.co/GPG-KEY-elasticsearch
enabled=1
autorefresh=1
type=rpm-md";

/// Stack context the init agent needs to report back to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackContext {
    pub stack_name: String,
    pub region: String,
}

impl StackContext {
    pub fn new(stack_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            region: region.into(),
        }
    }
}

/// Bootstrap role a machine is composed for
#[derive(Debug, Clone)]
pub enum BootstrapRole {
    /// Log-aggregation server: Prepare + Install phases, pipeline checkout,
    /// keystore populated from the secret store, monitored-host addresses
    /// substituted into the pipeline configuration
    Server {
        secret_id: String,
        monitored_hosts: Vec<Value>,
    },
    /// SNMP monitoring client: Install phase only, SNMPv3 user created from
    /// the secret store
    Client { secret_id: String },
    /// Only the scaffolding shared by every role: init-agent reload wiring
    /// and the completion signal
    Generic,
}

impl fmt::Display for BootstrapRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapRole::Server { .. } => write!(f, "server"),
            BootstrapRole::Client { .. } => write!(f, "client"),
            BootstrapRole::Generic => write!(f, "generic"),
        }
    }
}

/// Compose a bootstrap plan onto an instance spec
///
/// # Errors
///
/// [`PlanError::BootstrapConflict`] when the spec already carries bootstrap
/// metadata; [`PlanError::MonitoredHostCount`] when a server role is given
/// anything other than the two monitored hosts its pipeline expects.
pub fn compose(
    spec: InstanceSpec,
    role: BootstrapRole,
    ctx: &StackContext,
) -> PlanResult<InstanceSpec> {
    if spec.has_bootstrap() {
        return Err(PlanError::BootstrapConflict(spec.name));
    }

    debug!(instance = %spec.name, role = %role, "composing bootstrap plan");

    let mut spec = spec;
    let mut script = spec
        .startup_script
        .take()
        .unwrap_or_else(StartupScript::for_linux);
    script.add_commands([
        "yum update -y aws-cfn-bootstrap".to_string(),
        format!(
            "/opt/aws/bin/cfn-init -v --stack {} --resource {} --configsets {} --region {}",
            ctx.stack_name, spec.name, INSTALL_AND_RUN, ctx.region
        ),
        format!(
            "/opt/aws/bin/cfn-signal -e $? --stack {} --resource {} --region {}",
            ctx.stack_name, spec.name, ctx.region
        ),
    ]);

    let plan = match &role {
        BootstrapRole::Server {
            secret_id,
            monitored_hosts,
        } => server_plan(&spec.name, ctx, secret_id, monitored_hosts)?,
        BootstrapRole::Client { secret_id } => client_plan(&spec.name, ctx, secret_id),
        BootstrapRole::Generic => generic_plan(&spec.name, ctx),
    };

    spec.startup_script = Some(script);
    spec.bootstrap = Some(plan);
    Ok(spec)
}

/// Init-agent reload wiring shared by every role: the agent's own
/// configuration plus the hook that re-runs init when the resource's
/// metadata changes
fn reload_wiring(resource: &str, ctx: &StackContext) -> Vec<InitDirective> {
    vec![
        InitFile::from_string(
            "/etc/cfn/cfn-hup.conf",
            format!(
                "[main]\nstack={}\nregion={}\ninterval=1\n",
                ctx.stack_name, ctx.region
            ),
        )
        .with_mode(FileMode::new(0o400))
        .with_owner("root", "root")
        .into(),
        InitFile::from_string(
            "/etc/cfn/hooks.d/cfn-auto-reloader.conf",
            format!(
                "[cfn-auto-reloader-hook]\n\
                 triggers=post.update\n\
                 path=Resources.{resource}.Metadata.AWS::CloudFormation::Init\n\
                 action=/opt/aws/bin/cfn-init --stack {} --resource {resource} --region {}\n\
                 runas=root\n",
                ctx.stack_name, ctx.region
            ),
        )
        .into(),
    ]
}

fn generic_plan(resource: &str, ctx: &StackContext) -> BootstrapPlan {
    let mut install = reload_wiring(resource, ctx);
    install.push(InitService::enable("cfn-hup").into());

    BootstrapPlan::new()
        .with_config_set(INSTALL_AND_RUN, [INSTALL])
        .with_phase(INSTALL, install)
}

fn client_plan(resource: &str, ctx: &StackContext, secret_id: &str) -> BootstrapPlan {
    let mut install: Vec<InitDirective> = vec![
        InitPackage::yum("net-snmp").into(),
        InitPackage::yum("net-snmp-utils").into(),
        InitPackage::yum("net-snmp-devel").into(),
        InitPackage::yum("jq").into(),
    ];
    install.extend(reload_wiring(resource, ctx));
    install.push(
        InitCommand::shell(format!(
            "SECRET=$(aws secretsmanager get-secret-value --region {region} --secret-id {secret_id} \
             --query SecretString --output text); \
             SNMPUSER=$(echo $SECRET | jq -r .username); \
             SNMPPWD=$(echo $SECRET | jq -r .password); \
             net-snmp-config --create-snmpv3-user -ro -a MD5 -A $SNMPPWD $SNMPUSER >/dev/null",
            region = ctx.region
        ))
        .into(),
    );
    install.push(InitService::enable("snmpd").into());
    install.push(InitService::enable("cfn-hup").into());

    BootstrapPlan::new()
        .with_config_set(INSTALL_AND_RUN, [INSTALL])
        .with_phase(INSTALL, install)
}

fn server_plan(
    resource: &str,
    ctx: &StackContext,
    secret_id: &str,
    monitored_hosts: &[Value],
) -> PlanResult<BootstrapPlan> {
    if monitored_hosts.len() != MONITORED_HOST_PLACEHOLDERS.len() {
        return Err(PlanError::MonitoredHostCount {
            expected: MONITORED_HOST_PLACEHOLDERS.len(),
            actual: monitored_hosts.len(),
        });
    }

    let prepare: Vec<InitDirective> = vec![
        InitCommand::argv(["rpm", "--import", ELASTIC_GPG_KEY_URL]).into(),
        InitSource::github(PIPELINE_CHECKOUT_DIR, "DanielRasho", "Redes-P2").into(),
        InitFile::from_string("/etc/yum.repos.d/logstash.repo", LOGSTASH_REPO_DEFINITION)
            .with_mode(FileMode::new(0o600))
            .with_owner("ec2-user", "ec2-user")
            .into(),
    ];

    let mut install: Vec<InitDirective> = vec![
        InitPackage::yum("jq").into(),
        InitPackage::yum("git").into(),
        InitPackage::yum("logstash").into(),
    ];
    install.extend(reload_wiring(resource, ctx));
    install.extend([
        InitCommand::shell("cp *.conf /etc/logstash/conf.d/")
            .with_cwd(format!("{PIPELINE_CHECKOUT_DIR}/conf/"))
            .into(),
        InitCommand::shell("cp pipelines.yml jvm.options logstash.yml /etc/logstash/")
            .with_cwd(format!("{PIPELINE_CHECKOUT_DIR}/settings/"))
            .into(),
        InitCommand::shell("echo y | bin/logstash-keystore --path.settings /etc/logstash create")
            .with_cwd("/usr/share/logstash/")
            .into(),
        monitored_host_substitution(monitored_hosts).into(),
        region_substitution(&ctx.region).into(),
        keystore_entry(ctx, secret_id, "username", "SNMP_USER").into(),
        keystore_entry(ctx, secret_id, "password", "SNMP_PWD").into(),
        InitService::enable("logstash").into(),
        InitService::enable("cfn-hup").into(),
    ]);

    Ok(BootstrapPlan::new()
        .with_config_set(INSTALL_AND_RUN, [PREPARE, INSTALL])
        .with_phase(PREPARE, prepare)
        .with_phase(INSTALL, install))
}

/// Substitute the monitored hosts' addresses into the checked-out pipeline
/// configuration
///
/// The addresses are provider-assigned, so each substitution expression is
/// a concatenation around a deferred value rather than a templated string.
fn monitored_host_substitution(monitored_hosts: &[Value]) -> InitCommand {
    let mut args: Vec<Value> = vec![Value::literal("sed"), Value::literal("-i")];
    for (placeholder, host) in MONITORED_HOST_PLACEHOLDERS.iter().zip(monitored_hosts) {
        args.push(Value::literal("-e"));
        args.push(Value::concat([
            Value::literal(format!("s/{placeholder}/")),
            host.clone(),
            Value::literal("/g"),
        ]));
    }
    args.push(Value::literal("snmp.conf"));

    InitCommand::argv(args).with_cwd("/etc/logstash/conf.d/")
}

fn region_substitution(region: &str) -> InitCommand {
    let expression = format!("s/REGION/{region}/g");
    InitCommand::argv([
        Value::literal("sed"),
        Value::literal("-i"),
        Value::literal(expression),
        Value::literal("cloudwatch.conf"),
    ])
    .with_cwd("/etc/logstash/conf.d/")
}

/// Feed one field of the generated credential pair into the local keystore
///
/// Only the secret's name reaches the plan; the value stays between the
/// secret store and the keystore at boot time.
fn keystore_entry(ctx: &StackContext, secret_id: &str, field: &str, key: &str) -> InitCommand {
    InitCommand::shell(format!(
        "aws secretsmanager get-secret-value --region {region} --secret-id {secret_id} \
         --query SecretString --output text | jq -r .{field} | \
         bin/logstash-keystore --path.settings /etc/logstash add {key}",
        region = ctx.region
    ))
    .with_cwd("/usr/share/logstash/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::directive::CommandLine;
    use crate::value::Attribute;
    use pretty_assertions::assert_eq;

    fn ctx() -> StackContext {
        StackContext::new("ruwu-monitoring", "us-east-1")
    }

    fn client_spec(name: &str) -> InstanceSpec {
        InstanceSpec::new(name, "t2.micro", "r-datacenter", "r-allow-everything")
    }

    fn server_role() -> BootstrapRole {
        BootstrapRole::Server {
            secret_id: "SNMPSecret".to_string(),
            monitored_hosts: vec![
                Value::reference("r-snmp-instance-1", Attribute::PrivateIp),
                Value::reference("r-snmp-instance-2", Attribute::PrivateIp),
            ],
        }
    }

    #[test]
    fn test_compose_appends_signal_pair() {
        let spec = compose(client_spec("r-snmp-instance-1"), BootstrapRole::Generic, &ctx())
            .unwrap();

        let script = spec.startup_script.expect("startup script attached");
        let commands = script.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], "yum update -y aws-cfn-bootstrap");
        assert!(commands[1].contains("cfn-init"));
        assert!(commands[1].contains("--resource r-snmp-instance-1"));
        assert!(commands[2].contains("cfn-signal"));
    }

    #[test]
    fn test_double_attachment_is_conflict() {
        let composed = compose(client_spec("r-snmp-instance-1"), BootstrapRole::Generic, &ctx())
            .unwrap();

        let err = compose(
            composed,
            BootstrapRole::Client {
                secret_id: "SNMPSecret".to_string(),
            },
            &ctx(),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::BootstrapConflict(name) if name == "r-snmp-instance-1"));
    }

    #[test]
    fn test_client_plan_phases() {
        let spec = compose(
            client_spec("r-snmp-instance-1"),
            BootstrapRole::Client {
                secret_id: "SNMPSecret".to_string(),
            },
            &ctx(),
        )
        .unwrap();

        let plan = spec.bootstrap.expect("bootstrap attached");
        assert!(plan.validate().is_ok());
        assert_eq!(
            plan.config_set(INSTALL_AND_RUN),
            Some(&["Install".to_string()][..])
        );

        let install = plan.phase("Install").expect("install phase");
        let packages: Vec<&str> = install
            .iter()
            .filter_map(|d| match d {
                InitDirective::Package(p) => Some(p.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(packages, vec!["net-snmp", "net-snmp-utils", "net-snmp-devel", "jq"]);

        let services: Vec<&str> = install
            .iter()
            .filter_map(|d| match d {
                InitDirective::Service(s) => Some(s.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(services, vec!["snmpd", "cfn-hup"]);
    }

    #[test]
    fn test_server_plan_phases() {
        let spec = compose(client_spec("r-logstash-server"), server_role(), &ctx()).unwrap();

        let plan = spec.bootstrap.expect("bootstrap attached");
        assert!(plan.validate().is_ok());
        assert_eq!(
            plan.config_set(INSTALL_AND_RUN),
            Some(&["Prepare".to_string(), "Install".to_string()][..])
        );

        let prepare = plan.phase("Prepare").expect("prepare phase");
        assert!(matches!(&prepare[1], InitDirective::Source(s) if s.target == "/tmp/repo"));

        let install = plan.phase("Install").expect("install phase");
        assert!(install
            .iter()
            .any(|d| matches!(d, InitDirective::Package(p) if p.name == "logstash")));
    }

    #[test]
    fn test_server_requires_two_monitored_hosts() {
        let err = compose(
            client_spec("r-logstash-server"),
            BootstrapRole::Server {
                secret_id: "SNMPSecret".to_string(),
                monitored_hosts: vec![Value::reference("only-one", Attribute::PrivateIp)],
            },
            &ctx(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PlanError::MonitoredHostCount {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_secret_referenced_by_name_only() {
        let spec = compose(client_spec("r-logstash-server"), server_role(), &ctx()).unwrap();
        let rendered =
            serde_json::to_string(&spec.bootstrap.expect("bootstrap attached")).unwrap();

        assert!(rendered.contains("SNMPSecret"));
        assert!(!rendered.contains("readonlyuser"));
    }

    #[test]
    fn test_peer_substitution_defers_addresses() {
        let spec = compose(client_spec("r-logstash-server"), server_role(), &ctx()).unwrap();
        let plan = spec.bootstrap.expect("bootstrap attached");

        let substitution = plan
            .phase("Install")
            .expect("install phase")
            .iter()
            .find_map(|d| match d {
                InitDirective::Command(c) => match &c.command {
                    CommandLine::Argv(args)
                        if args.first() == Some(&Value::literal("sed"))
                            && args.iter().any(|a| !a.is_resolved()) =>
                    {
                        Some(c)
                    }
                    _ => None,
                },
                _ => None,
            })
            .expect("deferred sed substitution present");

        assert_eq!(substitution.cwd.as_deref(), Some("/etc/logstash/conf.d/"));
    }

    #[test]
    fn test_independent_compositions_share_nothing() {
        let base = client_spec("r-logstash-server");
        let mut first = compose(base.clone(), server_role(), &ctx()).unwrap();
        let second = compose(base, server_role(), &ctx()).unwrap();

        // Equal content, separate values: clearing one leaves the other intact
        assert_eq!(first.bootstrap, second.bootstrap);
        first.bootstrap = None;
        assert!(second.bootstrap.is_some());
    }
}
