// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bootstrap Directives
//!
//! The typed vocabulary of the init-metadata document: package installs,
//! file drops, commands, service enablement, and external source checkouts.
//! Commands are structured argument lists rather than templated strings;
//! arguments that depend on provider-assigned values are deferred
//! [`Value`]s resolved at apply time.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::value::Value;

/// POSIX file mode, serialized as a six-digit octal string
///
/// The init agent's document format carries modes as octal text; keeping
/// the numeric mode here means `0o400` can never be confused with decimal
/// 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    pub const fn new(mode: u32) -> Self {
        Self(mode)
    }

    pub fn mode(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06o}", self.0)
    }
}

impl Serialize for FileMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        u32::from_str_radix(&s, 8)
            .map(Self)
            .map_err(|_| D::Error::custom(format!("invalid octal file mode: {s}")))
    }
}

/// Package manager a package-install directive targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManager {
    Yum,
    Dnf,
    Apt,
}

/// Install a package through the OS package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitPackage {
    pub manager: PackageManager,
    pub name: String,
}

impl InitPackage {
    pub fn yum(name: impl Into<String>) -> Self {
        Self {
            manager: PackageManager::Yum,
            name: name.into(),
        }
    }

    pub fn dnf(name: impl Into<String>) -> Self {
        Self {
            manager: PackageManager::Dnf,
            name: name.into(),
        }
    }

    pub fn apt(name: impl Into<String>) -> Self {
        Self {
            manager: PackageManager::Apt,
            name: name.into(),
        }
    }
}

/// Write a file with optional mode and ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitFile {
    pub path: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mode: Option<FileMode>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group: Option<String>,
}

impl InitFile {
    pub fn from_string(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: None,
            owner: None,
            group: None,
        }
    }

    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>, group: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self.group = Some(group.into());
        self
    }
}

/// Command form: an explicit argument vector or a shell line
///
/// Argv is the default; the shell form exists for genuine pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandLine {
    Argv(Vec<Value>),
    Shell(String),
}

/// Run a command, optionally scoped to a working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitCommand {
    pub command: CommandLine,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cwd: Option<String>,
}

impl InitCommand {
    /// A command from an explicit argument vector
    pub fn argv<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            command: CommandLine::Argv(args.into_iter().map(Into::into).collect()),
            cwd: None,
        }
    }

    /// A command interpreted by the shell
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            command: CommandLine::Shell(command.into()),
            cwd: None,
        }
    }

    /// Scope the command to a working directory
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Enable a service and ensure it is running after bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitService {
    pub name: String,
    pub enabled: bool,
    pub ensure_running: bool,
}

impl InitService {
    pub fn enable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            ensure_running: true,
        }
    }
}

/// Fetch and unpack an external source tree into a target directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitSource {
    pub target: String,
    pub url: String,
}

impl InitSource {
    pub fn new(target: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            url: url.into(),
        }
    }

    /// A GitHub repository's default-branch tarball
    pub fn github(target: impl Into<String>, owner: &str, repo: &str) -> Self {
        Self::new(target, format!("https://github.com/{owner}/{repo}/tarball/master"))
    }
}

/// One ordered entry in a bootstrap phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitDirective {
    Package(InitPackage),
    File(InitFile),
    Command(InitCommand),
    Service(InitService),
    Source(InitSource),
}

impl From<InitPackage> for InitDirective {
    fn from(package: InitPackage) -> Self {
        InitDirective::Package(package)
    }
}

impl From<InitFile> for InitDirective {
    fn from(file: InitFile) -> Self {
        InitDirective::File(file)
    }
}

impl From<InitCommand> for InitDirective {
    fn from(command: InitCommand) -> Self {
        InitDirective::Command(command)
    }
}

impl From<InitService> for InitDirective {
    fn from(service: InitService) -> Self {
        InitDirective::Service(service)
    }
}

impl From<InitSource> for InitDirective {
    fn from(source: InitSource) -> Self {
        InitDirective::Source(source)
    }
}
