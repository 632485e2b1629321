// Copyright (c) 2025 - Cowboy AI, Inc.
//! Machine Bootstrap Composition
//!
//! Everything a machine needs applied at first boot, expressed as data:
//! typed directives ([`directive`]) grouped into named phases and
//! phase-sets ([`plan`]), attached to instance specs by role-aware
//! composer functions ([`composer`]).
//!
//! The composed output is twofold: a startup script that runs the init
//! agent and signals completion, and the structured init-metadata document
//! the agent interprets.

pub mod composer;
pub mod directive;
pub mod plan;

// Re-export commonly used types
pub use composer::{compose, BootstrapRole, StackContext, INSTALL_AND_RUN};
pub use directive::{
    CommandLine, FileMode, InitCommand, InitDirective, InitFile, InitPackage, InitService,
    InitSource, PackageManager,
};
pub use plan::BootstrapPlan;
