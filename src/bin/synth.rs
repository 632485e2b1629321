//! Plan Synthesis
//!
//! Builds the default ruwu posture and fleet, synthesizes the full
//! provisioning plan, and writes it to stdout as JSON for the external
//! provisioning engine.
//!
//! Run with: cargo run --bin ruwu-synth
//!
//! The target region comes from the RUWU_REGION environment variable and
//! defaults to us-east-1.

use anyhow::{Context, Result};
use ruwu_infrastructure::{default_fleet, default_posture, ProvisioningPlan};
use tracing::info;

/// Configuration for a synthesis run
#[derive(Debug, Clone)]
struct SynthConfig {
    /// Target provider region
    region: String,
}

impl SynthConfig {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let region = std::env::var("RUWU_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        Self { region }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SynthConfig::from_env();
    info!(region = %config.region, "synthesizing ruwu provisioning plan");

    let posture = default_posture().context("building default posture")?;
    let fleet = default_fleet();

    let plan = ProvisioningPlan::synthesize(&config.region, &posture, &fleet)
        .context("synthesizing provisioning plan")?;

    println!("{}", plan.to_json()?);

    Ok(())
}
