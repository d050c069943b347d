//! CLI module for lift-power
//!
//! Provides subcommands for planning and analysing two-proportion experiments:
//! - `plan`: recipients or minimum lift for the open- and click-rate metrics
//! - `curve`: power, significance or detectable-lift curves
//! - `significance`, `power`, `evaluate`: single computations
//!
//! Results are printed to stdout as JSON; logs go to stderr.

pub mod curve;
pub mod plan;
pub mod point;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::{ExperimentFamily, TestDesign};
use crate::infrastructure::logging;

/// lift-power - Sample size, lift and significance for A/B experiments
#[derive(Parser)]
#[command(name = "lift-power")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Plan recipients or minimum lift for open and click rates
    Plan(plan::PlanArgs),

    /// Sweep a curve over the configured grid
    Curve(curve::CurveArgs),

    /// Minimum lift that reaches significance at a sample size
    Significance(point::SignificanceArgs),

    /// Power reached for a lift at a sample size
    Power(point::PowerArgs),

    /// Test observed control and treatment counts
    Evaluate(point::EvaluateArgs),
}

/// Test family and arm count
#[derive(Args, Debug, Clone)]
pub struct DesignArgs {
    /// Test family: chisquare or normal
    #[arg(long, default_value = "chisquare")]
    pub family: ExperimentFamily,

    /// Number of arms (chi-square family only)
    #[arg(long, default_value_t = 2)]
    pub arms: u32,
}

impl DesignArgs {
    pub fn design(&self) -> TestDesign {
        TestDesign {
            family: self.family,
            arms: self.arms,
        }
    }
}

/// Significance level and target power
#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    /// Significance level (fraction)
    #[arg(long, default_value_t = 0.2)]
    pub alpha: f64,

    /// Target power (fraction)
    #[arg(long, default_value_t = 0.8)]
    pub power: f64,
}

/// Load `.env`, configuration and logging
pub fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    logging::init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!(error = %e, "Falling back to default configuration");
    }

    config
}

/// Print a result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
