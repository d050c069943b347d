//! Curve command - sweeps over the configured grids

use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::Curve;
use crate::infrastructure::services::PowerService;

use super::{print_json, DesignArgs, TestArgs};

/// Which relationship to sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Required sample size for each lift of the lift grid
    Power,
    /// Minimum significant lift for each sample size of the recipients grid
    Significance,
    /// Minimum detectable lift for each sample size of the recipients grid
    DetectableLift,
}

#[derive(Args, Debug, Clone)]
pub struct CurveArgs {
    #[arg(long, value_enum, default_value_t = CurveKind::Power)]
    pub kind: CurveKind,

    #[command(flatten)]
    pub design: DesignArgs,

    #[command(flatten)]
    pub test: TestArgs,

    /// Baseline rate (fraction)
    #[arg(long, default_value_t = 0.30)]
    pub rate: f64,
}

/// Curve together with the request that produced it
#[derive(Debug, Serialize)]
pub struct CurveOutput {
    pub kind: CurveKind,
    pub rate: f64,
    pub curve: Curve,
}

/// Sweep the requested curve
pub fn execute(args: &CurveArgs, config: &AppConfig) -> anyhow::Result<CurveOutput> {
    let service = PowerService::new(config.solver.clone());
    let design = args.design.design();
    let (alpha, power) = (args.test.alpha, args.test.power);

    let curve = match args.kind {
        CurveKind::Power => {
            service.power_curve_for(design, args.rate, power, alpha, &config.sweep.lifts()?)?
        }
        CurveKind::Significance => {
            service.sweep_significance_curve(args.rate, alpha, &config.sweep.sample_sizes()?)?
        }
        CurveKind::DetectableLift => service.detectable_lift_curve_for(
            design,
            args.rate,
            power,
            alpha,
            &config.sweep.sample_sizes()?,
        )?,
    };

    Ok(CurveOutput {
        kind: args.kind,
        rate: args.rate,
        curve,
    })
}

/// Run the curve command
pub fn run(args: CurveArgs, config: &AppConfig) -> anyhow::Result<()> {
    let output = execute(&args, config)?;
    print_json(&output)
}
