//! Single computations: minimum significant lift, achieved power, observed results

use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::SignificanceResult;
use crate::infrastructure::services::PowerService;

use super::{print_json, DesignArgs};

#[derive(Args, Debug, Clone)]
pub struct SignificanceArgs {
    /// Baseline rate (fraction)
    #[arg(long, default_value_t = 0.30)]
    pub rate: f64,

    /// Recipients per arm
    #[arg(long, default_value_t = 300.0)]
    pub recipients: f64,

    /// Significance level (fraction)
    #[arg(long, default_value_t = 0.2)]
    pub alpha: f64,
}

#[derive(Args, Debug, Clone)]
pub struct PowerArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    /// Baseline rate (fraction)
    #[arg(long, default_value_t = 0.30)]
    pub rate: f64,

    /// True lift (fraction)
    #[arg(long, default_value_t = 0.07)]
    pub lift: f64,

    /// Recipients per arm
    #[arg(long, default_value_t = 300.0)]
    pub recipients: f64,

    /// Significance level (fraction)
    #[arg(long, default_value_t = 0.2)]
    pub alpha: f64,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub control_successes: u64,

    #[arg(long)]
    pub control_trials: u64,

    #[arg(long)]
    pub treatment_successes: u64,

    #[arg(long)]
    pub treatment_trials: u64,

    /// Significance level (fraction)
    #[arg(long, default_value_t = 0.2)]
    pub alpha: f64,
}

#[derive(Debug, Serialize)]
pub struct SignificanceOutput {
    pub rate: f64,
    pub recipients: f64,
    pub alpha: f64,
    pub minimum_lift: f64,
}

#[derive(Debug, Serialize)]
pub struct PowerOutput {
    pub rate: f64,
    pub lift: f64,
    pub recipients: f64,
    pub alpha: f64,
    pub power: f64,
}

pub fn significance(args: &SignificanceArgs, config: &AppConfig) -> anyhow::Result<SignificanceOutput> {
    let service = PowerService::new(config.solver.clone());
    let minimum_lift = service.minimum_significant_lift(args.rate, args.recipients, args.alpha)?;

    Ok(SignificanceOutput {
        rate: args.rate,
        recipients: args.recipients,
        alpha: args.alpha,
        minimum_lift,
    })
}

pub fn power(args: &PowerArgs, config: &AppConfig) -> anyhow::Result<PowerOutput> {
    let service = PowerService::new(config.solver.clone());
    let power = service.achieved_power_for(
        args.design.design(),
        args.rate,
        args.lift,
        args.recipients,
        args.alpha,
    )?;

    Ok(PowerOutput {
        rate: args.rate,
        lift: args.lift,
        recipients: args.recipients,
        alpha: args.alpha,
        power,
    })
}

pub fn evaluate(args: &EvaluateArgs, config: &AppConfig) -> anyhow::Result<SignificanceResult> {
    let service = PowerService::new(config.solver.clone());
    Ok(service.evaluate_observed(
        args.control_successes,
        args.control_trials,
        args.treatment_successes,
        args.treatment_trials,
        args.alpha,
    )?)
}

pub fn run_significance(args: SignificanceArgs, config: &AppConfig) -> anyhow::Result<()> {
    print_json(&significance(&args, config)?)
}

pub fn run_power(args: PowerArgs, config: &AppConfig) -> anyhow::Result<()> {
    print_json(&power(&args, config)?)
}

pub fn run_evaluate(args: EvaluateArgs, config: &AppConfig) -> anyhow::Result<()> {
    print_json(&evaluate(&args, config)?)
}
