//! Plan command - recipients or minimum lift for open and click rates

use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{PlanResult, SolveFor};
use crate::infrastructure::services::{MetricInput, PlanRequest, PowerService};

use super::{print_json, DesignArgs, TestArgs};

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Quantity to solve for: recipients or lift
    #[arg(long, default_value = "recipients")]
    pub solve_for: SolveFor,

    #[command(flatten)]
    pub design: DesignArgs,

    #[command(flatten)]
    pub test: TestArgs,

    /// Baseline open rate (fraction)
    #[arg(long, default_value_t = 0.30)]
    pub open_rate: f64,

    /// Baseline click rate (fraction)
    #[arg(long, default_value_t = 0.02)]
    pub click_rate: f64,

    /// Recipients per arm, used when solving for lift
    #[arg(long, default_value_t = 300.0)]
    pub recipients: f64,

    /// Open-rate lift to detect, used when solving for recipients
    #[arg(long, default_value_t = 0.07)]
    pub open_lift: f64,

    /// Click-rate lift to detect, used when solving for recipients
    #[arg(long, default_value_t = 0.005)]
    pub click_lift: f64,
}

impl PlanArgs {
    fn into_request(self, sample_sizes: Vec<f64>) -> PlanRequest {
        PlanRequest {
            solve_for: self.solve_for,
            design: self.design.design(),
            alpha: self.test.alpha,
            power: self.test.power,
            recipients: Some(self.recipients),
            metrics: vec![
                MetricInput::new("open_rate", self.open_rate).with_lift(self.open_lift),
                MetricInput::new("click_rate", self.click_rate).with_lift(self.click_lift),
            ],
            sample_sizes,
        }
    }
}

/// Build and solve the plan
pub async fn execute(args: PlanArgs, config: &AppConfig) -> anyhow::Result<PlanResult> {
    let service = Arc::new(PowerService::new(config.solver.clone()));
    let request = args.into_request(config.sweep.sample_sizes()?);

    let result = service.plan(request).await?;
    info!(metrics = result.metrics.len(), "Plan solved");

    Ok(result)
}

/// Run the plan command
pub async fn run(args: PlanArgs, config: &AppConfig) -> anyhow::Result<()> {
    let result = execute(args, config).await?;
    print_json(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExperimentFamily;

    fn args(solve_for: SolveFor) -> PlanArgs {
        PlanArgs {
            solve_for,
            design: DesignArgs {
                family: ExperimentFamily::ChiSquareGoodnessOfFit,
                arms: 2,
            },
            test: TestArgs {
                alpha: 0.2,
                power: 0.8,
            },
            open_rate: 0.30,
            click_rate: 0.02,
            recipients: 300.0,
            open_lift: 0.1,
            click_lift: 0.01,
        }
    }

    #[tokio::test]
    async fn test_plan_recipients() {
        let result = execute(args(SolveFor::Recipients), &AppConfig::default())
            .await
            .unwrap();

        let open = result.get_metric("open_rate").unwrap();
        assert_eq!(open.summary, "221 recipients");

        let click = result.get_metric("click_rate").unwrap();
        assert_eq!(click.summary, "113 recipients");
        assert!(click.curve.is_x_monotone());
        assert!(!click.curve.is_empty());
    }

    #[tokio::test]
    async fn test_plan_lift() {
        let result = execute(args(SolveFor::Lift), &AppConfig::default())
            .await
            .unwrap();

        let open = result.get_metric("open_rate").unwrap();
        assert!((open.minimum_lift.unwrap() - 0.0844).abs() < 0.002);
        assert_eq!(open.curve.len(), 40);
    }

    #[tokio::test]
    async fn test_plan_default_lifts_with_normal_family() {
        let mut args = args(SolveFor::Recipients);
        args.design.family = ExperimentFamily::NormalApproxProportion;
        args.open_lift = 0.07;
        args.click_lift = 0.005;

        let result = execute(args, &AppConfig::default()).await.unwrap();

        assert_eq!(result.metrics.len(), 2);
        assert_eq!(result.get_metric("open_rate").unwrap().summary, "409 recipients");
        assert_eq!(
            result.get_metric("click_rate").unwrap().summary,
            "more than 800 recipients"
        );
    }

    #[tokio::test]
    async fn test_plan_surfaces_invalid_design() {
        let mut args = args(SolveFor::Lift);
        args.design.family = ExperimentFamily::NormalApproxProportion;
        args.design.arms = 3;

        assert!(execute(args, &AppConfig::default()).await.is_err());
    }
}
