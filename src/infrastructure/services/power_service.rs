//! Power service for experiment planning
//!
//! Facade over the effect-size models, power analyses, root finder and
//! sweeps. Every operation is a pure computation over its scalar inputs; the
//! only state is the numeric policy in [`SolverConfig`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::experiment::{
    validate_alpha, validate_lift, validate_power, validate_rate, validate_sample_size,
};
use crate::domain::{
    design_effect_size, sweep, treated_rate, Curve, CurvePoint, ExperimentFamily,
    ExperimentParams, MetricPlan, Monotonicity, PlanResult, PowerAnalysis, PowerError,
    RootFinder, SearchBounds, SignificanceResult, SolveFor, SolverConfig, TestDesign,
};
use crate::infrastructure::power::create_power_analysis;
use crate::infrastructure::significance::{evaluate_observed, two_proportion_p_value};

// ============================================================================
// Request Types
// ============================================================================

/// One metric of a plan (open rate, click rate, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricInput {
    pub metric: String,
    /// Baseline rate of the metric
    pub rate: f64,
    /// Lift to detect, required when solving for recipients
    pub lift: Option<f64>,
}

impl MetricInput {
    pub fn new(metric: impl Into<String>, rate: f64) -> Self {
        Self {
            metric: metric.into(),
            rate,
            lift: None,
        }
    }

    pub fn with_lift(mut self, lift: f64) -> Self {
        self.lift = Some(lift);
        self
    }
}

/// Request to plan an experiment over several metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub solve_for: SolveFor,
    pub design: TestDesign,
    pub alpha: f64,
    pub power: f64,
    /// Recipients per arm, required when solving for lift
    pub recipients: Option<f64>,
    pub metrics: Vec<MetricInput>,
    /// Recipient grid of the detectable-lift curves
    pub sample_sizes: Vec<f64>,
}

// ============================================================================
// Power Service
// ============================================================================

/// Service answering sample-size, lift and significance questions
#[derive(Debug, Clone, Default)]
pub struct PowerService {
    config: SolverConfig,
}

impl PowerService {
    /// Create a new power service
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    // ========================================================================
    // Point Computations
    // ========================================================================

    /// Standardized effect size of a two-arm experiment
    pub fn effect_size(
        &self,
        family: ExperimentFamily,
        rate: f64,
        lift: f64,
    ) -> Result<f64, PowerError> {
        design_effect_size(TestDesign::two_arm(family), rate, lift)
    }

    /// Recipients per arm needed to detect `lift`
    pub fn required_sample_size(
        &self,
        family: ExperimentFamily,
        rate: f64,
        lift: f64,
        power: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        self.required_sample_size_for(TestDesign::two_arm(family), rate, lift, power, alpha)
    }

    #[instrument(skip(self))]
    pub fn required_sample_size_for(
        &self,
        design: TestDesign,
        rate: f64,
        lift: f64,
        power: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        let analysis = create_power_analysis(design)?;
        let nobs = self.solve_sample_size(analysis.as_ref(), design, rate, lift, power, alpha)?;

        debug!(nobs, "Solved required sample size");
        Ok(nobs)
    }

    /// Smallest lift detectable with `nobs` recipients per arm
    pub fn minimum_detectable_lift(
        &self,
        family: ExperimentFamily,
        rate: f64,
        nobs: f64,
        power: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        self.minimum_detectable_lift_for(TestDesign::two_arm(family), rate, nobs, power, alpha)
    }

    #[instrument(skip(self))]
    pub fn minimum_detectable_lift_for(
        &self,
        design: TestDesign,
        rate: f64,
        nobs: f64,
        power: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        let analysis = create_power_analysis(design)?;
        let lift = self.solve_detectable_lift(analysis.as_ref(), design, rate, nobs, power, alpha)?;

        debug!(lift, "Solved minimum detectable lift");
        Ok(lift)
    }

    /// Smallest lift whose two-proportion test at `nobs` per arm has `p <= alpha`
    #[instrument(skip(self))]
    pub fn minimum_significant_lift(
        &self,
        rate: f64,
        nobs: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        validate_alpha(alpha)?;
        validate_sample_size(nobs)?;

        let bounds = SearchBounds::lift(rate, self.config.pvalue_floor)?;
        let finder = RootFinder::for_p_value(&self.config);

        // The p-value is recomputed from the test at every candidate lift
        let lift = invert_lift(finder, alpha, Monotonicity::Decreasing, bounds, |lift| {
            two_proportion_p_value(rate, lift, nobs)
        })?;

        debug!(lift, "Solved minimum significant lift");
        Ok(lift)
    }

    /// Power reached with `nobs` recipients per arm when the true lift is `lift`
    pub fn achieved_power(
        &self,
        family: ExperimentFamily,
        rate: f64,
        lift: f64,
        nobs: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        self.achieved_power_for(TestDesign::two_arm(family), rate, lift, nobs, alpha)
    }

    pub fn achieved_power_for(
        &self,
        design: TestDesign,
        rate: f64,
        lift: f64,
        nobs: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        let analysis = create_power_analysis(design)?;
        let effect = design_effect_size(design, rate, lift)?;
        analysis.power(effect, nobs, alpha)
    }

    /// Run the significance test on observed counts
    #[instrument(skip(self))]
    pub fn evaluate_observed(
        &self,
        control_successes: u64,
        control_trials: u64,
        treatment_successes: u64,
        treatment_trials: u64,
        alpha: f64,
    ) -> Result<SignificanceResult, PowerError> {
        let result = evaluate_observed(
            control_successes,
            control_trials,
            treatment_successes,
            treatment_trials,
            alpha,
        )?;

        info!(
            p_value = result.p_value,
            verdict = result.verdict(),
            "Evaluated observed result"
        );
        Ok(result)
    }

    // ========================================================================
    // Curves
    // ========================================================================

    /// Required sample size per lift, truncated where it exceeds the ceiling
    ///
    /// Lifts are visited from largest to smallest so the sample sizes come out
    /// ascending.
    pub fn sweep_power_curve(
        &self,
        family: ExperimentFamily,
        rate: f64,
        power: f64,
        alpha: f64,
        lifts: &[f64],
    ) -> Result<Curve, PowerError> {
        self.power_curve_for(TestDesign::two_arm(family), rate, power, alpha, lifts)
    }

    #[instrument(skip(self, lifts), fields(points = lifts.len()))]
    pub fn power_curve_for(
        &self,
        design: TestDesign,
        rate: f64,
        power: f64,
        alpha: f64,
        lifts: &[f64],
    ) -> Result<Curve, PowerError> {
        let analysis = create_power_analysis(design)?;
        self.power_curve_with(analysis.as_ref(), design, rate, power, alpha, lifts)
    }

    /// Minimum significant lift per sample size
    #[instrument(skip(self, sample_sizes), fields(points = sample_sizes.len()))]
    pub fn sweep_significance_curve(
        &self,
        rate: f64,
        alpha: f64,
        sample_sizes: &[f64],
    ) -> Result<Curve, PowerError> {
        let curve = sweep(descending(sample_sizes)?, |nobs| {
            let lift = self.minimum_significant_lift(rate, nobs, alpha)?;
            Ok(CurvePoint::new(nobs, lift))
        })?;

        Ok(curve.sorted_by_sample_size())
    }

    /// Minimum detectable lift per sample size
    pub fn sweep_detectable_lift_curve(
        &self,
        family: ExperimentFamily,
        rate: f64,
        power: f64,
        alpha: f64,
        sample_sizes: &[f64],
    ) -> Result<Curve, PowerError> {
        self.detectable_lift_curve_for(TestDesign::two_arm(family), rate, power, alpha, sample_sizes)
    }

    #[instrument(skip(self, sample_sizes), fields(points = sample_sizes.len()))]
    pub fn detectable_lift_curve_for(
        &self,
        design: TestDesign,
        rate: f64,
        power: f64,
        alpha: f64,
        sample_sizes: &[f64],
    ) -> Result<Curve, PowerError> {
        let analysis = create_power_analysis(design)?;
        self.detectable_lift_curve_with(analysis.as_ref(), design, rate, power, alpha, sample_sizes)
    }

    // ========================================================================
    // Plans
    // ========================================================================

    /// Plan every metric of a request, one blocking task per metric
    pub async fn plan(self: Arc<Self>, request: PlanRequest) -> Result<PlanResult, PowerError> {
        request.design.validate()?;
        validate_alpha(request.alpha)?;
        validate_power(request.power)?;

        info!(
            solve_for = %request.solve_for,
            family = %request.design.family,
            metrics = request.metrics.len(),
            "Planning experiment"
        );

        let request = Arc::new(request);
        let mut handles = Vec::with_capacity(request.metrics.len());

        for index in 0..request.metrics.len() {
            let service = Arc::clone(&self);
            let request = Arc::clone(&request);

            handles.push(tokio::task::spawn_blocking(move || {
                service.plan_metric(&request, &request.metrics[index])
            }));
        }

        let mut result = PlanResult::new(
            request.solve_for,
            request.design.family,
            request.alpha,
            request.power,
        );

        for handle in handles {
            let metric = handle
                .await
                .map_err(|e| PowerError::internal(format!("plan task failed: {e}")))??;
            result = result.with_metric(metric);
        }

        Ok(result)
    }

    /// Answer and detectable-lift curve for one metric
    ///
    /// A metric without an answer inside the solver's limits is reported as
    /// infeasible instead of failing the plan.
    pub fn plan_metric(
        &self,
        request: &PlanRequest,
        input: &MetricInput,
    ) -> Result<MetricPlan, PowerError> {
        let params = ExperimentParams::new(request.design, input.rate, request.alpha, request.power)?;
        let (design, rate) = (params.design, params.rate.value());
        let (alpha, power) = (params.alpha.value(), params.power.value());
        let analysis = create_power_analysis(design)?;

        let plan = match request.solve_for {
            SolveFor::Recipients => {
                let lift = input.lift.ok_or_else(|| {
                    PowerError::validation(format!("metric '{}' needs a lift", input.metric))
                })?;
                match self.solve_sample_size(analysis.as_ref(), design, rate, lift, power, alpha) {
                    Ok(nobs) => MetricPlan::recipients(&input.metric, rate, nobs),
                    Err(err) if err.is_no_solution() => {
                        info!(
                            metric = %input.metric,
                            error = %err,
                            "Metric has no feasible sample size"
                        );
                        MetricPlan::beyond_ceiling(
                            &input.metric,
                            rate,
                            self.config.sample_size_ceiling,
                        )
                    }
                    Err(err) => return Err(err),
                }
            }
            SolveFor::Lift => {
                let nobs = request.recipients.ok_or_else(|| {
                    PowerError::validation("solving for lift needs a recipient count")
                })?;
                let solved =
                    self.solve_detectable_lift(analysis.as_ref(), design, rate, nobs, power, alpha);
                match solved {
                    Ok(lift) => MetricPlan::lift(&input.metric, rate, lift),
                    Err(err) if err.is_no_solution() => {
                        info!(
                            metric = %input.metric,
                            error = %err,
                            "Metric has no detectable lift"
                        );
                        MetricPlan::undetectable(&input.metric, rate, nobs)
                    }
                    Err(err) => return Err(err),
                }
            }
        };

        let curve = self.detectable_lift_curve_with(
            analysis.as_ref(),
            design,
            rate,
            power,
            alpha,
            &request.sample_sizes,
        )?;

        debug!(metric = %input.metric, summary = %plan.summary, "Planned metric");
        Ok(plan.with_curve(curve))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn solve_sample_size(
        &self,
        analysis: &dyn PowerAnalysis,
        design: TestDesign,
        rate: f64,
        lift: f64,
        power: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        let effect = design_effect_size(design, rate, lift)?;
        analysis.required_sample_size(effect, power, alpha, self.config.sample_size_ceiling)
    }

    fn solve_detectable_lift(
        &self,
        analysis: &dyn PowerAnalysis,
        design: TestDesign,
        rate: f64,
        nobs: f64,
        power: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        let target = analysis.known_effect_for_sample_size(nobs, power, alpha)?;
        let bounds = SearchBounds::lift(rate, 0.0)?;
        let finder = RootFinder::for_effect_size(&self.config);

        invert_lift(finder, target, Monotonicity::Increasing, bounds, |lift| {
            design_effect_size(design, rate, lift)
        })
    }

    fn power_curve_with(
        &self,
        analysis: &dyn PowerAnalysis,
        design: TestDesign,
        rate: f64,
        power: f64,
        alpha: f64,
        lifts: &[f64],
    ) -> Result<Curve, PowerError> {
        validate_rate(rate)?;
        for &lift in lifts {
            validate_lift(lift)?;
        }

        // Lifts that push the treated rate out of (0, 1) have no point
        let mut ordered: Vec<f64> = lifts
            .iter()
            .copied()
            .filter(|&lift| treated_rate(rate, lift).is_ok())
            .collect();
        if ordered.len() < lifts.len() {
            debug!(
                rate,
                dropped = lifts.len() - ordered.len(),
                "Dropped lifts outside the valid rate range"
            );
        }
        ordered.sort_by(|a, b| b.total_cmp(a));

        sweep(ordered, |lift| {
            let nobs = self.solve_sample_size(analysis, design, rate, lift, power, alpha)?;
            Ok(CurvePoint::new(nobs, lift))
        })
    }

    fn detectable_lift_curve_with(
        &self,
        analysis: &dyn PowerAnalysis,
        design: TestDesign,
        rate: f64,
        power: f64,
        alpha: f64,
        sample_sizes: &[f64],
    ) -> Result<Curve, PowerError> {
        let curve = sweep(descending(sample_sizes)?, |nobs| {
            let lift = self.solve_detectable_lift(analysis, design, rate, nobs, power, alpha)?;
            Ok(CurvePoint::new(nobs, lift))
        })?;

        Ok(curve.sorted_by_sample_size())
    }
}

/// Invert a monotone function of lift, reporting targets outside its range
fn invert_lift<F>(
    finder: RootFinder,
    target: f64,
    monotonicity: Monotonicity,
    bounds: SearchBounds,
    mut f: F,
) -> Result<f64, PowerError>
where
    F: FnMut(f64) -> Result<f64, PowerError>,
{
    let tolerance = finder.tolerance();
    let (at_lower, at_upper) = (f(bounds.lower)?, f(bounds.upper)?);

    let (passed_at_lower, reachable) = match monotonicity {
        Monotonicity::Increasing => {
            (at_lower > target + tolerance, at_upper >= target - tolerance)
        }
        Monotonicity::Decreasing => {
            (at_lower < target - tolerance, at_upper <= target + tolerance)
        }
    };

    if passed_at_lower {
        return Ok(bounds.lower);
    }

    if !reachable {
        return Err(PowerError::out_of_reach(target, at_upper));
    }

    let root = finder.solve(target, monotonicity, bounds, 0.0, f)?;
    Ok(root.lift)
}

/// Validated sample sizes, largest first
fn descending(sample_sizes: &[f64]) -> Result<Vec<f64>, PowerError> {
    for &nobs in sample_sizes {
        validate_sample_size(nobs)?;
    }

    let mut ordered = sample_sizes.to_vec();
    ordered.sort_by(|a, b| b.total_cmp(a));
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::linear_grid;
    use crate::domain::power::MockPowerAnalysis;
    use proptest::prelude::*;

    const EPSILON: f64 = 0.001;

    fn service() -> PowerService {
        PowerService::new(SolverConfig::default())
    }

    mod point_tests {
        use super::*;

        #[test]
        fn test_effect_size_rejects_invalid_rate() {
            for family in [
                ExperimentFamily::ChiSquareGoodnessOfFit,
                ExperimentFamily::NormalApproxProportion,
            ] {
                let result = service().effect_size(family, 0.30, 0.75);
                assert!(matches!(result, Err(PowerError::OutOfDomain { .. })));
            }
        }

        #[test]
        fn test_required_sample_size_reference_values() {
            let chisquare = service()
                .required_sample_size(ExperimentFamily::ChiSquareGoodnessOfFit, 0.3, 0.1, 0.8, 0.2)
                .unwrap();
            assert!((chisquare - 220.638).abs() < 0.01);

            let normal = service()
                .required_sample_size(ExperimentFamily::NormalApproxProportion, 0.3, 0.2, 0.8, 0.2)
                .unwrap();
            assert!((normal - 53.598).abs() < 0.01);
        }

        #[test]
        fn test_tiny_lift_has_no_solution() {
            let result = service().required_sample_size(
                ExperimentFamily::NormalApproxProportion,
                0.30,
                0.001,
                0.80,
                0.20,
            );
            assert!(matches!(result, Err(PowerError::NoSolution { .. })));
        }

        #[test]
        fn test_ceiling_is_configurable() {
            let service = PowerService::new(SolverConfig::default().with_sample_size_ceiling(100.0));
            let result = service.required_sample_size(
                ExperimentFamily::ChiSquareGoodnessOfFit,
                0.3,
                0.1,
                0.8,
                0.2,
            );
            assert!(matches!(result, Err(PowerError::NoSolution { .. })));
        }

        #[test]
        fn test_normal_scenario_round_trip() {
            let family = ExperimentFamily::NormalApproxProportion;
            let lift = service()
                .minimum_detectable_lift(family, 0.30, 300.0, 0.80, 0.20)
                .unwrap();
            assert!(lift > 0.0);
            assert!((lift - 0.082).abs() < 2.0 * EPSILON);

            let nobs = service()
                .required_sample_size(family, 0.30, lift, 0.80, 0.20)
                .unwrap();
            assert!((nobs - 300.0).abs() / 300.0 < 0.05);
        }

        #[test]
        fn test_round_trip_on_flat_chisquare_effect() {
            let family = ExperimentFamily::ChiSquareGoodnessOfFit;

            for lift in [0.435, 0.44] {
                let nobs = service()
                    .required_sample_size(family, 0.01, lift, 0.8, 0.2)
                    .unwrap();
                assert!(nobs < 5.0);

                let recovered = service()
                    .minimum_detectable_lift(family, 0.01, nobs, 0.8, 0.2)
                    .unwrap();
                assert!((recovered - lift).abs() <= EPSILON);
            }
        }

        #[test]
        fn test_chisquare_detectable_lift() {
            let lift = service()
                .minimum_detectable_lift(ExperimentFamily::ChiSquareGoodnessOfFit, 0.30, 300.0, 0.80, 0.20)
                .unwrap();
            assert!((lift - 0.0844).abs() < 2.0 * EPSILON);
        }

        #[test]
        fn test_multi_arm_design_needs_more_recipients() {
            let two_arm = service()
                .required_sample_size_for(TestDesign::chisquare(2).unwrap(), 0.3, 0.1, 0.8, 0.2)
                .unwrap();
            let three_arm = service()
                .required_sample_size_for(TestDesign::chisquare(3).unwrap(), 0.3, 0.1, 0.8, 0.2)
                .unwrap();
            assert!((three_arm - 284.018).abs() < 0.01);
            assert!(three_arm > two_arm);
        }

        #[test]
        fn test_minimum_significant_lift_hits_alpha() {
            let lift = service().minimum_significant_lift(0.02, 300.0, 0.20).unwrap();
            let p_value = two_proportion_p_value(0.02, lift, 300.0).unwrap();

            assert!(lift > 0.0);
            assert!((p_value - 0.20).abs() <= EPSILON);
        }

        #[test]
        fn test_significance_out_of_reach() {
            // One recipient per arm cannot reach p = 0.05
            let result = service().minimum_significant_lift(0.02, 1.0, 0.05);
            assert!(matches!(result, Err(PowerError::OutOfReach { .. })));
        }

        #[test]
        fn test_significance_already_reached_at_floor() {
            let lift = service()
                .minimum_significant_lift(0.3, 1.0e9, 0.2)
                .unwrap();
            assert_eq!(lift, service().config().pvalue_floor);
        }

        #[test]
        fn test_achieved_power_matches_target() {
            let family = ExperimentFamily::ChiSquareGoodnessOfFit;
            let nobs = service()
                .required_sample_size(family, 0.3, 0.1, 0.8, 0.2)
                .unwrap();
            let power = service().achieved_power(family, 0.3, 0.1, nobs, 0.2).unwrap();
            assert!((power - 0.8).abs() < 1e-6);
        }

        #[test]
        fn test_evaluate_observed() {
            let result = service().evaluate_observed(30, 100, 45, 100, 0.05).unwrap();
            assert_eq!(result.verdict(), "significant");
        }
    }

    mod curve_tests {
        use super::*;

        #[test]
        fn test_power_curve_is_x_monotone_and_truncated() {
            let lifts = linear_grid(0.01, 0.25, 0.01).unwrap();
            let curve = service()
                .sweep_power_curve(ExperimentFamily::NormalApproxProportion, 0.3, 0.8, 0.2, &lifts)
                .unwrap();

            assert!(curve.truncated);
            assert_eq!(curve.len(), 21);
            assert!(curve.is_x_monotone());
            assert!(curve.sample_sizes().iter().all(|&n| n <= 800.0));
        }

        #[test]
        fn test_power_curve_skips_lifts_beyond_valid_rate() {
            let lifts = linear_grid(0.01, 0.25, 0.01).unwrap();
            let curve = service()
                .sweep_power_curve(ExperimentFamily::NormalApproxProportion, 0.8, 0.8, 0.2, &lifts)
                .unwrap();

            assert!(!curve.is_empty());
            assert!(curve.lifts().iter().all(|&lift| lift < 0.2));
            assert!(curve.is_x_monotone());
        }

        #[test]
        fn test_power_curve_rejects_invalid_rate() {
            let result = service().sweep_power_curve(
                ExperimentFamily::ChiSquareGoodnessOfFit,
                1.2,
                0.8,
                0.2,
                &[0.1],
            );
            assert!(matches!(result, Err(PowerError::Validation { .. })));
        }

        #[test]
        fn test_power_curve_ignores_input_order() {
            let family = ExperimentFamily::ChiSquareGoodnessOfFit;
            let ascending = service()
                .sweep_power_curve(family, 0.3, 0.8, 0.2, &[0.1, 0.2])
                .unwrap();
            let descending = service()
                .sweep_power_curve(family, 0.3, 0.8, 0.2, &[0.2, 0.1])
                .unwrap();
            assert_eq!(ascending, descending);
        }

        #[test]
        fn test_significance_curve() {
            let sample_sizes = [20.0, 100.0, 300.0, 800.0];
            let curve = service()
                .sweep_significance_curve(0.3, 0.2, &sample_sizes)
                .unwrap();

            assert_eq!(curve.sample_sizes(), sample_sizes.to_vec());
            assert!(!curve.truncated);

            let lifts = curve.lifts();
            assert!(lifts.windows(2).all(|pair| pair[0] > pair[1]));
        }

        #[test]
        fn test_detectable_lift_curve() {
            let sample_sizes = linear_grid(20.0, 800.0, 20.0).unwrap();
            let curve = service()
                .sweep_detectable_lift_curve(
                    ExperimentFamily::NormalApproxProportion,
                    0.3,
                    0.8,
                    0.2,
                    &sample_sizes,
                )
                .unwrap();

            assert_eq!(curve.len(), 40);
            assert!(curve.is_x_monotone());
            assert!((curve.points[0].lift - 0.332).abs() < 2.0 * EPSILON);
            assert!((curve.points[39].lift - 0.05).abs() < 2.0 * EPSILON);
        }

        #[test]
        fn test_invalid_sample_size_fails_curve() {
            let result = service().sweep_significance_curve(0.3, 0.2, &[100.0, -1.0]);
            assert!(matches!(result, Err(PowerError::Validation { .. })));
        }
    }

    mod mock_tests {
        use super::*;

        fn design() -> TestDesign {
            TestDesign::default()
        }

        #[test]
        fn test_power_curve_stops_at_first_no_solution() {
            let mut analysis = MockPowerAnalysis::new();
            analysis
                .expect_required_sample_size()
                .times(3)
                .returning(|effect, _, _, ceiling| {
                    if effect < 0.1 {
                        Err(PowerError::no_solution(effect, ceiling))
                    } else {
                        Ok(20.0 / effect)
                    }
                });

            let curve = service()
                .power_curve_with(&analysis, design(), 0.3, 0.8, 0.2, &[0.04, 0.05, 0.1, 0.2])
                .unwrap();

            assert!(curve.truncated);
            assert_eq!(curve.lifts(), vec![0.2, 0.1]);
            assert!(curve.is_x_monotone());
        }

        #[test]
        fn test_power_curve_passes_ceiling() {
            let service = PowerService::new(SolverConfig::default().with_sample_size_ceiling(500.0));

            let mut analysis = MockPowerAnalysis::new();
            analysis
                .expect_required_sample_size()
                .withf(|_, power, alpha, ceiling| *power == 0.9 && *alpha == 0.1 && *ceiling == 500.0)
                .returning(|_, _, _, _| Ok(42.0));

            let curve = service
                .power_curve_with(&analysis, design(), 0.3, 0.9, 0.1, &[0.1])
                .unwrap();
            assert_eq!(curve.sample_sizes(), vec![42.0]);
        }

        #[test]
        fn test_power_curve_propagates_failures() {
            let mut analysis = MockPowerAnalysis::new();
            analysis
                .expect_required_sample_size()
                .returning(|_, _, _, _| Err(PowerError::distribution("bad parameters")));

            let result = service().power_curve_with(&analysis, design(), 0.3, 0.8, 0.2, &[0.1]);
            assert!(matches!(result, Err(PowerError::Distribution { .. })));
        }

        #[test]
        fn test_unreachable_effect_truncates_detectable_lift_curve() {
            let mut analysis = MockPowerAnalysis::new();
            analysis
                .expect_known_effect_for_sample_size()
                .returning(|nobs, _, _| Ok(10.0 / nobs));

            // Chi-square effect at rate 0.3 never exceeds 0.7 / 1.3
            let curve = service()
                .detectable_lift_curve_with(&analysis, design(), 0.3, 0.8, 0.2, &[10.0, 100.0, 400.0])
                .unwrap();

            assert!(curve.truncated);
            assert_eq!(curve.sample_sizes(), vec![100.0, 400.0]);
        }
    }

    mod plan_tests {
        use super::*;

        fn request(solve_for: SolveFor) -> PlanRequest {
            PlanRequest {
                solve_for,
                design: TestDesign::two_arm(ExperimentFamily::NormalApproxProportion),
                alpha: 0.2,
                power: 0.8,
                recipients: Some(300.0),
                metrics: vec![
                    MetricInput::new("open_rate", 0.3).with_lift(0.1),
                    MetricInput::new("click_rate", 0.02).with_lift(0.02),
                ],
                sample_sizes: vec![100.0, 300.0, 800.0],
            }
        }

        #[tokio::test]
        async fn test_plan_for_lift() {
            let result = Arc::new(service()).plan(request(SolveFor::Lift)).await.unwrap();

            assert_eq!(result.metrics.len(), 2);
            let open = result.get_metric("open_rate").unwrap();
            assert!((open.minimum_lift.unwrap() - 0.082).abs() < 2.0 * EPSILON);
            assert_eq!(open.summary, "8.2% lift");
            assert_eq!(open.curve.len(), 3);
        }

        #[tokio::test]
        async fn test_plan_for_recipients() {
            let result = Arc::new(service())
                .plan(request(SolveFor::Recipients))
                .await
                .unwrap();

            let open = result.get_metric("open_rate").unwrap();
            assert!((open.required_recipients.unwrap() - 204.314).abs() < 0.01);
            assert_eq!(open.summary, "205 recipients");

            let click = result.get_metric("click_rate").unwrap();
            assert!(click.required_recipients.unwrap() < 800.0);
        }

        #[tokio::test]
        async fn test_plan_reports_infeasible_metric_alongside_feasible_one() {
            let mut request = request(SolveFor::Recipients);
            request.metrics = vec![
                MetricInput::new("open_rate", 0.3).with_lift(0.07),
                MetricInput::new("click_rate", 0.02).with_lift(0.005),
            ];

            let result = Arc::new(service()).plan(request).await.unwrap();

            let open = result.get_metric("open_rate").unwrap();
            assert!(open.feasible);
            assert!((open.required_recipients.unwrap() - 408.819).abs() < 0.01);

            let click = result.get_metric("click_rate").unwrap();
            assert!(!click.feasible);
            assert!(click.required_recipients.is_none());
            assert_eq!(click.summary, "more than 800 recipients");
            assert!(!click.curve.is_empty());
        }

        #[tokio::test]
        async fn test_plan_reports_undetectable_lift() {
            let mut request = request(SolveFor::Lift);
            request.recipients = Some(2.0);
            request.design = TestDesign::two_arm(ExperimentFamily::ChiSquareGoodnessOfFit);

            let result = Arc::new(service()).plan(request).await.unwrap();

            let click = result.get_metric("click_rate").unwrap();
            assert!(!click.feasible);
            assert!(click.minimum_lift.is_none());
        }

        #[tokio::test]
        async fn test_plan_keeps_metric_order() {
            let result = Arc::new(service()).plan(request(SolveFor::Lift)).await.unwrap();
            let names: Vec<_> = result.metrics.iter().map(|m| m.metric.as_str()).collect();
            assert_eq!(names, vec!["open_rate", "click_rate"]);
        }

        #[tokio::test]
        async fn test_plan_requires_lift_per_metric() {
            let mut request = request(SolveFor::Recipients);
            request.metrics[1].lift = None;

            let result = Arc::new(service()).plan(request).await;
            assert!(matches!(result, Err(PowerError::Validation { .. })));
        }

        #[tokio::test]
        async fn test_plan_rejects_invalid_alpha() {
            let mut request = request(SolveFor::Lift);
            request.alpha = 0.0;

            let result = Arc::new(service()).plan(request).await;
            assert!(matches!(result, Err(PowerError::Validation { .. })));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_detectable_lift_inverts_required_sample_size(
            rate in 0.01f64..0.6,
            lift in 0.005f64..0.45,
            normal in any::<bool>(),
        ) {
            prop_assume!(rate + lift < 0.98);

            let family = if normal {
                ExperimentFamily::NormalApproxProportion
            } else {
                ExperimentFamily::ChiSquareGoodnessOfFit
            };

            let required = service().required_sample_size(family, rate, lift, 0.8, 0.2);
            prop_assume!(!matches!(required, Err(ref err) if err.is_no_solution()));

            // At the smallest sample size many lifts share one answer
            let nobs = required.unwrap();
            prop_assume!(nobs > 2.0);

            let recovered = service()
                .minimum_detectable_lift(family, rate, nobs, 0.8, 0.2)
                .unwrap();

            prop_assert!((recovered - lift).abs() <= 2.0 * EPSILON);
        }
    }
}
