//! Result types for significance tests and experiment plans

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::curve::Curve;
use super::parameters::ExperimentFamily;

// ============================================================================
// SignificanceResult
// ============================================================================

/// Outcome of a two-proportion significance test on observed counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignificanceResult {
    /// Chi-square statistic of the 2x2 table
    pub statistic: f64,
    /// P-value from the statistical test
    pub p_value: f64,
    /// Whether the result is statistically significant
    pub is_significant: bool,
    /// Significance level used (e.g., 0.2 for 20%)
    pub alpha: f64,
    /// Observed rate of the control arm
    pub control_rate: f64,
    /// Observed rate of the treatment arm
    pub treatment_rate: f64,
    /// Absolute lift from control to treatment
    pub lift: f64,
    /// Relative change from control to treatment (percentage)
    pub relative_change: f64,
}

impl SignificanceResult {
    /// Create a new significance result
    pub fn new(
        statistic: f64,
        p_value: f64,
        alpha: f64,
        control_rate: f64,
        treatment_rate: f64,
    ) -> Self {
        let relative_change = if control_rate != 0.0 {
            (treatment_rate - control_rate) / control_rate * 100.0
        } else {
            0.0
        };

        Self {
            statistic,
            p_value,
            is_significant: p_value < alpha,
            alpha,
            control_rate,
            treatment_rate,
            lift: treatment_rate - control_rate,
            relative_change,
        }
    }

    /// Headline word shown to the user
    pub fn verdict(&self) -> &'static str {
        if self.is_significant {
            "significant"
        } else {
            "insignificant"
        }
    }

    /// Check if the treatment beats control with significance
    pub fn treatment_is_better(&self) -> bool {
        self.is_significant && self.treatment_rate > self.control_rate
    }
}

// ============================================================================
// SolveFor
// ============================================================================

/// Which quantity a plan solves for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveFor {
    /// Minimum number of recipients for a given lift
    Recipients,
    /// Minimum detectable lift for a given number of recipients
    Lift,
}

impl fmt::Display for SolveFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recipients => write!(f, "recipients"),
            Self::Lift => write!(f, "lift"),
        }
    }
}

impl FromStr for SolveFor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recipients" | "sample-size" | "sample_size" => Ok(Self::Recipients),
            "lift" => Ok(Self::Lift),
            other => Err(format!("Unknown quantity to solve for: '{other}'")),
        }
    }
}

// ============================================================================
// MetricPlan
// ============================================================================

/// Plan for one metric (open rate, click rate, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPlan {
    /// Name of the metric
    pub metric: String,
    /// Baseline rate of the metric
    pub baseline_rate: f64,
    /// Required recipients per arm, when solving for recipients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_recipients: Option<f64>,
    /// Minimum detectable lift, when solving for lift
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_lift: Option<f64>,
    /// False when the question has no answer inside the solver's limits
    pub feasible: bool,
    /// Rounded, human readable answer
    pub summary: String,
    /// Detectable lift across the recipients grid
    pub curve: Curve,
}

impl MetricPlan {
    /// Plan answered with a recipient count
    pub fn recipients(metric: impl Into<String>, baseline_rate: f64, recipients: f64) -> Self {
        Self {
            metric: metric.into(),
            baseline_rate,
            required_recipients: Some(recipients),
            minimum_lift: None,
            feasible: true,
            summary: format!("{} recipients", recipients.ceil()),
            curve: Curve::new(),
        }
    }

    /// Plan answered with a minimum lift
    pub fn lift(metric: impl Into<String>, baseline_rate: f64, lift: f64) -> Self {
        Self {
            metric: metric.into(),
            baseline_rate,
            required_recipients: None,
            minimum_lift: Some(lift),
            feasible: true,
            summary: format!("{:.1}% lift", lift * 100.0),
            curve: Curve::new(),
        }
    }

    /// Plan whose lift needs more recipients than `ceiling`
    pub fn beyond_ceiling(metric: impl Into<String>, baseline_rate: f64, ceiling: f64) -> Self {
        Self {
            metric: metric.into(),
            baseline_rate,
            required_recipients: None,
            minimum_lift: None,
            feasible: false,
            summary: format!("more than {} recipients", ceiling.floor()),
            curve: Curve::new(),
        }
    }

    /// Plan whose recipient count cannot detect any valid lift
    pub fn undetectable(metric: impl Into<String>, baseline_rate: f64, recipients: f64) -> Self {
        Self {
            metric: metric.into(),
            baseline_rate,
            required_recipients: None,
            minimum_lift: None,
            feasible: false,
            summary: format!("no detectable lift with {} recipients", recipients.floor()),
            curve: Curve::new(),
        }
    }

    /// Attach the detectable-lift curve
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }
}

// ============================================================================
// PlanResult
// ============================================================================

/// Complete plan across all metrics of one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub solve_for: SolveFor,
    pub family: ExperimentFamily,
    pub alpha: f64,
    pub power: f64,
    pub metrics: Vec<MetricPlan>,
}

impl PlanResult {
    pub fn new(solve_for: SolveFor, family: ExperimentFamily, alpha: f64, power: f64) -> Self {
        Self {
            solve_for,
            family,
            alpha,
            power,
            metrics: Vec::new(),
        }
    }

    /// Add a metric plan
    pub fn with_metric(mut self, metric: MetricPlan) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Get the plan of a metric by name
    pub fn get_metric(&self, metric: &str) -> Option<&MetricPlan> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}
