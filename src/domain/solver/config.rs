use serde::Deserialize;

/// Numeric policy constants for the solvers
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Accepted distance between target and function value
    pub tolerance: f64,
    /// Iteration cap of the lift root finder
    pub max_iterations: u32,
    /// First lift step when inverting an effect size
    pub effect_initial_step: f64,
    /// First lift step when inverting a p-value
    pub pvalue_initial_step: f64,
    /// Smallest lift tried by a p-value search
    pub pvalue_floor: f64,
    /// Largest per-arm sample size a solve may return
    pub sample_size_ceiling: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            max_iterations: 200,
            effect_initial_step: 0.1,
            pvalue_initial_step: 0.2,
            pvalue_floor: 1e-4,
            sample_size_ceiling: 800.0,
        }
    }
}

impl SolverConfig {
    /// Same config with a different tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Same config with a different sample size ceiling
    pub fn with_sample_size_ceiling(mut self, ceiling: f64) -> Self {
        self.sample_size_ceiling = ceiling;
        self
    }

    /// Same config with a different iteration cap
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}
