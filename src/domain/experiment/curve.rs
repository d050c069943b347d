//! Curve types produced by sweeps and consumed by renderers

use serde::{Deserialize, Serialize};

/// One point of a sample-size/lift curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Observations per arm
    pub sample_size: f64,
    /// Absolute lift over the baseline rate
    pub lift: f64,
}

impl CurvePoint {
    pub fn new(sample_size: f64, lift: f64) -> Self {
        Self { sample_size, lift }
    }
}

/// Ordered sequence of points, monotone in sample size
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub points: Vec<CurvePoint>,
    /// Set when the sweep stopped before consuming every input value
    pub truncated: bool,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: CurvePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same points in ascending sample-size order
    pub fn sorted_by_sample_size(mut self) -> Self {
        self.points
            .sort_by(|a, b| a.sample_size.total_cmp(&b.sample_size));
        self
    }

    /// Sample sizes (x axis)
    pub fn sample_sizes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.sample_size).collect()
    }

    /// Lifts (y axis)
    pub fn lifts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.lift).collect()
    }

    /// Whether sample sizes never decrease along the curve
    pub fn is_x_monotone(&self) -> bool {
        self.points
            .windows(2)
            .all(|pair| pair[0].sample_size <= pair[1].sample_size)
    }
}
