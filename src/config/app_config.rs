use serde::Deserialize;

use crate::domain::{linear_grid, PowerError, SolverConfig};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub solver: SolverConfig,
    pub sweep: SweepConfig,
    pub logging: LoggingConfig,
}

/// Default grids of the curve sweeps
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    pub sample_size_start: f64,
    pub sample_size_end: f64,
    pub sample_size_step: f64,
    pub lift_start: f64,
    pub lift_end: f64,
    pub lift_step: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sample_size_start: 20.0,
            sample_size_end: 800.0,
            sample_size_step: 20.0,
            lift_start: 0.01,
            lift_end: 0.25,
            lift_step: 0.01,
        }
    }
}

impl SweepConfig {
    /// Recipients grid
    pub fn sample_sizes(&self) -> Result<Vec<f64>, PowerError> {
        linear_grid(
            self.sample_size_start,
            self.sample_size_end,
            self.sample_size_step,
        )
    }

    /// Lift grid
    pub fn lifts(&self) -> Result<Vec<f64>, PowerError> {
        linear_grid(self.lift_start, self.lift_end, self.lift_step)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LIFT_POWER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
