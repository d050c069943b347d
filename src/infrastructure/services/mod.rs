//! Infrastructure services

mod power_service;

pub use power_service::{MetricInput, PlanRequest, PowerService};
