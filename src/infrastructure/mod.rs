//! Infrastructure layer - Concrete distributions, power analyses and services

pub mod distributions;
pub mod logging;
pub mod power;
pub mod services;
pub mod significance;
