//! Power analysis implementations, selected at runtime from a `TestDesign`

mod chisquare;
mod ttest;

pub use chisquare::GofChisquarePower;
pub use ttest::TTestIndPower;

use std::sync::Arc;

use crate::domain::{ExperimentFamily, PowerAnalysis, PowerError, TestDesign};

/// Create the power analysis that matches a test design
pub fn create_power_analysis(design: TestDesign) -> Result<Arc<dyn PowerAnalysis>, PowerError> {
    design.validate()?;

    match design.family {
        ExperimentFamily::ChiSquareGoodnessOfFit => {
            Ok(Arc::new(GofChisquarePower::new(design.arms)?))
        }
        ExperimentFamily::NormalApproxProportion => Ok(Arc::new(TTestIndPower::new())),
    }
}
