//! Effect-size models
//!
//! Maps a baseline rate and an absolute lift to the standardized effect size
//! consumed by the power analyses. Both family models are strictly increasing
//! in lift for a fixed rate, which is what makes the lift inversion in
//! [`crate::domain::solver`] well posed.

use super::error::PowerError;
use super::experiment::{validate_lift, validate_rate, ExperimentFamily, TestDesign};

/// Effect size of a two-arm experiment of the given family
pub fn effect_size(family: ExperimentFamily, rate: f64, lift: f64) -> Result<f64, PowerError> {
    design_effect_size(TestDesign::two_arm(family), rate, lift)
}

/// Effect size of an experiment design
///
/// For the chi-square family the observed proportions are
/// `[rate + lift, rate, ..., rate]` (one treated arm, `arms - 1` baseline arms)
/// against a uniform expectation; the result carries the sign of the lift.
pub fn design_effect_size(design: TestDesign, rate: f64, lift: f64) -> Result<f64, PowerError> {
    design.validate()?;
    let treated = treated_rate(rate, lift)?;

    match design.family {
        ExperimentFamily::ChiSquareGoodnessOfFit => {
            let arms = design.arms as usize;
            let expected = vec![1.0 / arms as f64; arms];
            let mut observed = vec![rate; arms];
            observed[0] = treated;

            let magnitude = chisquare_effect_size(&expected, &observed)?;
            Ok(magnitude.copysign(lift))
        }
        ExperimentFamily::NormalApproxProportion => Ok(proportion_effect_size(rate, treated)),
    }
}

/// Cohen's w between two discrete distributions
///
/// Both inputs are normalized to sum to one before comparison.
pub fn chisquare_effect_size(expected: &[f64], observed: &[f64]) -> Result<f64, PowerError> {
    if expected.len() != observed.len() {
        return Err(PowerError::validation(format!(
            "expected has {} cells but observed has {}",
            expected.len(),
            observed.len()
        )));
    }

    if expected.len() < 2 {
        return Err(PowerError::validation(
            "chi-square effect size needs at least 2 cells",
        ));
    }

    if expected.iter().any(|&p| !p.is_finite() || p <= 0.0) {
        return Err(PowerError::out_of_domain(
            "expected proportions must be positive",
        ));
    }

    if observed.iter().any(|&p| !p.is_finite() || p < 0.0) {
        return Err(PowerError::out_of_domain(
            "observed proportions must be non-negative",
        ));
    }

    let expected_total: f64 = expected.iter().sum();
    let observed_total: f64 = observed.iter().sum();

    if observed_total <= 0.0 {
        return Err(PowerError::out_of_domain(
            "observed proportions sum to zero",
        ));
    }

    let d2: f64 = expected
        .iter()
        .zip(observed.iter())
        .map(|(&e, &o)| {
            let p0 = e / expected_total;
            let p1 = o / observed_total;
            (p1 - p0).powi(2) / p0
        })
        .sum();

    Ok(d2.sqrt())
}

/// Cohen's h: `2 * (asin(sqrt(treated)) - asin(sqrt(baseline)))`
pub fn proportion_effect_size(baseline: f64, treated: f64) -> f64 {
    2.0 * (treated.sqrt().asin() - baseline.sqrt().asin())
}

/// Treated rate `rate + lift`, which must lie strictly inside (0, 1)
pub fn treated_rate(rate: f64, lift: f64) -> Result<f64, PowerError> {
    validate_rate(rate)?;
    validate_lift(lift)?;

    let treated = rate + lift;

    if treated <= 0.0 || treated >= 1.0 {
        return Err(PowerError::out_of_domain(format!(
            "rate + lift = {rate} + {lift} = {treated} is not in (0, 1)"
        )));
    }

    Ok(treated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FAMILIES: [ExperimentFamily; 2] = [
        ExperimentFamily::ChiSquareGoodnessOfFit,
        ExperimentFamily::NormalApproxProportion,
    ];

    mod chisquare_tests {
        use super::*;

        #[test]
        fn test_two_arm_closed_form() {
            // w = |lift| / (2 * rate + lift) for two arms
            let es = effect_size(ExperimentFamily::ChiSquareGoodnessOfFit, 0.3, 0.1).unwrap();
            assert!((es - 0.1 / 0.7).abs() < 1e-12);
        }

        #[test]
        fn test_k_arm_closed_form() {
            // w = sqrt(k - 1) * lift / (k * rate + lift)
            let design = TestDesign::chisquare(4).unwrap();
            let es = design_effect_size(design, 0.2, 0.05).unwrap();
            let expected = 3.0_f64.sqrt() * 0.05 / (4.0 * 0.2 + 0.05);
            assert!((es - expected).abs() < 1e-12);
        }

        #[test]
        fn test_negative_lift_is_negative() {
            let es = effect_size(ExperimentFamily::ChiSquareGoodnessOfFit, 0.3, -0.1).unwrap();
            assert!(es < 0.0);
            assert!((es + 0.1 / 0.5).abs() < 1e-12);
        }

        #[test]
        fn test_zero_lift() {
            let es = effect_size(ExperimentFamily::ChiSquareGoodnessOfFit, 0.3, 0.0).unwrap();
            assert_eq!(es, 0.0);
        }

        #[test]
        fn test_general_vectors_are_normalized() {
            let es = chisquare_effect_size(&[1.0, 1.0], &[30.0, 40.0]).unwrap();
            let direct = chisquare_effect_size(&[0.5, 0.5], &[0.3, 0.4]).unwrap();
            assert!((es - direct).abs() < 1e-12);
        }

        #[test]
        fn test_mismatched_lengths() {
            assert!(matches!(
                chisquare_effect_size(&[0.5, 0.5], &[0.2, 0.3, 0.5]),
                Err(PowerError::Validation { .. })
            ));
        }

        #[test]
        fn test_zero_expected_cell() {
            assert!(matches!(
                chisquare_effect_size(&[0.0, 1.0], &[0.5, 0.5]),
                Err(PowerError::OutOfDomain { .. })
            ));
        }
    }

    mod normal_approx_tests {
        use super::*;

        #[test]
        fn test_cohens_h() {
            let es = effect_size(ExperimentFamily::NormalApproxProportion, 0.3, 0.1).unwrap();
            let expected = 2.0 * (0.4_f64.sqrt().asin() - 0.3_f64.sqrt().asin());
            assert!((es - expected).abs() < 1e-12);
            assert!(es > 0.0);
        }

        #[test]
        fn test_three_arms_rejected() {
            let design = TestDesign {
                family: ExperimentFamily::NormalApproxProportion,
                arms: 3,
            };
            assert!(matches!(
                design_effect_size(design, 0.3, 0.1),
                Err(PowerError::Validation { .. })
            ));
        }
    }

    mod domain_tests {
        use super::*;

        #[test]
        fn test_lift_pushes_rate_above_one() {
            for family in FAMILIES {
                assert!(matches!(
                    effect_size(family, 0.30, 0.75),
                    Err(PowerError::OutOfDomain { .. })
                ));
            }
        }

        #[test]
        fn test_lift_pushes_rate_to_zero() {
            for family in FAMILIES {
                assert!(matches!(
                    effect_size(family, 0.30, -0.30),
                    Err(PowerError::OutOfDomain { .. })
                ));
            }
        }

        #[test]
        fn test_invalid_rate() {
            assert!(matches!(
                effect_size(ExperimentFamily::NormalApproxProportion, 1.0, -0.5),
                Err(PowerError::Validation { .. })
            ));
        }

        #[test]
        fn test_zero_rate_with_positive_lift() {
            let es = effect_size(ExperimentFamily::ChiSquareGoodnessOfFit, 0.0, 0.05).unwrap();
            assert!((es - 1.0).abs() < 1e-12);
        }
    }

    proptest! {
        #[test]
        fn prop_effect_size_strictly_increasing_in_lift(
            rate in 0.01f64..0.9,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            // Map a, b into the open lift interval (-rate, 1 - rate)
            let span = 1.0 - 2e-6;
            let low = -rate + 1e-6 + a.min(b) * span;
            let high = -rate + 1e-6 + a.max(b) * span;
            prop_assume!(high - low > 1e-6);

            for family in FAMILIES {
                let es_low = effect_size(family, rate, low).unwrap();
                let es_high = effect_size(family, rate, high).unwrap();
                prop_assert!(es_low < es_high, "{family}: f({low}) = {es_low} >= f({high}) = {es_high}");
            }
        }
    }
}
