//! Exponential time-to-distraction model.
//!
//! The chance that the user has drifted off after `t` seconds is the CDF of
//! an exponential distribution with rate `1 / base_period_sec`:
//!
//! ```text
//! P(t) = 1 - exp(-t / period)
//! t(p) = -period * ln(1 - p)
//! ```
//!
//! Everything here is a pure function of scalars.

/// Highest alarm threshold accepted anywhere in the crate.
///
/// At exactly 1.0 the predicted wait is infinite.
pub const MAX_THRESHOLD: f64 = 0.9999;

/// Probability that a distraction has happened `elapsed_sec` into a period.
///
/// Negative elapsed time (clock stepped backwards) counts as zero.
pub fn probability(elapsed_sec: f64, base_period_sec: f64) -> f64 {
    let t = elapsed_sec.max(0.0);
    // 1 - e^-x, without cancellation for small x
    -(-t / base_period_sec).exp_m1()
}

/// Seconds until [`probability`] reaches `threshold`.
///
/// The threshold is clamped into `[0, MAX_THRESHOLD]`, so the result is
/// always finite.
pub fn predicted_wait(threshold: f64, base_period_sec: f64) -> f64 {
    let p = clamp_threshold(threshold);
    -base_period_sec * (-p).ln_1p()
}

/// Seconds left before the alarm may fire, never negative.
pub fn remaining(elapsed_sec: f64, threshold: f64, base_period_sec: f64) -> f64 {
    (predicted_wait(threshold, base_period_sec) - elapsed_sec.max(0.0)).max(0.0)
}

/// Clamp a threshold into the accepted range. NaN maps to 0.
pub fn clamp_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        return 0.0;
    }
    threshold.clamp(0.0, MAX_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_elapsed_is_zero_probability() {
        assert_eq!(probability(0.0, 60.0), 0.0);
    }

    #[test]
    fn one_period_is_one_minus_inverse_e() {
        let p = probability(60.0, 60.0);
        assert!((p - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn negative_elapsed_clamps_to_zero() {
        assert_eq!(probability(-5.0, 60.0), 0.0);
        assert_eq!(remaining(-5.0, 0.5, 100.0), predicted_wait(0.5, 100.0));
    }

    #[test]
    fn half_threshold_wait_is_period_ln2() {
        let t = predicted_wait(0.5, 100.0);
        assert!((t - 100.0 * std::f64::consts::LN_2).abs() < 1e-9);
    }

    #[test]
    fn threshold_one_gives_finite_wait() {
        let t = predicted_wait(1.0, 100.0);
        assert!(t.is_finite());
        assert_eq!(t, predicted_wait(MAX_THRESHOLD, 100.0));
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining(1_000.0, 0.5, 100.0), 0.0);
        assert!((remaining(10.0, 0.5, 100.0) - (predicted_wait(0.5, 100.0) - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn clamp_threshold_handles_edges() {
        assert_eq!(clamp_threshold(-0.2), 0.0);
        assert_eq!(clamp_threshold(1.5), MAX_THRESHOLD);
        assert_eq!(clamp_threshold(f64::NAN), 0.0);
        assert_eq!(clamp_threshold(0.25), 0.25);
    }

    proptest! {
        #[test]
        fn prop_probability_in_unit_interval(
            t in 0.0f64..1.0e6,
            period in 1.0e-2f64..1.0e5,
        ) {
            let p = probability(t, period);
            prop_assert!(p >= 0.0);
            prop_assert!(p <= 1.0);
            // f64 only saturates to exactly 1.0 far out in the tail.
            if t / period < 30.0 {
                prop_assert!(p < 1.0);
            }
        }

        #[test]
        fn prop_probability_non_decreasing(
            t in 0.0f64..1.0e5,
            dt in 0.0f64..1.0e4,
            period in 1.0e-1f64..1.0e5,
        ) {
            prop_assert!(probability(t + dt, period) >= probability(t, period));
        }

        #[test]
        fn prop_predicted_wait_round_trips(
            p in 0.0f64..=MAX_THRESHOLD,
            period in 1.0e-1f64..1.0e5,
        ) {
            let back = probability(predicted_wait(p, period), period);
            prop_assert!((back - p).abs() < 1e-9, "p={} back={}", p, back);
        }
    }
}
