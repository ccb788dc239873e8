//! Numeric guards applied at the configuration boundary.
//!
//! Values read from disk may be negative, NaN or absurdly large. These
//! helpers fold them back into a usable range so nothing downstream has to
//! re-validate.

/// Clamp `value` into `[min, max]`, substituting `fallback` for non-finite
/// input.
#[must_use]
pub fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// `f64` counterpart of [`clamp_or`], used for durations in seconds.
#[must_use]
pub fn clamp_seconds_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Replace non-positive or non-finite radii with `fallback`, then clamp.
#[must_use]
pub fn positive_radius_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::inside(3.0, 3.0)]
    #[case::below(-2.0, 0.0)]
    #[case::above(20.0, 10.0)]
    #[case::nan(f32::NAN, 7.0)]
    #[case::infinite(f32::INFINITY, 7.0)]
    fn clamp_or_folds_values(#[case] input: f32, #[case] expected: f32) {
        assert!((clamp_or(input, 0.0, 10.0, 7.0) - expected).abs() < f32::EPSILON);
    }

    #[rstest]
    #[case::negative(-4.0, 30.0)]
    #[case::zero(0.0, 30.0)]
    #[case::small(1.0, 5.0)]
    #[case::large(90.0, 60.0)]
    fn radius_guard_replaces_non_positive(#[case] input: f32, #[case] expected: f32) {
        let actual = positive_radius_or(input, 5.0, 60.0, 30.0);
        assert!((actual - expected).abs() < f32::EPSILON);
    }

    #[rstest]
    fn seconds_guard_handles_nan() {
        assert!((clamp_seconds_or(f64::NAN, 0.1, 1.0, 0.3) - 0.3).abs() < f64::EPSILON);
        assert!((clamp_seconds_or(5.0, 0.1, 1.0, 0.3) - 1.0).abs() < f64::EPSILON);
    }
}
