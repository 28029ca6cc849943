//! Small numeric helpers shared by metrics, regime and risk.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n). 0 for fewer than 2 values.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Empirical percentile with linear interpolation between closest ranks
/// (`p` in 0..=100). Returns 0 for an empty slice.
pub fn percentile_linear(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    // + 0.0 folds -0.0 into 0.0
    (value * factor).round() / factor + 0.0
}

pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_basic() {
        assert_eq!(mean(&[]), 0.0);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn population_std_basic() {
        assert_eq!(population_std(&[0.5]), 0.0);
        assert_relative_eq!(population_std(&[0.1, -0.05]), 0.075, epsilon = 1e-12);
        assert_relative_eq!(
            population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn percentile_interpolates() {
        let values = [0.3, -0.2, 0.1, 0.0, -0.1];
        // sorted: -0.2, -0.1, 0.0, 0.1, 0.3; rank = 0.05 * 4 = 0.2
        assert_relative_eq!(percentile_linear(&values, 5.0), -0.18, epsilon = 1e-12);
        assert_relative_eq!(percentile_linear(&values, 50.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(percentile_linear(&values, 100.0), 0.3, epsilon = 1e-12);
        assert_relative_eq!(percentile_linear(&values, 0.0), -0.2, epsilon = 1e-12);
    }

    #[test]
    fn percentile_single_and_empty() {
        assert_eq!(percentile_linear(&[], 5.0), 0.0);
        assert_eq!(percentile_linear(&[0.42], 5.0), 0.42);
    }

    #[test]
    fn rounding() {
        assert_eq!(round4(0.333_333_3), 0.3333);
        assert_eq!(round4(0.044_999_99), 0.045);
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert!(round4(-0.000_01).is_sign_positive());
    }
}
