//! Channel Statistics
//!
//! The five per-channel statistics the model was trained on: mean,
//! population standard deviation, last-minus-mean, sample skewness and
//! sample excess kurtosis.
//!
//! Skewness is the adjusted Fisher-Pearson coefficient (G1) and kurtosis
//! the bias-corrected excess kurtosis (G2), matching the statistics the
//! training pipeline produced. Both resolve to 0.0 for a constant window
//! instead of dividing by zero.

/// Statistics of one channel over a full batch window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f64,
    pub std: f64,
    pub last_minus_mean: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl ChannelStats {
    /// Compute all five statistics over `data`.
    ///
    /// `data` must be non-empty; the extractor guarantees a full batch
    /// window before calling in.
    pub fn compute(data: &[f64]) -> Self {
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let last = data[data.len() - 1];

        // Central moments (population, divisor n)
        let m2 = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let m3 = data.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;
        let m4_sum = data.iter().map(|x| (x - mean).powi(4)).sum::<f64>();

        Self {
            mean,
            std: m2.sqrt(),
            last_minus_mean: last - mean,
            skewness: sample_skewness(data.len(), m2, m3),
            kurtosis: sample_kurtosis(data.len(), m2, m4_sum),
        }
    }
}

/// Adjusted Fisher-Pearson skewness: g1 * sqrt(n(n-1)) / (n-2),
/// g1 = m3 / m2^(3/2).
///
/// Returns 0.0 for a constant window (m2 == 0) or fewer than 3 samples.
fn sample_skewness(n: usize, m2: f64, m3: f64) -> f64 {
    if n < 3 || m2 == 0.0 {
        return 0.0;
    }

    let nf = n as f64;
    let g1 = m3 / m2.powf(1.5);
    g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0)
}

/// Bias-corrected excess kurtosis:
/// n(n+1) / ((n-1)(n-2)(n-3)) * sum(d^4)/s^4 - 3(n-1)^2 / ((n-2)(n-3)),
/// with s^2 the sample variance (divisor n-1).
///
/// Returns 0.0 for a constant window or fewer than 4 samples.
fn sample_kurtosis(n: usize, m2: f64, m4_sum: f64) -> f64 {
    if n < 4 || m2 == 0.0 {
        return 0.0;
    }

    let nf = n as f64;
    let s2 = m2 * nf / (nf - 1.0);

    let lead = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));
    let tail = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
    lead * m4_sum / (s2 * s2) - tail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_population_std() {
        let data: Vec<f64> = (1..=24).map(|i| i as f64).collect();
        let stats = ChannelStats::compute(&data);

        assert!((stats.mean - 12.5).abs() < 1e-12);
        // Population variance of 1..n is (n^2 - 1) / 12.
        let expected_std = (575.0_f64 / 12.0).sqrt();
        assert!((stats.std - expected_std).abs() < 1e-12);
        assert!((stats.last_minus_mean - 11.5).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_window_has_zero_skewness() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = ChannelStats::compute(&data);
        assert!(stats.skewness.abs() < 1e-12);
    }

    #[test]
    fn test_uniform_window_kurtosis() {
        // Bias-corrected excess kurtosis of [1..5] is exactly -1.2.
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = ChannelStats::compute(&data);
        assert!((stats.kurtosis + 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_right_tailed_window_skewness() {
        // Hand-computed G1 for [1, 2, 3, 4, 10]:
        // m2 = 10, m3 = 36, g1 = 36/10^1.5, G1 = g1 * sqrt(20)/3.
        let data = [1.0, 2.0, 3.0, 4.0, 10.0];
        let stats = ChannelStats::compute(&data);
        let expected = (36.0 / 10.0_f64.powf(1.5)) * 20.0_f64.sqrt() / 3.0;
        assert!((stats.skewness - expected).abs() < 1e-12);
        assert!(stats.skewness > 1.0, "long right tail should skew positive");
    }

    #[test]
    fn test_constant_window_falls_back_to_zero() {
        let data = [5.0; 24];
        let stats = ChannelStats::compute(&data);

        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.last_minus_mean, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.kurtosis, 0.0);
        assert!(stats.skewness.is_finite() && stats.kurtosis.is_finite());
    }

    #[test]
    fn test_negative_skew_mirrors_positive() {
        let data = [1.0, 2.0, 3.0, 4.0, 10.0];
        let mirrored: Vec<f64> = data.iter().map(|x| -x).collect();

        let right = ChannelStats::compute(&data);
        let left = ChannelStats::compute(&mirrored);
        assert!((right.skewness + left.skewness).abs() < 1e-12);
        assert!((right.kurtosis - left.kurtosis).abs() < 1e-12);
    }
}
