use serde::{Deserialize, Serialize};

use super::signals::RawSignals;

/// Min-max scaling onto [0, 1].
///
/// A degenerate range (all values equal, within `isclose` tolerance) yields zeros,
/// as does input containing an infinity or NaN.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let Some(first) = values.first() else {
        return Vec::new();
    };
    if values.iter().any(|v| !v.is_finite()) {
        return vec![0.0; values.len()];
    }

    let (min, max) = values
        .iter()
        .fold((*first, *first), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let range = max - min;
    if range.abs() <= 1e-8 + 1e-5 * min.abs() {
        return vec![0.0; values.len()];
    }

    if !range.is_finite() {
        // max - min overflowed; halve both sides so the ratio stays finite
        let half_range = max / 2.0 - min / 2.0;
        return values.iter().map(|v| (v / 2.0 - min / 2.0) / half_range).collect();
    }

    values.iter().map(|v| (v - min) / range).collect()
}

/// Blend weights for the three normalized signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    /// Weight of similarity to the user's own profile
    pub alpha: f64,
    /// Weight of friends' aggregated playtime
    pub beta: f64,
    /// Weight of similarity to the friends' profile
    pub gamma: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            gamma: 1.0,
        }
    }
}

impl BlendWeights {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Rescales the weights to sum to 1 when their total is positive
    pub fn rescaled(self) -> Self {
        let total = self.alpha + self.beta + self.gamma;
        if total > 0.0 {
            Self::new(self.alpha / total, self.beta / total, self.gamma / total)
        } else {
            self
        }
    }
}

/// Normalizes each signal independently and combines them with the weights as given.
/// Scores are not clamped.
pub fn blend(signals: &RawSignals, weights: BlendWeights) -> Vec<f64> {
    let user = normalize(&signals.self_similarity);
    let friends_play = normalize(&signals.friends_raw);
    let friends_sim = normalize(&signals.friends_similarity);

    user.iter()
        .zip(&friends_play)
        .zip(&friends_sim)
        .map(|((u, p), s)| weights.alpha * u + weights.beta * p + weights.gamma * s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_linear_range() {
        assert_eq!(normalize(&[1.0, 2.0, 3.0]), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        assert_eq!(normalize(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert_eq!(normalize(&[7.5]), vec![0.0]);
    }

    #[test]
    fn test_normalize_extreme_range_stays_finite() {
        let out = normalize(&[-f64::MAX, 0.0, f64::MAX]);
        assert_eq!(out, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_non_finite_input_is_zero() {
        assert_eq!(normalize(&[1.0, f64::INFINITY]), vec![0.0, 0.0]);
        assert_eq!(normalize(&[f64::NAN, 2.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_output_in_unit_interval() {
        let out = normalize(&[-3.0, 10.0, 0.25, 4.0, 10.0]);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 1.0);
    }

    #[test]
    fn test_rescaled_weights_sum_to_one() {
        let w = BlendWeights::new(3.0, 2.0, 1.0).rescaled();
        assert!((w.alpha + w.beta + w.gamma - 1.0).abs() < 1e-12);
        assert!((w.alpha - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rescaled_zero_weights_unchanged() {
        let w = BlendWeights::new(0.0, 0.0, 0.0);
        assert_eq!(w.rescaled(), w);
    }

    #[test]
    fn test_blend_uses_weights_as_given() {
        let signals = RawSignals {
            self_similarity: vec![0.0, 1.0],
            friends_raw: vec![4.0, 2.0],
            friends_similarity: vec![0.3, 0.3],
        };
        let scores = blend(&signals, BlendWeights::new(2.0, 3.0, 10.0));
        assert_eq!(scores, vec![3.0, 2.0]);
    }

    #[test]
    fn test_blend_can_exceed_one() {
        let signals = RawSignals {
            self_similarity: vec![0.0, 1.0],
            friends_raw: vec![0.0, 1.0],
            friends_similarity: vec![0.0, 1.0],
        };
        let scores = blend(&signals, BlendWeights::default());
        assert_eq!(scores, vec![0.0, 3.0]);
    }
}
