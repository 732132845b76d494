use std::collections::HashMap;

use super::catalog::CatalogIndex;
use super::profile::sanitize_weight;
use super::sparse::SparseVector;
use crate::models::{ActivityEntry, AppId};

/// Raw per-candidate signals, each aligned with the candidate rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSignals {
    pub self_similarity: Vec<f64>,
    pub friends_raw: Vec<f64>,
    pub friends_similarity: Vec<f64>,
}

/// Cosine of a profile against every candidate; zeros when the profile is absent
fn similarity(index: &CatalogIndex, candidates: &[usize], profile: Option<&SparseVector>) -> Vec<f64> {
    match profile {
        Some(profile) => candidates
            .iter()
            .map(|&row| profile.cosine(index.vector(row)))
            .collect(),
        None => vec![0.0; candidates.len()],
    }
}

/// Aggregated friends' weight per candidate, bypassing the vector space
fn friends_weight(
    index: &CatalogIndex,
    candidates: &[usize],
    friends_activity: &[ActivityEntry],
) -> Vec<f64> {
    let mut totals: HashMap<AppId, f64> = HashMap::new();
    for entry in friends_activity {
        let total = totals.entry(entry.appid).or_insert(0.0);
        *total = (*total + sanitize_weight(entry.weight)).min(f64::MAX);
    }

    candidates
        .iter()
        .map(|&row| totals.get(&index.item(row).id).copied().unwrap_or(0.0))
        .collect()
}

pub fn compute_signals(
    index: &CatalogIndex,
    candidates: &[usize],
    my_profile: Option<&SparseVector>,
    friends_profile: Option<&SparseVector>,
    friends_activity: &[ActivityEntry],
) -> RawSignals {
    RawSignals {
        self_similarity: similarity(index, candidates, my_profile),
        friends_raw: friends_weight(index, candidates, friends_activity),
        friends_similarity: similarity(index, candidates, friends_profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommender::catalog::tests::sample_index;
    use crate::services::recommender::profile::build_profile;

    #[test]
    fn test_absent_profiles_give_zero_signals() {
        let index = sample_index();
        let signals = compute_signals(&index, &[0, 1, 2], None, None, &[]);
        assert_eq!(signals.self_similarity, vec![0.0; 3]);
        assert_eq!(signals.friends_raw, vec![0.0; 3]);
        assert_eq!(signals.friends_similarity, vec![0.0; 3]);
    }

    #[test]
    fn test_self_similarity_follows_content() {
        let index = sample_index();
        let profile = build_profile(&index, &[ActivityEntry::new(1, 10.0)]);
        let signals = compute_signals(&index, &[1, 2], profile.as_ref(), None, &[]);
        assert!((signals.self_similarity[0] - 1.0).abs() < 1e-12);
        assert_eq!(signals.self_similarity[1], 0.0);
    }

    #[test]
    fn test_friends_raw_sums_weights_per_candidate() {
        let index = sample_index();
        let friends = [
            ActivityEntry::new(3, 2.0),
            ActivityEntry::new(3, 1.5),
            ActivityEntry::new(2, -1.0),
            ActivityEntry::new(77, 4.0),
        ];
        let signals = compute_signals(&index, &[1, 2], None, None, &friends);
        assert_eq!(signals.friends_raw, vec![0.0, 3.5]);
    }

    #[test]
    fn test_friends_raw_saturates_instead_of_overflowing() {
        let index = sample_index();
        let friends = [ActivityEntry::new(1, f64::MAX), ActivityEntry::new(1, f64::MAX)];
        let signals = compute_signals(&index, &[0, 1], None, None, &friends);
        assert_eq!(signals.friends_raw, vec![f64::MAX, 0.0]);
    }

    #[test]
    fn test_signals_align_with_candidate_order() {
        let index = sample_index();
        let friends = [ActivityEntry::new(3, 1.0)];
        let profile = build_profile(&index, &friends);
        let signals = compute_signals(&index, &[2, 0], None, profile.as_ref(), &friends);
        assert_eq!(signals.friends_raw, vec![1.0, 0.0]);
        assert!((signals.friends_similarity[0] - 1.0).abs() < 1e-12);
        assert_eq!(signals.friends_similarity[1], 0.0);
    }
}
