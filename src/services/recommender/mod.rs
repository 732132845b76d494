//! Hybrid scoring engine
//!
//! Ranks catalog games for a user by blending three signals:
//! 1. Content similarity between the user's activity profile and each game
//! 2. Friends' aggregated playtime on each game
//! 3. Content similarity between the friends' activity profile and each game
//!
//! Each signal is min-max normalized on its own before weighting. The engine is
//! synchronous and pure: everything request-specific (owned games, activity,
//! weights, k) is passed per call, and the only shared state is the read-only
//! `CatalogIndex`.
use std::collections::HashSet;

use crate::models::{ActivityEntry, AppId, Recommendation, SignalMeta};

pub mod catalog;
pub mod profile;
pub mod ranker;
pub mod scoring;
pub mod signals;
pub mod sparse;
pub mod vectorizer;

pub use catalog::{CatalogError, CatalogIndex};
pub use scoring::BlendWeights;

/// Everything one scoring call needs besides the catalog
#[derive(Debug, Clone, Copy)]
pub struct ScoringRequest<'a> {
    pub owned: &'a HashSet<AppId>,
    pub my_activity: &'a [ActivityEntry],
    pub friends_activity: &'a [ActivityEntry],
    pub weights: BlendWeights,
    /// Must already be at least 1
    pub k: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecommendations {
    pub results: Vec<Recommendation>,
    pub signals: SignalMeta,
}

pub struct Recommender {
    index: CatalogIndex,
}

impl Recommender {
    pub fn new(index: CatalogIndex) -> Self {
        Self { index }
    }

    /// Scores every non-owned catalog item and returns the top `k`
    pub fn recommend(&self, request: &ScoringRequest<'_>) -> ScoredRecommendations {
        let candidates: Vec<usize> = self
            .index
            .items()
            .iter()
            .enumerate()
            .filter(|(_, item)| !request.owned.contains(&item.id))
            .map(|(row, _)| row)
            .collect();

        let my_profile = profile::build_profile(&self.index, request.my_activity);
        let friends_profile = profile::build_profile(&self.index, request.friends_activity);

        let raw = signals::compute_signals(
            &self.index,
            &candidates,
            my_profile.as_ref(),
            friends_profile.as_ref(),
            request.friends_activity,
        );
        let scores = scoring::blend(&raw, request.weights);
        let results = ranker::top_k(&self.index, &candidates, &scores, request.k);

        let signals = SignalMeta {
            candidate_count: candidates.len(),
            has_my_profile: my_profile.is_some(),
            has_friends_profile: friends_profile.is_some(),
            friends_played_candidates: raw.friends_raw.iter().filter(|w| **w > 0.0).count(),
        };

        tracing::debug!(
            candidates = signals.candidate_count,
            has_my_profile = signals.has_my_profile,
            has_friends_profile = signals.has_friends_profile,
            returned = results.len(),
            "Scored candidates"
        );

        ScoredRecommendations { results, signals }
    }
}
