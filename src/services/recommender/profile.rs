use std::collections::BTreeMap;

use super::catalog::CatalogIndex;
use super::sparse::SparseVector;
use crate::models::ActivityEntry;

/// Negative or non-finite weights count as zero
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Builds the weighted sum of item vectors for the entries found in the catalog.
///
/// Returns `None` when no entry resolves to a catalog row. Resolved rows are
/// summed in (row, weight) order so that any permutation of `entries` gives a
/// bit-identical profile. Term weights saturate at `f64::MAX`.
pub fn build_profile(index: &CatalogIndex, entries: &[ActivityEntry]) -> Option<SparseVector> {
    let mut resolved: Vec<(usize, f64)> = entries
        .iter()
        .filter_map(|entry| {
            index
                .lookup(entry.appid)
                .map(|row| (row, sanitize_weight(entry.weight)))
        })
        .collect();

    if resolved.is_empty() {
        return None;
    }

    resolved.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut profile: BTreeMap<u32, f64> = BTreeMap::new();
    for (row, weight) in resolved {
        if weight == 0.0 {
            continue;
        }
        for (term, value) in index.vector(row).iter() {
            let acc = profile.entry(term).or_insert(0.0);
            *acc = (*acc + weight * value).min(f64::MAX);
        }
    }

    Some(SparseVector::from_map(profile))
}
