use super::catalog::CatalogIndex;
use crate::models::Recommendation;

/// Returns the top `k` candidates by score, descending.
///
/// The sort is stable, so equal scores keep catalog order. Fewer than `k`
/// candidates simply yields all of them.
pub fn top_k(
    index: &CatalogIndex,
    candidates: &[usize],
    scores: &[f64],
    k: usize,
) -> Vec<Recommendation> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    order
        .into_iter()
        .take(k)
        .map(|i| {
            let item = index.item(candidates[i]);
            Recommendation {
                appid: item.id,
                name: item.name.clone(),
                score: scores[i],
            }
        })
        .collect()
}
