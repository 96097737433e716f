//! Merging requested betas into a stored beta list.

/// Sorted, exactly deduplicated copy of `betas`.
pub fn sorted_betas(betas: &[f64]) -> Vec<f64> {
    let mut sorted = betas.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted
}

fn insert_sorted(list: &mut Vec<f64>, beta: f64) -> usize {
    let index = list.partition_point(|&b| b < beta);
    list.insert(index, beta);
    index
}

/// Merge `requested` into `old`.
///
/// A requested beta already in the list (exact match) is left alone. A new
/// beta is inserted together with a bridging point: the midpoint to its
/// right neighbour, or, when it lands rightmost, a point one left-gap further
/// out. The bridging point is skipped if already present.
pub fn merge_betas(old: &[f64], requested: &[f64]) -> Vec<f64> {
    let mut merged = sorted_betas(old);
    for &beta in requested {
        if merged.contains(&beta) {
            continue;
        }
        let index = insert_sorted(&mut merged, beta);
        let bridge = if index + 1 < merged.len() {
            Some(0.5 * (beta + merged[index + 1]))
        } else if index > 0 {
            Some(beta + (beta - merged[index - 1]))
        } else {
            None
        };
        if let Some(point) = bridge {
            if !merged.contains(&point) {
                insert_sorted(&mut merged, point);
            }
        }
    }
    merged
}
