//! Masked reductions over dissimilarity vectors.
//!
//! Missing entries are tracked by an explicit validity mask (`true` =
//! observed) instead of being inferred from NaN inside each reduction. The
//! mask is built once at the boundary with [`validity_mask`]; a NaN that
//! appears later (e.g. from `0/0`) is a computed value, not a missing one.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Observed-entry mask for a stack of vectors whose missing entries are NaN.
pub fn validity_mask(values: ArrayView2<'_, f64>) -> Array2<bool> {
    values.mapv(|v| !v.is_nan())
}

/// Mean of the observed entries of one vector, `None` if nothing is observed.
pub fn masked_mean(values: ArrayView1<'_, f64>, mask: ArrayView1<'_, bool>) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .zip(mask.iter())
        .filter(|&(_, &m)| m)
        .fold((0.0, 0usize), |(s, c), (&v, _)| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Smallest observed entry of one vector.
pub fn masked_min(values: ArrayView1<'_, f64>, mask: ArrayView1<'_, bool>) -> Option<f64> {
    values
        .iter()
        .zip(mask.iter())
        .filter(|&(_, &m)| m)
        .map(|(&v, _)| v)
        .reduce(f64::min)
}

/// Per-row mean over observed entries; rows with nothing observed give NaN.
pub fn row_mean(values: ArrayView2<'_, f64>, mask: ArrayView2<'_, bool>) -> Array1<f64> {
    values
        .outer_iter()
        .zip(mask.outer_iter())
        .map(|(row, m)| masked_mean(row, m).unwrap_or(f64::NAN))
        .collect()
}

/// Per-row population standard deviation (ddof 0) over observed entries.
pub fn row_std(values: ArrayView2<'_, f64>, mask: ArrayView2<'_, bool>) -> Array1<f64> {
    values
        .outer_iter()
        .zip(mask.outer_iter())
        .map(|(row, m)| match masked_mean(row, m) {
            Some(mean) => {
                let centred = row.mapv(|v| (v - mean).powi(2));
                masked_mean(centred.view(), m).unwrap_or(f64::NAN).sqrt()
            }
            None => f64::NAN,
        })
        .collect()
}

/// Per-row root-mean-square over observed entries.
pub fn row_rms(values: ArrayView2<'_, f64>, mask: ArrayView2<'_, bool>) -> Array1<f64> {
    values
        .outer_iter()
        .zip(mask.outer_iter())
        .map(|(row, m)| {
            let squared = row.mapv(|v| v * v);
            masked_mean(squared.view(), m).unwrap_or(f64::NAN).sqrt()
        })
        .collect()
}

/// Column mean over observed entries.
///
/// Returns the means together with the column mask of the result: a column
/// is observed if at least one row observes it. Unobserved columns hold NaN.
pub fn column_mean(
    values: ArrayView2<'_, f64>,
    mask: ArrayView2<'_, bool>,
) -> (Array1<f64>, Array1<bool>) {
    let n_cols = values.len_of(Axis(1));
    let mut sums = Array1::<f64>::zeros(n_cols);
    let mut counts = Array1::<usize>::zeros(n_cols);

    for (row, m) in values.outer_iter().zip(mask.outer_iter()) {
        for j in 0..n_cols {
            if m[j] {
                sums[j] += row[j];
                counts[j] += 1;
            }
        }
    }

    let observed = counts.mapv(|c| c > 0);
    let means = sums
        .iter()
        .zip(counts.iter())
        .map(|(&s, &c)| if c == 0 { f64::NAN } else { s / c as f64 })
        .collect();
    (means, observed)
}

/// Fractional ranks starting at 1; tied values share the mean of their ranks.
pub fn rank_data(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) hold ranks start+1..=end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Rank the observed entries of one vector, leaving masked positions NaN.
pub fn masked_rank(values: ArrayView1<'_, f64>, mask: ArrayView1<'_, bool>) -> Array1<f64> {
    let observed: Vec<f64> = values
        .iter()
        .zip(mask.iter())
        .filter(|&(_, &m)| m)
        .map(|(&v, _)| v)
        .collect();
    let mut ranks = rank_data(&observed).into_iter();

    mask.iter()
        .map(|&m| {
            if m {
                ranks.next().unwrap_or(f64::NAN)
            } else {
                f64::NAN
            }
        })
        .collect()
}
