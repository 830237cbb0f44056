//! Linear contrasts between all pairs of N quantities.

use ndarray::Array2;

/// Number of unordered pairs among `n` items.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// All `(i, j)` with `i < j`, in row-major upper-triangle order.
///
/// This is the order used for RDM vectors and for the rows of
/// [`pairwise_contrast`].
pub fn pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
}

/// Contrast matrix mapping N quantities onto their C(N,2) pairwise differences.
///
/// Row `k` belongs to the k-th pair `(i, j)` of [`pairs`] and holds `+1` at
/// column `i` and `-1` at column `j`, so `C · x` yields `x_i - x_j`.
pub fn pairwise_contrast(n: usize) -> Array2<f64> {
    let mut c = Array2::<f64>::zeros((pair_count(n), n));
    for (k, (i, j)) in pairs(n).enumerate() {
        c[[k, i]] = 1.0;
        c[[k, j]] = -1.0;
    }
    c
}
