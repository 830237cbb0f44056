//! Default group counts for cross-validation.
//!
//! Patterns are split so that every group keeps at least three conditions;
//! RDMs are split into more, smaller groups as soon as each group would
//! hold two or more. Both staircases stop at five groups.

/// Expected share of distinct items kept by one bootstrap draw, `1 - e⁻¹`.
pub const BOOTSTRAP_RETAINED_FRACTION: f64 = 1.0 - 1.0 / std::f64::consts::E;

/// Number of pattern groups for `n_pattern` conditions.
pub fn default_k_pattern(n_pattern: usize) -> usize {
    match n_pattern {
        0..12 => 2,
        12..24 => 3,
        24..40 => 4,
        _ => 5,
    }
}

/// Number of RDM groups for `n_rdm` subjects or runs.
pub fn default_k_rdm(n_rdm: usize) -> usize {
    match n_rdm {
        0..6 => 2,
        6..12 => 3,
        12..20 => 4,
        _ => 5,
    }
}

/// Expected number of distinct items retained when bootstrapping `n`, rounded down.
pub fn bootstrap_retained(n: usize) -> usize {
    (n as f64 * BOOTSTRAP_RETAINED_FRACTION).floor() as usize
}

/// [`default_k_pattern`] for bootstrapped cross-validation.
pub fn default_k_pattern_bootstrap(n_pattern: usize) -> usize {
    default_k_pattern(bootstrap_retained(n_pattern))
}

/// [`default_k_rdm`] for bootstrapped cross-validation.
pub fn default_k_rdm_bootstrap(n_rdm: usize) -> usize {
    default_k_rdm(bootstrap_retained(n_rdm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_staircase() {
        assert_eq!(default_k_pattern(5), 2);
        assert_eq!(default_k_pattern(11), 2);
        assert_eq!(default_k_pattern(12), 3);
        assert_eq!(default_k_pattern(15), 3);
        assert_eq!(default_k_pattern(30), 4);
        assert_eq!(default_k_pattern(39), 4);
        assert_eq!(default_k_pattern(40), 5);
        assert_eq!(default_k_pattern(100), 5);
    }

    #[test]
    fn test_rdm_staircase() {
        assert_eq!(default_k_rdm(3), 2);
        assert_eq!(default_k_rdm(5), 2);
        assert_eq!(default_k_rdm(6), 3);
        assert_eq!(default_k_rdm(10), 3);
        assert_eq!(default_k_rdm(15), 4);
        assert_eq!(default_k_rdm(20), 5);
        assert_eq!(default_k_rdm(25), 5);
    }

    #[test]
    fn test_monotone_and_bounded() {
        let mut prev = (0, 0);
        for n in 0..200 {
            let k = (default_k_pattern(n), default_k_rdm(n));
            assert!((2..=5).contains(&k.0));
            assert!((2..=5).contains(&k.1));
            assert!(k.0 >= prev.0 && k.1 >= prev.1, "not monotone at n={n}");
            prev = k;
        }
    }

    #[test]
    fn test_bootstrap_rescaling() {
        assert!((BOOTSTRAP_RETAINED_FRACTION - 0.632_120_558_8).abs() < 1e-9);
        assert_eq!(bootstrap_retained(0), 0);
        assert_eq!(bootstrap_retained(100), 63);
        // 20 RDMs retain 12 on average: 4 groups instead of 5
        assert_eq!(default_k_rdm(20), 5);
        assert_eq!(default_k_rdm_bootstrap(20), 4);
        // 40 patterns retain 25: 4 groups
        assert_eq!(default_k_pattern_bootstrap(40), 4);
        assert_eq!(default_k_pattern_bootstrap(5), 2);
    }
}
