//! Percentiles with linear interpolation between order statistics.
//!
//! For `n` sorted values and a percentile `p` in `[0, 100]`:
//!
//! ```text
//! rank = p / 100 * (n - 1)
//! value = x[floor(rank)] + (rank - floor(rank)) * (x[ceil(rank)] - x[floor(rank)])
//! ```
//!
//! This is NumPy's default (`method="linear"`). Nearest-rank or midpoint rules
//! give visibly different band widths at small draw counts, so every band and
//! summary in this crate goes through these functions.

/// Percentiles used for 1-sigma credible intervals.
pub const SIGMA_PERCENTILES: [f64; 3] = [16.0, 50.0, 84.0];

/// Percentile of already sorted (ascending) values.
///
/// Returns `None` for empty input or `p` outside `[0, 100]`.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (rank.ceil() as usize).min(sorted.len() - 1);
    let frac = rank - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    if frac == 0.0 || a == b {
        return Some(a);
    }
    Some(a + frac * (b - a))
}

/// Sort `values` in place and return the requested percentiles.
pub fn percentiles_mut(values: &mut [f64], ps: &[f64]) -> Option<Vec<f64>> {
    values.sort_by(f64::total_cmp);
    ps.iter().map(|&p| percentile_sorted(values, p)).collect()
}

/// The 16/50/84 triple of `values` (sorted in place).
pub fn sigma_interval_mut(values: &mut [f64]) -> Option<[f64; 3]> {
    let v = percentiles_mut(values, &SIGMA_PERCENTILES)?;
    Some([v[0], v[1], v[2]])
}

/// Median without reordering the caller's data.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut work = values.to_vec();
    work.sort_by(f64::total_cmp);
    percentile_sorted(&work, 50.0)
}
