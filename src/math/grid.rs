//! Evenly spaced grids and piecewise-linear interpolation.

/// `n` evenly spaced points from `start` to `end` (inclusive).
///
/// `n = 1` yields `[start]`; `n = 0` yields an empty vector.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be ascending. Outside `[xp[0], xp[last]]` the end values are
/// returned. Returns `None` for empty or mismatched inputs.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    if xp.is_empty() || xp.len() != fp.len() {
        return None;
    }
    let last = xp.len() - 1;
    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[last] {
        return Some(fp[last]);
    }
    // First index with xp[i] > x; x lies in [xp[i-1], xp[i]).
    let i = xp.partition_point(|&v| v <= x);
    let (x0, x1) = (xp[i - 1], xp[i]);
    let (y0, y1) = (fp[i - 1], fp[i]);
    if x1 == x0 {
        return Some(y0);
    }
    Some(y0 + (x - x0) / (x1 - x0) * (y1 - y0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(1215.0, 1216.0, 5);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 1215.0);
        assert_eq!(v[4], 1216.0);
        assert!((v[2] - 1215.5).abs() < 1e-12);
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn interp_matches_hand_values_and_clamps() {
        let xp = [0.0, 1.0, 3.0];
        let fp = [0.0, 10.0, 30.0];
        assert_eq!(interp(0.5, &xp, &fp), Some(5.0));
        assert_eq!(interp(2.0, &xp, &fp), Some(20.0));
        assert_eq!(interp(1.0, &xp, &fp), Some(10.0));
        assert_eq!(interp(-1.0, &xp, &fp), Some(0.0));
        assert_eq!(interp(9.0, &xp, &fp), Some(30.0));
        assert_eq!(interp(0.5, &xp, &fp[..2]), None);
    }
}
