//! Corner (pairwise posterior) data.
//!
//! Diagonal: 1-D histogram per free parameter with its 16/50/84 quantiles.
//! Lower triangle: 2-D histogram for every pair `(row, col)` with `col < row`.

use crate::domain::{ParameterSet, PosteriorSample};
use crate::error::AppError;
use crate::math::{Histogram, Histogram2d, histogram, histogram2d, sigma_interval_mut};

pub const DEFAULT_CORNER_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct CornerPanel {
    pub label: String,
    /// 16th, 50th and 84th percentiles.
    pub quantiles: [f64; 3],
    pub histogram: Histogram,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairPanel {
    pub row: usize,
    pub col: usize,
    pub histogram: Histogram2d,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CornerData {
    pub diagonal: Vec<CornerPanel>,
    pub pairs: Vec<PairPanel>,
}

impl CornerData {
    pub fn labels(&self) -> Vec<&str> {
        self.diagonal.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn pair(&self, row: usize, col: usize) -> Option<&PairPanel> {
        self.pairs.iter().find(|p| p.row == row && p.col == col)
    }
}

pub fn corner_data(samples: &[PosteriorSample], set: &ParameterSet, bins: usize) -> Result<CornerData, AppError> {
    if samples.is_empty() {
        return Err(AppError::InsufficientSamples);
    }
    if bins == 0 {
        return Err(AppError::invalid_input("Corner histograms need at least one bin."));
    }
    let ndim = set.free_count();
    if let Some(bad) = samples.iter().find(|s| s.len() != ndim) {
        return Err(AppError::InvalidParameterCount {
            expected: ndim,
            actual: bad.len(),
        });
    }

    let columns: Vec<Vec<f64>> = (0..ndim)
        .map(|p| samples.iter().map(|s| s[p]).collect())
        .collect();

    let mut diagonal = Vec::with_capacity(ndim);
    for (spec, column) in set.free_specs().zip(&columns) {
        let histogram = histogram(column, bins).ok_or_else(|| {
            AppError::invalid_input(format!("No finite draws for parameter `{}`.", spec.name))
        })?;
        let mut work = column.clone();
        let quantiles = sigma_interval_mut(&mut work).ok_or(AppError::InsufficientSamples)?;
        diagonal.push(CornerPanel {
            label: spec.label().to_string(),
            quantiles,
            histogram,
        });
    }

    let mut pairs = Vec::with_capacity(ndim * ndim.saturating_sub(1) / 2);
    for row in 1..ndim {
        for col in 0..row {
            // x axis is the column parameter, y axis the row parameter
            if let Some(histogram) = histogram2d(&columns[col], &columns[row], bins) {
                pairs.push(PairPanel { row, col, histogram });
            }
        }
    }

    Ok(CornerData { diagonal, pairs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParameterSpec;

    fn set3() -> ParameterSet {
        ParameterSet::new(vec![
            ParameterSpec::free("x", "X"),
            ParameterSpec::free("y", "Y"),
            ParameterSpec::fixed("f", 0.0, "F"),
            ParameterSpec::free("z", "Z"),
        ])
        .unwrap()
    }

    fn draws(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                vec![t, 2.0 * t, (t * 0.3).sin()]
            })
            .collect()
    }

    #[test]
    fn diagonal_and_lower_triangle_are_filled() {
        let data = corner_data(&draws(101), &set3(), DEFAULT_CORNER_BINS).unwrap();
        assert_eq!(data.labels(), vec!["X", "Y", "Z"]);
        assert_eq!(data.pairs.len(), 3);
        assert!(data.pair(2, 0).is_some());
        assert!(data.pair(0, 2).is_none());

        let x = &data.diagonal[0];
        assert_eq!(x.quantiles, [16.0, 50.0, 84.0]);
        assert_eq!(x.histogram.counts.len(), 20);
        assert_eq!(x.histogram.counts.iter().sum::<usize>(), 101);

        let xy = data.pair(1, 0).unwrap();
        assert_eq!(xy.histogram.counts.iter().sum::<usize>(), 101);
    }

    #[test]
    fn draw_width_is_checked() {
        let bad = vec![vec![1.0, 2.0]];
        assert!(matches!(
            corner_data(&bad, &set3(), 20),
            Err(AppError::InvalidParameterCount { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            corner_data(&[], &set3(), 20),
            Err(AppError::InsufficientSamples)
        ));
    }
}
