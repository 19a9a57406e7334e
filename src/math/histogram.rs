//! Fixed-bin histograms for corner data.
//!
//! Bin edges span the data range; the last bin is closed on the right so the
//! maximum lands in it. A constant series gets a unit-wide range centred on
//! its value.

use nalgebra::DMatrix;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2d {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// Rows index x bins, columns index y bins.
    pub counts: DMatrix<usize>,
}

/// Histogram of the finite entries of `values`. `None` when nothing is finite or `bins == 0`.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let (lo, hi) = finite_range(values)?;
    let edges = edges(lo, hi, bins)?;
    let mut counts = vec![0usize; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        counts[bin_index(v, &edges)] += 1;
    }
    Some(Histogram { edges, counts })
}

/// Joint histogram of paired values; pairs with a non-finite member are skipped.
pub fn histogram2d(x: &[f64], y: &[f64], bins: usize) -> Option<Histogram2d> {
    if x.len() != y.len() {
        return None;
    }
    let x_edges = edges_for(x, bins)?;
    let y_edges = edges_for(y, bins)?;
    let mut counts = DMatrix::<usize>::zeros(bins, bins);
    for (&a, &b) in x.iter().zip(y) {
        if a.is_finite() && b.is_finite() {
            counts[(bin_index(a, &x_edges), bin_index(b, &y_edges))] += 1;
        }
    }
    Some(Histogram2d {
        x_edges,
        y_edges,
        counts,
    })
}

fn edges_for(values: &[f64], bins: usize) -> Option<Vec<f64>> {
    let (lo, hi) = finite_range(values)?;
    edges(lo, hi, bins)
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

fn edges(lo: f64, hi: f64, bins: usize) -> Option<Vec<f64>> {
    if bins == 0 {
        return None;
    }
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    Some(super::linspace(lo, hi, bins + 1))
}

fn bin_index(v: f64, edges: &[f64]) -> usize {
    let bins = edges.len() - 1;
    let (lo, hi) = (edges[0], edges[bins]);
    let idx = ((v - lo) / (hi - lo) * bins as f64).floor();
    (idx.max(0.0) as usize).min(bins - 1)
}
