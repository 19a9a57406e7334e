//! Walker trace panels.
//!
//! One panel per free parameter, one series per walker. Long chains can be
//! reduced to a fixed number of evenly spaced steps so a renderer does not
//! have to draw every position.

use serde::Serialize;

use crate::data::Chain;
use crate::domain::ParameterSet;
use crate::error::AppError;
use crate::math::linspace;

/// Steps kept when a coarse subset is requested.
pub const TRACE_SUBSET_STEPS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracePanel {
    pub label: String,
    /// `series[walker][i]` is the value at `step_indices[i]`.
    pub series: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkerTraces {
    pub step_indices: Vec<usize>,
    pub x_label: String,
    pub panels: Vec<TracePanel>,
}

/// Build trace panels for every free parameter.
pub fn walker_traces(chain: &Chain, set: &ParameterSet, subset: bool) -> Result<WalkerTraces, AppError> {
    if chain.ndim() != set.free_count() {
        return Err(AppError::InvalidParameterCount {
            expected: set.free_count(),
            actual: chain.ndim(),
        });
    }

    let step_indices = if subset {
        subset_indices(chain.steps(), TRACE_SUBSET_STEPS)
    } else {
        (0..chain.steps()).collect()
    };
    let x_label = if subset {
        "Coarsely sampled step number"
    } else {
        "Step number"
    };

    let panels = set
        .free_specs()
        .enumerate()
        .map(|(param, spec)| TracePanel {
            label: spec.label().to_string(),
            series: (0..chain.walkers())
                .map(|w| step_indices.iter().map(|&s| chain.get(w, s, param)).collect())
                .collect(),
        })
        .collect();

    Ok(WalkerTraces {
        step_indices,
        x_label: x_label.to_string(),
        panels,
    })
}

/// `count` evenly spaced step indices over `0..steps`, truncated toward zero.
///
/// Chains shorter than `count` repeat indices, matching a truncating cast of
/// `linspace(0, steps - 1, count)`.
pub fn subset_indices(steps: usize, count: usize) -> Vec<usize> {
    if steps == 0 {
        return Vec::new();
    }
    linspace(0.0, (steps - 1) as f64, count)
        .into_iter()
        .map(|v| (v as usize).min(steps - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParameterSpec;

    fn two_free() -> ParameterSet {
        ParameterSet::new(vec![
            ParameterSpec::free("a", "alpha"),
            ParameterSpec::fixed("k", 1.0, "kappa"),
            ParameterSpec::free("b", ""),
        ])
        .unwrap()
    }

    fn chain(walkers: usize, steps: usize) -> Chain {
        let nested = (0..walkers)
            .map(|w| (0..steps).map(|s| vec![w as f64, s as f64]).collect())
            .collect();
        Chain::from_nested(nested).unwrap()
    }

    #[test]
    fn full_traces_follow_free_parameters() {
        let traces = walker_traces(&chain(3, 5), &two_free(), false).unwrap();
        assert_eq!(traces.x_label, "Step number");
        assert_eq!(traces.step_indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(traces.panels.len(), 2);
        assert_eq!(traces.panels[0].label, "alpha");
        assert_eq!(traces.panels[1].label, "b");
        assert_eq!(traces.panels[0].series[2], vec![2.0; 5]);
        assert_eq!(traces.panels[1].series[0], vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn subset_keeps_endpoints_and_count() {
        let idx = subset_indices(5000, TRACE_SUBSET_STEPS);
        assert_eq!(idx.len(), 1000);
        assert_eq!(idx[0], 0);
        assert_eq!(idx[999], 4999);
        assert!(idx.windows(2).all(|w| w[0] <= w[1]));

        let traces = walker_traces(&chain(2, 3000), &two_free(), true).unwrap();
        assert_eq!(traces.x_label, "Coarsely sampled step number");
        assert_eq!(traces.panels[1].series[0].len(), 1000);
    }

    #[test]
    fn chain_width_must_match_free_count() {
        let set = ParameterSet::new(vec![ParameterSpec::free("only", "")]).unwrap();
        assert!(matches!(
            walker_traces(&chain(1, 2), &set, false),
            Err(AppError::InvalidParameterCount { expected: 1, actual: 2 })
        ));
    }
}
