//! Parameter assembly.
//!
//! The sampler only sees free parameters; the profile model wants every
//! parameter positionally. Assembly walks the set in canonical order with a
//! cursor into the free values:
//!
//! - `vary = true`  -> next free value
//! - `vary = false` -> `fixed_value`
//!
//! Only arity is checked. Values are copied verbatim (no range checks).

use crate::domain::{FullParameterVector, ParameterSet};
use crate::error::AppError;

/// Rebuild the full parameter vector for one draw.
pub fn assemble(set: &ParameterSet, free_values: &[f64]) -> Result<FullParameterVector, AppError> {
    let expected = set.free_count();
    if free_values.len() != expected {
        return Err(AppError::InvalidParameterCount {
            expected,
            actual: free_values.len(),
        });
    }

    let mut cursor = free_values.iter();
    let values = set
        .specs()
        .iter()
        .map(|spec| {
            if spec.vary {
                // Arity checked above, so the cursor cannot run dry.
                cursor.next().copied().unwrap_or(f64::NAN)
            } else {
                spec.fixed_value
            }
        })
        .collect();

    Ok(FullParameterVector { values })
}

/// Free values of a full vector, in canonical order (inverse of [`assemble`]).
pub fn free_values(set: &ParameterSet, full: &FullParameterVector) -> Result<Vec<f64>, AppError> {
    if full.len() != set.len() {
        return Err(AppError::InvalidParameterCount {
            expected: set.len(),
            actual: full.len(),
        });
    }
    Ok(set
        .specs()
        .iter()
        .zip(full.as_slice())
        .filter(|(spec, _)| spec.vary)
        .map(|(_, &v)| v)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParameterSpec;

    fn mixed_set() -> ParameterSet {
        ParameterSet::new(vec![
            ParameterSpec::free("a", "A"),
            ParameterSpec::fixed("b", 7.0, "B"),
            ParameterSpec::free("c", "C"),
            ParameterSpec::free("d", "D"),
            ParameterSpec::fixed("e", -1.5, "E"),
        ])
        .unwrap()
    }

    #[test]
    fn interleaves_free_and_fixed_in_order() {
        let full = assemble(&mixed_set(), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(full.values, vec![1.0, 7.0, 2.0, 3.0, -1.5]);
    }

    #[test]
    fn rejects_short_and_long_samples() {
        let set = mixed_set();
        match assemble(&set, &[1.0, 2.0]) {
            Err(AppError::InvalidParameterCount { expected, actual }) => {
                assert_eq!((expected, actual), (3, 2));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            assemble(&set, &[1.0, 2.0, 3.0, 4.0]),
            Err(AppError::InvalidParameterCount { expected: 3, actual: 4 })
        ));
    }

    #[test]
    fn all_fixed_set_takes_empty_sample() {
        let set = ParameterSet::new(vec![
            ParameterSpec::fixed("x", 1.0, ""),
            ParameterSpec::fixed("y", 2.0, ""),
        ])
        .unwrap();
        assert_eq!(assemble(&set, &[]).unwrap().values, vec![1.0, 2.0]);
    }

    #[test]
    fn lya_scenario_keeps_d2h_slot() {
        let mut set = ParameterSet::lya_default();
        set.fix("fw_b", 400.0).unwrap();
        let sample: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let full = assemble(&set, &sample).unwrap();
        assert_eq!(full.len(), 10);
        assert_eq!(full.value_of(&set, "d2h"), Some(1.5e-5));
        assert_eq!(full.value_of(&set, "fw_b"), Some(400.0));
        assert_eq!(full.value_of(&set, "h1_vel"), Some(7.0));
    }

    #[test]
    fn free_values_inverts_assemble() {
        let set = mixed_set();
        let full = assemble(&set, &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(free_values(&set, &full).unwrap(), vec![4.0, 5.0, 6.0]);
    }
}
