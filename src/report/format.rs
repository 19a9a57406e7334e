//! Plain-text formatting of run results.
//!
//! Formatting lives here so the numerical modules stay free of presentation.

use crate::domain::{CredibleBand, ParameterSet};
use crate::report::{FitQuality, ParameterSummary};

/// Table of posterior medians with `+plus / -minus` errors.
pub fn format_parameter_table(summaries: &[ParameterSummary]) -> String {
    let width = summaries
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("parameter".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$}  {:>14}  {:>12}  {:>12}\n",
        "parameter", "median", "+err", "-err"
    ));
    for s in summaries {
        out.push_str(&format!(
            "{:<width$}  {:>14}  {:>12}  {:>12}\n",
            s.name,
            format_value(s.median),
            format_value(s.plus),
            format_value(s.minus)
        ));
    }
    out
}

/// One line per fixed parameter.
pub fn format_fixed_parameters(set: &ParameterSet) -> String {
    let mut out = String::new();
    for spec in set.specs().iter().filter(|s| !s.vary) {
        out.push_str(&format!("{} = {} (fixed)\n", spec.name, format_value(spec.fixed_value)));
    }
    out
}

pub fn format_fit_quality(q: &FitQuality) -> String {
    format!(
        "chi2 = {:.2} over {} bins, dof = {}, reduced chi2 = {:.2}",
        q.chi2, q.n_used, q.dof, q.chi2_nu
    )
}

/// Short description of a band: bin count, draw count, and width range.
pub fn format_band_summary(band: &CredibleBand, n_draws: usize) -> String {
    let widths = band.widths();
    if widths.is_empty() {
        return format!("Credible band: 0 bins from {n_draws} draws");
    }
    let min = widths.iter().copied().fold(f64::INFINITY, f64::min);
    let max = widths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    format!(
        "Credible band: {} bins from {} draws | 16-84% width in [{}, {}]",
        band.len(),
        n_draws,
        format_value(min),
        format_value(max)
    )
}

/// `label = (m +p -q) x 10^e`, with mantissa and errors sharing the exponent of the median.
pub fn format_scaled_summary(s: &ParameterSummary) -> String {
    let exponent = if s.median == 0.0 || !s.median.is_finite() {
        0
    } else {
        s.median.abs().log10().floor() as i32
    };
    let scale = 10f64.powi(exponent);
    format!(
        "{} = ({:.2} +{:.2} -{:.2}) x 10^{}",
        s.label,
        s.median / scale,
        s.plus / scale,
        s.minus / scale,
        exponent
    )
}

/// Fixed-point for moderate magnitudes, scientific otherwise.
fn format_value(v: f64) -> String {
    let a = v.abs();
    if v == 0.0 || (1e-3..1e5).contains(&a) {
        format!("{v:.4}")
    } else {
        format!("{v:.4e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_parameter() {
        let rows = vec![
            ParameterSummary {
                name: "vs_n".into(),
                label: "v_n".into(),
                median: 31.25,
                plus: 1.5,
                minus: 1.25,
            },
            ParameterSummary {
                name: "h1_col".into(),
                label: "log N(HI)".into(),
                median: 18.1,
                plus: 0.05,
                minus: 0.04,
            },
        ];
        let txt = format_parameter_table(&rows);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("parameter"));
        assert!(lines[1].starts_with("vs_n"));
        assert!(lines[1].contains("31.2500"));
        assert!(lines[2].contains("0.0400"));
    }

    #[test]
    fn small_values_switch_to_scientific() {
        assert_eq!(format_value(1.5e-5), "1.5000e-5");
        assert_eq!(format_value(12.0), "12.0000");
    }

    #[test]
    fn scaled_summary_shares_exponent() {
        let s = ParameterSummary {
            name: "lya_flux".into(),
            label: "Lya flux".into(),
            median: 4.287e-14,
            plus: 0.51e-14,
            minus: 0.3e-14,
        };
        assert_eq!(format_scaled_summary(&s), "Lya flux = (4.29 +0.51 -0.30) x 10^-14");
    }

    #[test]
    fn fixed_parameters_are_listed() {
        let txt = format_fixed_parameters(&ParameterSet::lya_default());
        assert_eq!(txt, "d2h = 1.5000e-5 (fixed)\n");
    }
}
