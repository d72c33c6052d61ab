use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{AppError, AppResult, PerformanceRecord, RatioFormula};

static TAG_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^TAG_([\w_]+)_START-TAG_[\w_]+_END$").expect("static regex is valid")
});

/// Shortens `TAG_MUL_START-TAG_MUL_END` to `MUL`; other tags pass through.
pub fn short_tag(tag: &str) -> String {
    TAG_PAIR.replace(tag, "$1").into_owned()
}

/// A named set of per-tag medians.
#[derive(Debug, Clone)]
pub struct MedianSet<'a> {
    pub name: &'a str,
    pub records: &'a [PerformanceRecord],
}

impl<'a> MedianSet<'a> {
    pub fn new(name: &'a str, records: &'a [PerformanceRecord]) -> Self {
        Self { name, records }
    }

    fn index(&self) -> AppResult<HashMap<&'a str, f64>> {
        let mut index = HashMap::with_capacity(self.records.len());
        for record in self.records {
            if index.insert(record.tag.as_str(), record.median).is_some() {
                return Err(AppError::KeyAlignment {
                    measured: self.name.to_string(),
                    baseline: self.name.to_string(),
                    reason: format!("tag '{}' appears more than once", record.tag),
                });
            }
        }
        Ok(index)
    }
}

/// Ratio of each measured median against the baseline median of the same tag.
///
/// The result follows the measured table's order. Every measured tag must
/// exist in the baseline.
pub fn compute_ratios(
    measured: &MedianSet<'_>,
    baseline: &MedianSet<'_>,
    formula: RatioFormula,
) -> AppResult<Vec<(String, f64)>> {
    let baseline_index = baseline.index()?;
    // Duplicate measured tags are rejected as well
    measured.index()?;

    measured
        .records
        .iter()
        .map(|record| {
            let base = baseline_index.get(record.tag.as_str()).ok_or_else(|| {
                AppError::KeyAlignment {
                    measured: measured.name.to_string(),
                    baseline: baseline.name.to_string(),
                    reason: format!("tag '{}' has no baseline measurement", record.tag),
                }
            })?;
            if !base.is_finite() || *base <= 0.0 {
                return Err(AppError::schema(
                    baseline.name,
                    "MEDIAN",
                    format!("tag '{}' has non-positive baseline median {}", record.tag, base),
                ));
            }
            let ratio = formula.apply(record.median, *base);
            if !ratio.is_finite() {
                return Err(AppError::schema(
                    measured.name,
                    "MEDIAN",
                    format!("tag '{}' gives a non-finite ratio", record.tag),
                ));
            }
            Ok((record.tag.clone(), ratio))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[(&str, f64)]) -> Vec<PerformanceRecord> {
        rows.iter()
            .map(|(tag, median)| PerformanceRecord {
                tag: tag.to_string(),
                median: *median,
                max: None,
                min: None,
                count: None,
                avg: None,
            })
            .collect()
    }

    #[test]
    fn additive_ratio_for_difference_reporting_schemes() {
        let base = records(&[("MUL", 100.0)]);
        let an = records(&[("MUL", 20.0)]);
        let out = compute_ratios(
            &MedianSet::new("AN", &an),
            &MedianSet::new("NONE", &base),
            RatioFormula::Additive,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0].1 - 1.2).abs() < 1e-12);
    }

    #[test]
    fn direct_ratio_for_residue() {
        let base = records(&[("ADD", 50.0), ("MUL", 100.0)]);
        let res = records(&[("ADD", 75.0), ("MUL", 300.0)]);
        let out = compute_ratios(
            &MedianSet::new("RESIDUE", &res),
            &MedianSet::new("NONE", &base),
            RatioFormula::Direct,
        )
        .unwrap();
        assert_eq!(out, vec![("ADD".to_string(), 1.5), ("MUL".to_string(), 3.0)]);
    }

    #[test]
    fn ratios_are_keyed_not_positional() {
        let base = records(&[("ADD", 50.0), ("MUL", 100.0)]);
        let an = records(&[("MUL", 100.0), ("ADD", 50.0)]);
        let out = compute_ratios(
            &MedianSet::new("AN", &an),
            &MedianSet::new("NONE", &base),
            RatioFormula::Additive,
        )
        .unwrap();
        assert_eq!(out, vec![("MUL".to_string(), 2.0), ("ADD".to_string(), 2.0)]);
    }

    #[test]
    fn measured_tag_missing_from_baseline_fails() {
        let base = records(&[("ADD", 50.0)]);
        let an = records(&[("ADD", 50.0), ("DIV", 10.0)]);
        let err = compute_ratios(
            &MedianSet::new("AN", &an),
            &MedianSet::new("NONE", &base),
            RatioFormula::Additive,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::KeyAlignment { ref reason, .. } if reason.contains("DIV")));
    }

    #[test]
    fn duplicate_tag_fails() {
        let base = records(&[("ADD", 50.0), ("ADD", 60.0)]);
        let an = records(&[("ADD", 50.0)]);
        assert!(
            compute_ratios(
                &MedianSet::new("AN", &an),
                &MedianSet::new("NONE", &base),
                RatioFormula::Additive,
            )
            .is_err()
        );
    }

    #[test]
    fn zero_baseline_median_fails() {
        let base = records(&[("ADD", 50.0), ("MUL", 0.0)]);
        let an = records(&[("ADD", 50.0), ("MUL", 20.0)]);
        let err = compute_ratios(
            &MedianSet::new("AN", &an),
            &MedianSet::new("NONE", &base),
            RatioFormula::Additive,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::SchemaMismatch { ref source_name, ref reason, .. }
                if source_name == "NONE" && reason.contains("MUL")
        ));
    }

    #[test]
    fn non_finite_measurement_fails() {
        let base = records(&[("MUL", 100.0)]);
        let res = records(&[("MUL", f64::INFINITY)]);
        assert!(matches!(
            compute_ratios(
                &MedianSet::new("RESIDUE", &res),
                &MedianSet::new("NONE", &base),
                RatioFormula::Direct,
            ),
            Err(AppError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn short_tag_strips_markers() {
        assert_eq!(short_tag("TAG_MUL_START-TAG_MUL_END"), "MUL");
        assert_eq!(short_tag("TAG_ADD_U_START-TAG_ADD_U_END"), "ADD_U");
        assert_eq!(short_tag("MUL"), "MUL");
    }
}
