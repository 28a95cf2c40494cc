//! Per-series summary statistics.
//!
//! Computed over the non-missing values of each series in ascending date
//! order. Every ratio with a zero denominator resolves to 0.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::models::{LongRecord, SeriesKey, SeriesStatistics};

/// Group records by series, sort each group by date (stable) and compute its
/// statistics. Series without a single value yield nothing.
pub fn compute_statistics(records: &[LongRecord], parallel: bool) -> Vec<SeriesStatistics> {
    let mut groups: BTreeMap<SeriesKey, Vec<(NaiveDate, Option<f64>)>> = BTreeMap::new();
    for r in records {
        groups.entry(r.key()).or_default().push((r.date, r.value));
    }

    let groups: Vec<_> = groups.into_iter().collect();
    let summarise = |(key, mut points): (SeriesKey, Vec<(NaiveDate, Option<f64>)>)| {
        points.sort_by_key(|(date, _)| *date);
        let values: Vec<f64> = points.into_iter().filter_map(|(_, v)| v).collect();
        series_statistics(key, &values)
    };

    if parallel {
        groups.into_par_iter().filter_map(summarise).collect()
    } else {
        groups.into_iter().filter_map(summarise).collect()
    }
}

/// Statistics over an already ordered, missing-free value sequence.
pub fn series_statistics(key: SeriesKey, values: &[f64]) -> Option<SeriesStatistics> {
    let (&first, &last) = (values.first()?, values.last()?);
    let count = values.len();
    let n = count as f64;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / n;

    let std = if count <= 1 {
        0.0
    } else {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    };

    let change_pct = if first == 0.0 {
        0.0
    } else {
        100.0 * (last / first - 1.0)
    };

    Some(SeriesStatistics {
        tariff: key.tariff,
        division: key.division,
        serie: key.serie,
        count,
        min,
        max,
        mean: finite_or_zero(mean),
        std: finite_or_zero(std),
        first,
        last,
        change_abs: finite_or_zero(last - first),
        change_pct: finite_or_zero(change_pct),
        avg_monthly_change: finite_or_zero(avg_step_change(values)),
    })
}

/// Mean of the step-over-step percentage changes. A step from zero counts as
/// a zero change; fewer than two steps give 0.
pub fn avg_step_change(values: &[f64]) -> f64 {
    let steps: Vec<f64> = values
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { finite_or_zero(100.0 * (w[1] - w[0]) / w[0]) })
        .collect();

    if steps.len() < 2 {
        return 0.0;
    }
    steps.iter().sum::<f64>() / steps.len() as f64
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SeriesKey {
        SeriesKey {
            tariff: "A".into(),
            division: "X".into(),
            serie: "Energy".into(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_basic_statistics() {
        let s = series_statistics(key(), &[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!(approx(s.mean, 7.0 / 3.0));
        assert!(approx(s.std, (7.0f64 / 3.0).sqrt()));
        assert_eq!(s.first, 1.0);
        assert_eq!(s.last, 4.0);
        assert_eq!(s.change_abs, 3.0);
        assert!(approx(s.change_pct, 300.0));
        assert!(approx(s.avg_monthly_change, 100.0));
    }

    #[test]
    fn test_single_value() {
        let s = series_statistics(key(), &[5.0]).unwrap();
        assert_eq!(s.std, 0.0);
        assert_eq!(s.change_abs, 0.0);
        assert_eq!(s.change_pct, 0.0);
        assert_eq!(s.avg_monthly_change, 0.0);

        let z = series_statistics(key(), &[0.0]).unwrap();
        assert_eq!(z.change_pct, 0.0);
    }

    #[test]
    fn test_empty_yields_nothing() {
        assert!(series_statistics(key(), &[]).is_none());
    }

    #[test]
    fn test_zero_denominators() {
        let s = series_statistics(key(), &[0.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.change_pct, 0.0);
        // steps: 0 (from zero), +50%
        assert!(approx(s.avg_monthly_change, 25.0));
        assert!(s.std.is_finite());
    }

    #[test]
    fn test_single_step_has_no_average() {
        assert_eq!(avg_step_change(&[1.0, 2.0]), 0.0);
        assert!(approx(avg_step_change(&[1.0, 2.0, 1.0]), 25.0));
    }

    #[test]
    fn test_overflowing_step_counts_as_zero() {
        assert_eq!(avg_step_change(&[1e-308, 1e10, 1e10]), 0.0);
        assert!(approx(avg_step_change(&[1e-308, 1e10, 2e10]), 50.0));
    }

    #[test]
    fn test_groups_sorted_and_missing_filtered() {
        let d = |m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap();
        let rec = |division: &str, m, value| LongRecord {
            tariff: "A".into(),
            division: division.into(),
            segment: None,
            concept: Some("Energy".into()),
            interval: None,
            units: None,
            date: d(m),
            value,
            serie_name: "Energy".into(),
        };
        let records = vec![
            rec("X", 3, Some(4.0)),
            rec("X", 1, Some(1.0)),
            rec("Y", 1, None),
            rec("X", 2, None),
            rec("Z", 1, None),
        ];

        for parallel in [false, true] {
            let stats = compute_statistics(&records, parallel);
            assert_eq!(stats.len(), 1);
            assert_eq!(stats[0].division, "X");
            assert_eq!(stats[0].count, 2);
            assert_eq!(stats[0].first, 1.0);
            assert_eq!(stats[0].last, 4.0);
        }
    }
}
