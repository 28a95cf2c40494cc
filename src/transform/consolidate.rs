//! Tariff → division → series structure handed to the presentation layer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use rayon::prelude::*;

use crate::models::{ConsolidatedStructure, LongRecord, RunMetadata, SeriesView, TariffView};

pub fn build_structure(
    records: &[LongRecord],
    generated_at: NaiveDateTime,
    parallel: bool,
) -> ConsolidatedStructure {
    let mut by_tariff: BTreeMap<&str, Vec<&LongRecord>> = BTreeMap::new();
    for r in records {
        by_tariff.entry(r.tariff.as_str()).or_default().push(r);
    }

    let by_tariff: Vec<_> = by_tariff.into_iter().collect();
    let build = |(tariff, records): (&str, Vec<&LongRecord>)| (tariff.to_string(), tariff_view(&records));
    let tariffs: BTreeMap<String, TariffView> = if parallel {
        by_tariff.into_par_iter().map(build).collect::<Vec<_>>().into_iter().collect()
    } else {
        by_tariff.into_iter().map(build).collect()
    };

    let date_range = match (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) {
        (Some(min), Some(max)) => vec![min, max],
        _ => Vec::new(),
    };

    ConsolidatedStructure {
        metadata: RunMetadata {
            generated_at,
            tariff_count: tariffs.len(),
            record_count: records.len(),
            date_range,
        },
        tariffs,
    }
}

/// Series of one tariff, ordered by (division, name).
fn tariff_view(records: &[&LongRecord]) -> TariffView {
    let mut divisions = BTreeSet::new();
    let mut groups: BTreeMap<(&str, &str), Vec<&LongRecord>> = BTreeMap::new();
    for &r in records {
        divisions.insert(r.division.clone());
        groups
            .entry((r.division.as_str(), r.serie_name.as_str()))
            .or_default()
            .push(r);
    }

    let series = groups
        .into_iter()
        .map(|((division, name), mut points)| {
            points.sort_by_key(|r| r.date);
            let values: Vec<Option<f64>> = points.iter().map(|r| r.value).collect();
            SeriesView {
                name: name.to_string(),
                division: division.to_string(),
                segment: points[0].segment.clone(),
                concept: points[0].concept.clone(),
                dates: points.iter().map(|r| r.date).collect(),
                pct: pct_changes(&values),
                values,
            }
        })
        .collect();

    TariffView {
        divisions: divisions.into_iter().collect(),
        series,
    }
}

/// Period-over-period change in percent. `None` at index 0, next to a missing
/// value, after an exact zero, or when the change overflows.
pub fn pct_changes(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(cur)) if prev != 0.0 => {
            Some(100.0 * (cur - prev) / prev).filter(|p| p.is_finite())
        }
        _ => None,
    }));
    out
}

impl SeriesView {
    /// Points sharing the previous point's date.
    pub fn duplicate_dates(&self) -> usize {
        self.dates.windows(2).filter(|w| w[0] == w[1]).count()
    }
}
