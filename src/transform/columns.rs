//! Date column classification.
//!
//! Every header that is not a metadata column runs through an ordered parser
//! chain: day-first, then generic. When that finds nothing, a positional
//! fallback retries the columns from `fallback_start` onwards with the generic
//! parser and spreadsheet serial numbers. Headers that survive none of this are
//! excluded from the reshape altogether.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::ColumnConfig;
use crate::error::{TransformError, TransformResult};
use crate::models::DateColumn;
use crate::transform::cleaner::{parse_day_first, parse_generic, parse_serial, to_iso};

/// How a header was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderClass {
    Metadata,
    DayFirst(NaiveDate),
    Generic(NaiveDate),
    Unparsed,
}

impl HeaderClass {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Self::DayFirst(d) | Self::Generic(d) => Some(d),
            Self::Metadata | Self::Unparsed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Date columns in header order.
    pub date_columns: Vec<DateColumn>,
    /// Labels that are neither metadata nor dates.
    pub excluded: Vec<String>,
    pub used_fallback: bool,
}

impl Classification {
    /// Label → canonical ISO date.
    pub fn iso_map(&self) -> HashMap<&str, &str> {
        self.date_columns
            .iter()
            .map(|c| (c.label.as_str(), c.iso.as_str()))
            .collect()
    }
}

pub fn classify_header(label: &str, columns: &ColumnConfig) -> HeaderClass {
    if columns.is_metadata(label) {
        return HeaderClass::Metadata;
    }
    if let Some(d) = parse_day_first(label) {
        return HeaderClass::DayFirst(d);
    }
    match parse_generic(label) {
        Some(d) => HeaderClass::Generic(d),
        None => HeaderClass::Unparsed,
    }
}

pub fn classify_columns(
    headers: &[String],
    columns: &ColumnConfig,
    fallback_start: usize,
) -> TransformResult<Classification> {
    // Parsed once per distinct label.
    let mut cache: HashMap<&str, HeaderClass> = HashMap::new();
    let classes: Vec<HeaderClass> = headers
        .iter()
        .map(|h| *cache.entry(h.as_str()).or_insert_with(|| classify_header(h, columns)))
        .collect();

    let mut date_columns: Vec<DateColumn> = headers
        .iter()
        .zip(&classes)
        .enumerate()
        .filter_map(|(index, (label, class))| {
            class.date().map(|d| DateColumn {
                index,
                label: label.clone(),
                iso: to_iso(d),
            })
        })
        .collect();

    let mut used_fallback = false;
    if date_columns.is_empty() {
        warn!(
            "No date headers among {} columns, retrying from position {}",
            headers.len(),
            fallback_start + 1
        );
        used_fallback = true;
        date_columns = headers
            .iter()
            .enumerate()
            .skip(fallback_start)
            .filter(|(_, label)| !columns.is_metadata(label))
            .filter_map(|(index, label)| {
                parse_generic(label)
                    .or_else(|| parse_serial(label))
                    .map(|d| DateColumn {
                        index,
                        label: label.clone(),
                        iso: to_iso(d),
                    })
            })
            .collect();
    }

    if date_columns.is_empty() {
        return Err(TransformError::NoDateColumns {
            columns: headers.len(),
        });
    }

    let excluded: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(index, label)| {
            !columns.is_metadata(label) && !date_columns.iter().any(|c| c.index == *index)
        })
        .map(|(_, label)| label.clone())
        .collect();

    for label in &excluded {
        debug!("Excluding column {:?}: neither metadata nor a date", label);
    }

    Ok(Classification {
        date_columns,
        excluded,
        used_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_day_first_takes_precedence() {
        let cols = ColumnConfig::default();
        let h = headers(&["Tariff", "Division", "01/02/2020", "2020-03-01"]);
        let c = classify_columns(&h, &cols, 6).unwrap();

        assert!(!c.used_fallback);
        assert_eq!(c.date_columns.len(), 2);
        assert_eq!(c.date_columns[0].iso, "2020-02-01");
        assert_eq!(c.date_columns[0].index, 2);
        assert_eq!(c.date_columns[1].iso, "2020-03-01");
        assert_eq!(c.iso_map().get("01/02/2020"), Some(&"2020-02-01"));
    }

    #[test]
    fn test_invalid_header_is_excluded() {
        let cols = ColumnConfig::default();
        let h = headers(&["Tariff", "Division", "Segment", "2020-13-45", "01/01/2020"]);
        let c = classify_columns(&h, &cols, 6).unwrap();

        assert_eq!(c.excluded, vec!["2020-13-45".to_string()]);
        assert!(c.date_columns.iter().all(|d| d.label != "2020-13-45"));
        assert!(!cols.is_metadata("2020-13-45"));
    }

    #[test]
    fn test_metadata_labels_never_dates() {
        let mut cols = ColumnConfig::default();
        cols.units = "2020-01-01".into();
        let h = headers(&["Tariff", "2020-01-01", "02/01/2020"]);
        let c = classify_columns(&h, &cols, 6).unwrap();

        assert_eq!(c.date_columns.len(), 1);
        assert_eq!(c.date_columns[0].label, "02/01/2020");
        assert_eq!(classify_header("2020-01-01", &cols), HeaderClass::Metadata);
    }

    #[test]
    fn test_positional_fallback_recovers_serials() {
        let cols = ColumnConfig::default();
        let h = headers(&[
            "Tariff", "Division", "Segment", "Concept", "Units", "43831", "43862", "43891", "Notes",
        ]);
        let c = classify_columns(&h, &cols, 6).unwrap();

        assert!(c.used_fallback);
        let isos: Vec<&str> = c.date_columns.iter().map(|d| d.iso.as_str()).collect();
        assert_eq!(isos, vec!["2020-02-01", "2020-03-01"]);
        assert_eq!(c.excluded, vec!["43831".to_string(), "Notes".to_string()]);
    }

    #[test]
    fn test_no_dates_is_configuration_error() {
        let cols = ColumnConfig::default();
        let h = headers(&["Tariff", "Division", "Comment"]);
        let err = classify_columns(&h, &cols, 6).unwrap_err();
        assert!(matches!(err, TransformError::NoDateColumns { columns: 3 }));
    }
}
