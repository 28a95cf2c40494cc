//! Wide → long reshaping.
//!
//! One record per (row, date column), row-major, so records of a row stay
//! together and in header order. Each column's ISO label is re-parsed before
//! use; a column that fails drops its cell from every row and the count is
//! reported back.

use chrono::NaiveDate;
use tracing::warn;

use crate::config::ColumnConfig;
use crate::error::{TransformError, TransformResult};
use crate::models::{DateColumn, DecimalSeparator, LongRecord, RawRow, RawTable};
use crate::transform::cleaner::{normalise_text, parse_iso, parse_value};
use crate::transform::naming::serie_name;

#[derive(Debug, Clone, PartialEq)]
pub struct Reshaped {
    pub records: Vec<LongRecord>,
    /// (row, column) pairs discarded because the date failed re-validation.
    pub dropped: usize,
}

/// Resolved positions of the metadata columns.
struct MetadataIndex {
    tariff: usize,
    division: Option<usize>,
    segment: Option<usize>,
    concept: Option<usize>,
    units: Option<usize>,
    interval: Option<usize>,
}

impl MetadataIndex {
    fn resolve(table: &RawTable, columns: &ColumnConfig) -> TransformResult<Self> {
        let tariff = table
            .column_index(&columns.tariff)
            .ok_or_else(|| TransformError::MissingColumn(columns.tariff.clone()))?;

        Ok(Self {
            tariff,
            division: table.column_index(&columns.division),
            segment: table.column_index(&columns.segment),
            concept: table.column_index(&columns.concept),
            units: table.column_index(&columns.units),
            interval: table.column_index(&columns.interval),
        })
    }

    fn text(row: &RawRow, index: Option<usize>) -> Option<String> {
        normalise_text(index.and_then(|i| row.get(i)))
    }
}

/// `decimal` is the number format of every value cell in `table`.
pub fn reshape(
    table: &RawTable,
    date_columns: &[DateColumn],
    columns: &ColumnConfig,
    decimal: DecimalSeparator,
) -> TransformResult<Reshaped> {
    if table.rows.is_empty() {
        return Err(TransformError::EmptyInput);
    }
    let meta = MetadataIndex::resolve(table, columns)?;

    let dates: Vec<(&DateColumn, NaiveDate)> = date_columns
        .iter()
        .filter_map(|col| match parse_iso(&col.iso) {
            Some(d) => Some((col, d)),
            None => {
                warn!(
                    "Column {:?} maps to invalid date {:?}, dropping {} cells",
                    col.label,
                    col.iso,
                    table.rows.len()
                );
                None
            }
        })
        .collect();
    let dropped = (date_columns.len() - dates.len()) * table.rows.len();

    let mut records = Vec::with_capacity(table.rows.len() * dates.len());
    for row in &table.rows {
        let tariff = MetadataIndex::text(row, Some(meta.tariff)).unwrap_or_default();
        let division = MetadataIndex::text(row, meta.division).unwrap_or_default();
        let segment = MetadataIndex::text(row, meta.segment);
        let concept = MetadataIndex::text(row, meta.concept);
        let interval = MetadataIndex::text(row, meta.interval);
        let units = MetadataIndex::text(row, meta.units);
        let name = serie_name(
            segment.as_deref(),
            concept.as_deref(),
            interval.as_deref(),
            units.as_deref(),
        );

        for (col, date) in &dates {
            records.push(LongRecord {
                tariff: tariff.clone(),
                division: division.clone(),
                segment: segment.clone(),
                concept: concept.clone(),
                interval: interval.clone(),
                units: units.clone(),
                date: *date,
                value: row.get(col.index).and_then(|c| parse_value(c, decimal)),
                serie_name: name.clone(),
            });
        }
    }

    Ok(Reshaped { records, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;

    fn table() -> RawTable {
        RawTable::new(
            ["Tariff", "Division", "Concept", "Units", "01/01/2020", "01/02/2020"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                RawRow::new([Some("A"), Some("X"), Some("Energy"), Some("kWh"), Some("1"), Some("2")]),
                RawRow::new([Some("A"), None, None, None, None, Some("n/a")]),
            ],
        )
    }

    fn col(index: usize, label: &str, iso: &str) -> DateColumn {
        DateColumn {
            index,
            label: label.into(),
            iso: iso.into(),
        }
    }

    #[test]
    fn test_one_record_per_row_and_date() {
        let dates = vec![col(4, "01/01/2020", "2020-01-01"), col(5, "01/02/2020", "2020-02-01")];
        let out = reshape(&table(), &dates, &ColumnConfig::default(), DecimalSeparator::Point).unwrap();

        assert_eq!(out.dropped, 0);
        assert_eq!(out.records.len(), 4);

        let first = &out.records[0];
        assert_eq!(first.tariff, "A");
        assert_eq!(first.division, "X");
        assert_eq!(first.serie_name, "Energy - (kWh)");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(first.value, Some(1.0));

        let blank = &out.records[2];
        assert_eq!(blank.division, "");
        assert_eq!(blank.serie_name, "Unnamed");
        assert_eq!(blank.value, None);
        assert_eq!(out.records[3].value, None);
    }

    #[test]
    fn test_decimal_comma_values() {
        let t = RawTable::new(
            ["Tariff", "01/01/2020", "01/02/2020"].iter().map(|s| s.to_string()).collect(),
            vec![RawRow::new([Some("A"), Some("0,1234"), Some("1.234,5")])],
        );
        let dates = vec![col(1, "01/01/2020", "2020-01-01"), col(2, "01/02/2020", "2020-02-01")];

        let comma = reshape(&t, &dates, &ColumnConfig::default(), DecimalSeparator::Comma).unwrap();
        let values: Vec<Option<f64>> = comma.records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(0.1234), Some(1234.5)]);

        let point = reshape(&t, &dates, &ColumnConfig::default(), DecimalSeparator::Point).unwrap();
        assert_eq!(point.records[0].value, Some(1234.0));
    }

    #[test]
    fn test_invalid_iso_is_dropped_and_counted() {
        let dates = vec![col(4, "01/01/2020", "2020-01-01"), col(5, "bogus", "2020-02-30")];
        let out = reshape(&table(), &dates, &ColumnConfig::default(), DecimalSeparator::Point).unwrap();

        assert_eq!(out.dropped, 2);
        assert_eq!(out.records.len(), 2 * 2 - 2);
        assert!(out.records.iter().all(|r| r.date.to_string() == "2020-01-01"));
    }

    #[test]
    fn test_missing_tariff_column() {
        let mut t = table();
        t.headers[0] = "Rate".into();
        let dates = [col(4, "01/01/2020", "2020-01-01")];
        let err = reshape(&t, &dates, &ColumnConfig::default(), DecimalSeparator::Point).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn(ref c) if c == "Tariff"));
    }

    #[test]
    fn test_empty_rows() {
        let t = RawTable::new(vec!["Tariff".into(), "01/01/2020".into()], vec![]);
        let dates = [col(1, "01/01/2020", "2020-01-01")];
        let err = reshape(&t, &dates, &ColumnConfig::default(), DecimalSeparator::Point).unwrap_err();
        assert!(matches!(err, TransformError::EmptyInput));
    }
}
