use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Raw wide table ────────────────────────────────────────────────────────────

/// One input row: a cell per header, `None` where the cell is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub cells: Vec<Option<String>>,
}

impl RawRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(|c| c.map(Into::into)).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }
}

/// Decimal mark of the numeric cells. `Comma` reads "1.234,5" as 1234.5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalSeparator {
    #[default]
    Point,
    Comma,
}

/// The wide-format tariff table as handed over by the loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Number format the loader detected for the value cells.
    pub decimal_separator: DecimalSeparator,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            headers,
            rows,
            decimal_separator: DecimalSeparator::Point,
        }
    }

    pub fn with_decimal_separator(mut self, separator: DecimalSeparator) -> Self {
        self.decimal_separator = separator;
        self
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.headers.iter().position(|h| h.trim() == label)
    }
}

// ── Date columns ──────────────────────────────────────────────────────────────

/// A header recognised as a date, with its canonical `YYYY-MM-DD` label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateColumn {
    pub index: usize,
    pub label: String,
    pub iso: String,
}

// ── Long format ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub tariff: String,
    pub division: String,
    pub segment: Option<String>,
    pub concept: Option<String>,
    pub interval: Option<String>,
    pub units: Option<String>,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub serie_name: String,
}

impl LongRecord {
    pub fn key(&self) -> SeriesKey {
        SeriesKey {
            tariff: self.tariff.clone(),
            division: self.division.clone(),
            serie: self.serie_name.clone(),
        }
    }
}

/// Identity of one time series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub tariff: String,
    pub division: String,
    pub serie: String,
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub tariff: String,
    pub division: String,
    pub serie: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub first: f64,
    pub last: f64,
    pub change_abs: f64,
    pub change_pct: f64,
    pub avg_monthly_change: f64,
}

// ── Consolidated structure ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    #[serde(rename = "nombre")]
    pub name: String,
    pub division: String,
    #[serde(rename = "segmento")]
    pub segment: Option<String>,
    #[serde(rename = "concepto")]
    pub concept: Option<String>,
    #[serde(rename = "fechas")]
    pub dates: Vec<NaiveDate>,
    #[serde(rename = "valores")]
    pub values: Vec<Option<f64>>,
    pub pct: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TariffView {
    #[serde(rename = "divisiones")]
    pub divisions: Vec<String>,
    pub series: Vec<SeriesView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    #[serde(rename = "fecha_generacion", serialize_with = "serialize_timestamp")]
    pub generated_at: NaiveDateTime,
    #[serde(rename = "total_tarifas")]
    pub tariff_count: usize,
    #[serde(rename = "total_registros")]
    pub record_count: usize,
    /// `[min, max]`, or empty when no record carries a valid date.
    #[serde(rename = "rango_fechas")]
    pub date_range: Vec<NaiveDate>,
}

/// Tariffs are keyed in a `BTreeMap` so they serialize sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedStructure {
    #[serde(rename = "tarifas")]
    pub tariffs: BTreeMap<String, TariffView>,
    pub metadata: RunMetadata,
}

fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&ts.format("%Y-%m-%d %H:%M:%S"))
}
