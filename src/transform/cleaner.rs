use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::models::DecimalSeparator;

// ── Cells ─────────────────────────────────────────────────────────────────────

const MISSING_MARKERS: &[&str] = &["n/a", "na", "-", "—", "nan", "null", "none", "#n/a"];

/// Parse a numeric cell. Blank, placeholder and non-finite cells are missing.
/// Point: "1,234.56" → 1234.56 | Comma: "1.234,56" → 1234.56 | "N/A" → None
pub fn parse_value(s: &str, decimal: DecimalSeparator) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || MISSING_MARKERS.contains(&s.to_lowercase().as_str()) {
        return None;
    }

    let (thousands, mark) = match decimal {
        DecimalSeparator::Point => (',', '.'),
        DecimalSeparator::Comma => ('.', ','),
    };
    let cleaned: String = s
        .chars()
        .filter(|c| *c != thousands && !c.is_whitespace())
        .map(|c| if c == mark { '.' } else { c })
        .collect();

    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Trimmed text, or `None` when blank.
pub fn normalise_text(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Two-digit years first: `%Y` would otherwise read "20" as year 20.
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

const GENERIC_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Month-only labels resolve to the first day of the month.
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%m/%Y", "%b %Y", "%B %Y", "%b-%Y"];

/// Day-first parsing: "01/02/2020" → 2020-02-01.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Generic parsing: ISO dates and datetimes, month-first US dates, spelled-out
/// months and month-only labels.
pub fn parse_generic(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(d) = GENERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(d);
    }
    if let Some(dt) = GENERIC_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let padded = format!("01 {s}");
    MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&padded, &format!("%d {fmt}")).ok())
}

/// Spreadsheet serial day number (1900 date system): 43831 → 2020-01-01.
pub fn parse_serial(s: &str) -> Option<NaiveDate> {
    let n: f64 = s.trim().parse().ok()?;
    if !n.is_finite() || n.fract() != 0.0 || !(1.0..=2_958_465.0).contains(&n) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(n as u64))
}

/// Strict `YYYY-MM-DD`.
pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
