//! CSV loader for wide-format tariff tables.

use crate::models::{DecimalSeparator, RawRow, RawTable};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Pick the separator occurring most often in the header line.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = b',';
    let mut best_count = 0;
    for sep in [b';', b',', b'\t', b'|'] {
        let count = first_line.bytes().filter(|b| *b == sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

/// Number format implied by the delimiter: `;` files come from decimal-comma
/// locales.
pub fn decimal_separator_for(delimiter: u8) -> DecimalSeparator {
    match delimiter {
        b';' => DecimalSeparator::Comma,
        _ => DecimalSeparator::Point,
    }
}

/// Parse a wide table: a header row, then one row per tariff line.
/// Short rows are padded with empty cells; blank cells become `None`.
pub fn parse_table(content: &str) -> Result<RawTable> {
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(content);
    let decimal = decimal_separator_for(delimiter);
    debug!("Using delimiter {:?}, decimal {:?}", delimiter as char, decimal);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {}: {}", i + 1, e);
                continue;
            }
        };

        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if record.len() > headers.len() {
            warn!("Row {}: {} cells for {} headers, extra cells ignored", i + 1, record.len(), headers.len());
        }

        let cells = (0..headers.len()).map(|idx| {
            record
                .get(idx)
                .map(str::trim)
                .filter(|c| !c.is_empty())
        });
        rows.push(RawRow::new(cells));
    }

    Ok(RawTable::new(headers, rows).with_decimal_separator(decimal))
}

pub fn load_table(path: &Path) -> Result<RawTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let table = parse_table(&content).with_context(|| format!("Failed to parse {:?}", path))?;

    info!(
        "{:?}: {} rows, {} columns",
        path.file_name().unwrap_or_default(),
        table.rows.len(),
        table.headers.len()
    );
    Ok(table)
}
