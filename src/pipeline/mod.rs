//! Pipeline orchestrator: ties the transform stages together.
//!
//! ## Stages
//!
//! `run()`: one pass over an in-memory wide table:
//!   1. Classify headers into metadata / date / excluded columns
//!   2. Reshape to one record per (row, date column)
//!   3. Summarise each (tariff, division, series) into statistics
//!   4. Consolidate records into the tariff → division → series structure
//!
//! Fatal failures come back as a classified [`TransformError`]; everything
//! non-fatal (dropped cells, excluded headers, fallback use) lands in the
//! [`RunReport`].

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{TransformError, TransformResult};
use crate::models::{ConsolidatedStructure, DateColumn, RawTable, SeriesStatistics};
use crate::transform::{build_structure, classify_columns, compute_statistics, reshape, Classification};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Header classification only.
    pub fn classify(&self, table: &RawTable) -> TransformResult<Classification> {
        classify_columns(
            &table.headers,
            &self.config.columns,
            self.config.classifier.fallback_start,
        )
    }

    pub fn run(&self, table: &RawTable) -> TransformResult<PipelineOutput> {
        self.run_at(table, Utc::now().naive_utc())
    }

    /// Same as [`Pipeline::run`] with an explicit generation timestamp.
    pub fn run_at(
        &self,
        table: &RawTable,
        generated_at: NaiveDateTime,
    ) -> TransformResult<PipelineOutput> {
        if table.headers.is_empty() || table.rows.is_empty() {
            return Err(TransformError::EmptyInput);
        }
        let parallel = self.config.pipeline.parallel;

        // ── 1. Classify ───────────────────────────────────────────────────────
        let classification = self.classify(table)?;
        info!(
            "{} date columns, {} excluded{}",
            classification.date_columns.len(),
            classification.excluded.len(),
            if classification.used_fallback { " (positional fallback)" } else { "" }
        );
        if !classification.excluded.is_empty() {
            warn!("Excluded columns: {:?}", classification.excluded);
        }

        // ── 2. Reshape ────────────────────────────────────────────────────────
        let decimal = self
            .config
            .values
            .decimal_separator
            .unwrap_or(table.decimal_separator);
        debug!("Reading values with decimal {:?}", decimal);
        let reshaped = reshape(
            table,
            &classification.date_columns,
            &self.config.columns,
            decimal,
        )?;
        if reshaped.dropped > 0 {
            warn!("{} cells dropped: date failed re-validation", reshaped.dropped);
        }
        info!(
            "{} rows × {} date columns → {} long records",
            table.rows.len(),
            classification.date_columns.len(),
            reshaped.records.len()
        );

        // ── 3. Statistics ─────────────────────────────────────────────────────
        let statistics = compute_statistics(&reshaped.records, parallel);

        // ── 4. Consolidate ────────────────────────────────────────────────────
        let structure = build_structure(&reshaped.records, generated_at, parallel);

        let series: usize = structure.tariffs.values().map(|t| t.series.len()).sum();
        let duplicate_points: usize = structure
            .tariffs
            .values()
            .flat_map(|t| &t.series)
            .map(|s| s.duplicate_dates())
            .sum();
        if duplicate_points > 0 {
            warn!("{} points share a date with the previous point of their series", duplicate_points);
        }

        let report = RunReport {
            rows: table.rows.len(),
            date_columns: classification.date_columns,
            excluded_columns: classification.excluded,
            used_fallback: classification.used_fallback,
            records: reshaped.records.len(),
            dropped_records: reshaped.dropped,
            series,
            series_without_values: series.saturating_sub(statistics.len()),
            duplicate_points,
        };

        info!(
            "=== Done: {} tariffs | {} series | {} records | range {:?} ===",
            structure.metadata.tariff_count,
            report.series,
            report.records,
            structure.metadata.date_range,
        );

        Ok(PipelineOutput {
            structure,
            statistics,
            report,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub structure: ConsolidatedStructure,
    pub statistics: Vec<SeriesStatistics>,
    pub report: RunReport,
}

/// Non-fatal diagnostics of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub rows: usize,
    pub date_columns: Vec<DateColumn>,
    pub excluded_columns: Vec<String>,
    pub used_fallback: bool,
    pub records: usize,
    pub dropped_records: usize,
    pub series: usize,
    pub series_without_values: usize,
    pub duplicate_points: usize,
}
