//! Output writers for the presentation layer: the consolidated JSON, the
//! statistics table and a per-point CSV rebuilt from the series arrays.

use crate::config::OutputConfig;
use crate::models::{ConsolidatedStructure, SeriesStatistics};
use crate::pipeline::PipelineOutput;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// One CSV line per point of a series view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRow<'a> {
    pub tariff: &'a str,
    pub division: &'a str,
    pub serie: &'a str,
    pub segment: Option<&'a str>,
    pub concept: Option<&'a str>,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub pct: Option<f64>,
}

/// Flatten the structure back into per-point rows, in structure order.
pub fn point_rows(structure: &ConsolidatedStructure) -> Vec<PointRow<'_>> {
    structure
        .tariffs
        .iter()
        .flat_map(|(tariff, view)| {
            view.series.iter().flat_map(move |s| {
                s.dates
                    .iter()
                    .zip(&s.values)
                    .zip(&s.pct)
                    .map(move |((date, value), pct)| PointRow {
                        tariff,
                        division: &s.division,
                        serie: &s.name,
                        segment: s.segment.as_deref(),
                        concept: s.concept.as_deref(),
                        date: *date,
                        value: *value,
                        pct: *pct,
                    })
            })
        })
        .collect()
}

pub fn write_structure_json<W: Write>(
    writer: W,
    structure: &ConsolidatedStructure,
    pretty: bool,
) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, structure)?;
    } else {
        serde_json::to_writer(writer, structure)?;
    }
    Ok(())
}

pub fn write_statistics_csv<W: Write>(writer: W, statistics: &[SeriesStatistics]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for s in statistics {
        wtr.serialize(s)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_points_csv<W: Write>(writer: W, structure: &ConsolidatedStructure) -> Result<usize> {
    let rows = point_rows(structure);
    let mut wtr = csv::Writer::from_writer(writer);
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Could not create {:?}", path))?;
    Ok(BufWriter::new(file))
}

/// Write all three outputs into `dir`, returning the paths written.
pub fn write_all(output: &PipelineOutput, config: &OutputConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Could not create dir {:?}", dir))?;

    let json_path = dir.join(&config.json_file);
    write_structure_json(create(&json_path)?, &output.structure, config.pretty)
        .with_context(|| format!("Writing {:?}", json_path))?;

    let stats_path = dir.join(&config.stats_file);
    write_statistics_csv(create(&stats_path)?, &output.statistics)
        .with_context(|| format!("Writing {:?}", stats_path))?;

    let points_path = dir.join(&config.points_file);
    let points = write_points_csv(create(&points_path)?, &output.structure)
        .with_context(|| format!("Writing {:?}", points_path))?;

    info!(
        "Wrote {} series statistics and {} points to {:?}",
        output.statistics.len(),
        points,
        dir
    );
    Ok(vec![json_path, stats_path, points_path])
}
