use anyhow::Result;

use crate::models::DecimalSeparator;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub values: ValuesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Header names of the metadata columns. Anything else is a date candidate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnConfig {
    #[serde(default = "default_tariff")]
    pub tariff: String,

    #[serde(default = "default_division")]
    pub division: String,

    #[serde(default = "default_segment")]
    pub segment: String,

    #[serde(default = "default_concept")]
    pub concept: String,

    #[serde(default = "default_units")]
    pub units: String,

    #[serde(default = "default_interval")]
    pub interval: String,
}

/// Date column classification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// 0-based index of the first column the positional fallback may consider.
    #[serde(default = "default_fallback_start")]
    pub fallback_start: usize,
}

/// Value cells
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValuesConfig {
    /// Forces the number format. Unset, the loader's guess applies:
    /// `;`-delimited files use a decimal comma.
    #[serde(default)]
    pub decimal_separator: Option<DecimalSeparator>,
}

/// Output files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_json_file")]
    pub json_file: String,

    #[serde(default = "default_stats_file")]
    pub stats_file: String,

    #[serde(default = "default_points_file")]
    pub points_file: String,

    #[serde(default = "default_true")]
    pub pretty: bool,
}

/// Pipeline configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Partition the per-tariff aggregation across the rayon pool.
    #[serde(default)]
    pub parallel: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_tariff() -> String {
    "Tariff".to_string()
}
fn default_division() -> String {
    "Division".to_string()
}
fn default_segment() -> String {
    "Segment".to_string()
}
fn default_concept() -> String {
    "Concept".to_string()
}
fn default_units() -> String {
    "Units".to_string()
}
fn default_interval() -> String {
    "HourlyInterval".to_string()
}
fn default_fallback_start() -> usize {
    6
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_json_file() -> String {
    "tarifas.json".to_string()
}
fn default_stats_file() -> String {
    "estadisticas.csv".to_string()
}
fn default_points_file() -> String {
    "series.csv".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            tariff: default_tariff(),
            division: default_division(),
            segment: default_segment(),
            concept: default_concept(),
            units: default_units(),
            interval: default_interval(),
        }
    }
}

impl ColumnConfig {
    /// The metadata column set: labels never treated as dates.
    pub fn metadata_labels(&self) -> [&str; 6] {
        [
            self.tariff.as_str(),
            self.division.as_str(),
            self.segment.as_str(),
            self.concept.as_str(),
            self.units.as_str(),
            self.interval.as_str(),
        ]
    }

    pub fn is_metadata(&self, label: &str) -> bool {
        let label = label.trim();
        self.metadata_labels().iter().any(|m| m.trim() == label)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fallback_start: default_fallback_start(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
            json_file: default_json_file(),
            stats_file: default_stats_file(),
            points_file: default_points_file(),
            pretty: true,
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("TARIFF").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize()?;
        Ok(app_cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata_set() {
        let cols = ColumnConfig::default();
        assert!(cols.is_metadata("Tariff"));
        assert!(cols.is_metadata(" HourlyInterval "));
        assert!(!cols.is_metadata("01/01/2020"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "[columns]\ntariff = \"Tarifa\"\n[pipeline]\nparallel = true\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let app: AppConfig = cfg.try_deserialize().unwrap();
        assert_eq!(app.columns.tariff, "Tarifa");
        assert_eq!(app.columns.division, "Division");
        assert_eq!(app.classifier.fallback_start, 6);
        assert!(app.pipeline.parallel);
        assert!(app.output.pretty);
        assert_eq!(app.values.decimal_separator, None);
    }

    #[test]
    fn test_decimal_separator_override() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "[values]\ndecimal_separator = \"comma\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let app: AppConfig = cfg.try_deserialize().unwrap();
        assert_eq!(app.values.decimal_separator, Some(DecimalSeparator::Comma));
    }
}
