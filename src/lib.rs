//! Wide-format tariff tables → normalized, grouped time series.
//!
//! ```text
//! RawTable ──▶ columns ──▶ reshape ──▶ naming ──┬──▶ stats       (SeriesStatistics)
//!                                                └──▶ consolidate (ConsolidatedStructure)
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use error::{ErrorKind, TransformError, TransformResult};
pub use pipeline::{Pipeline, PipelineOutput, RunReport};
