//! The batch transform: classify → reshape → name → {statistics, structure}.

pub mod cleaner;
pub mod columns;
pub mod consolidate;
pub mod naming;
pub mod reshape;
pub mod stats;

pub use columns::{classify_columns, Classification, HeaderClass};
pub use consolidate::{build_structure, pct_changes};
pub use naming::serie_name;
pub use reshape::{reshape, Reshaped};
pub use stats::{compute_statistics, series_statistics};
