#![deny(unsafe_code)]

//! Fits the standard preprocessing template to a table.
//!
//! Only the metadata that determines column names is learned; the result is
//! a [`Node`](lineage_model::Node) tree ready for lineage tracing.

pub mod config;
pub mod error;
pub mod ingest;
pub mod selector;
pub mod template;
pub mod units;

pub use config::{BinningConfig, CategoricalConfig, NumericConfig, PipelineConfig, TextConfig};
pub use error::{FitError, Result};
pub use ingest::{frame_columns, read_csv};
pub use selector::{ColumnSelector, DtypeClass};
pub use template::{fit_standard_pipeline, trace_standard_pipeline};
