#![deny(unsafe_code)]

//! Column lineage engine.
//!
//! - **engine**: [`compute_lineage`], [`invert`] and the configurable [`LineageEngine`]
//! - **router** / **sequential**: composition rules for the two composite kinds
//! - **path**: [`NodePath`] used to locate failures
//! - **report**: flattened rows and summary counts for display

pub mod engine;
pub mod path;
pub mod report;
mod router;
mod sequential;

pub use engine::{LineageEngine, LineageOptions, compute_lineage, invert};
pub use path::NodePath;
pub use report::{LineageReport, LineageRow, LineageStats};
