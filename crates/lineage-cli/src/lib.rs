//! CLI library components for the column lineage tracer.

pub mod commands;
pub mod logging;
pub mod summary;
