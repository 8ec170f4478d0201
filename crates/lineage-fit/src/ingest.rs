//! CSV ingestion.

use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, info_span};

use lineage_model::{ColumnName, column_names};

use crate::error::{FitError, Result};

/// Loads a CSV table, rejecting empty or repeated header names before
/// polars gets a chance to rename them.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let _span = info_span!("read_csv", path = %path.display()).entered();
    let headers = read_headers(path)?;
    column_names(headers, &format!("CSV header of {}", path.display()))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(rows = df.height(), columns = df.width(), "loaded table");
    Ok(df)
}

fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| csv_error(path, source))?;
    let headers = reader.headers().map_err(|source| csv_error(path, source))?;
    Ok(headers
        .iter()
        .map(|raw| raw.trim_matches('\u{feff}').to_string())
        .collect())
}

fn csv_error(path: &Path, source: csv::Error) -> FitError {
    FitError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Column names of `df` as validated names.
pub fn frame_columns(df: &DataFrame) -> Result<Vec<ColumnName>> {
    let names = df.get_column_names().into_iter().map(|name| name.to_string());
    Ok(column_names(names, "table columns")?)
}
