//! Fitted preprocessing units.
//!
//! Each unit learns only the metadata that decides its output names
//! (flagged columns, retained levels, vocabularies) and exposes it through
//! [`LeafAdapter`](lineage_model::LeafAdapter). No transformed values are
//! produced.

mod binner;
mod encoder;
mod imputer;
mod missing;
mod text;

pub use binner::CategoryBinner;
pub use encoder::OneHotEncoder;
pub use imputer::{CategoricalImputer, NumberImputer};
pub use missing::MissingIndicator;
pub use text::TextVectorizer;

use polars::prelude::{Column, DataFrame, DataType};

use lineage_model::ColumnName;

use crate::error::{FitError, Result};

pub(crate) fn column<'a>(df: &'a DataFrame, name: &ColumnName) -> Result<&'a Column> {
    df.column(name.as_str())
        .map_err(|_| FitError::UnknownColumn {
            column: name.to_string(),
        })
}

/// Cell values of `name` rendered as strings; nulls stay `None`.
pub(crate) fn string_values(df: &DataFrame, name: &ColumnName) -> Result<Vec<Option<String>>> {
    let casted = column(df, name)?.cast(&DataType::String)?;
    let values = casted.str()?;
    Ok(values.iter().map(|value| value.map(str::to_string)).collect())
}
