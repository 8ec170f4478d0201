use lineage_model::{ColumnName, LeafAdapter};
use polars::prelude::DataFrame;

use super::string_values;
use crate::error::Result;

/// Replaces numeric gaps with a constant. Names pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberImputer {
    columns: Vec<ColumnName>,
    fill_value: f64,
}

impl NumberImputer {
    pub fn fit(columns: &[ColumnName], fill_value: f64) -> Self {
        Self {
            columns: columns.to_vec(),
            fill_value,
        }
    }

    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }
}

impl LeafAdapter for NumberImputer {
    fn inputs(&self) -> Vec<ColumnName> {
        self.columns.clone()
    }

    fn outputs(&self) -> Vec<ColumnName> {
        self.columns.clone()
    }
}

/// Replaces categorical gaps with a sentinel level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalImputer {
    columns: Vec<ColumnName>,
    fill_value: String,
}

impl CategoricalImputer {
    pub fn fit(columns: &[ColumnName], fill_value: &str) -> Self {
        Self {
            columns: columns.to_vec(),
            fill_value: fill_value.to_string(),
        }
    }

    /// Levels of `name` as the downstream units see them.
    pub fn imputed(&self, df: &DataFrame, name: &ColumnName) -> Result<Vec<String>> {
        Ok(string_values(df, name)?
            .into_iter()
            .map(|value| value.unwrap_or_else(|| self.fill_value.clone()))
            .collect())
    }
}

impl LeafAdapter for CategoricalImputer {
    fn inputs(&self) -> Vec<ColumnName> {
        self.columns.clone()
    }

    fn outputs(&self) -> Vec<ColumnName> {
        self.columns.clone()
    }
}
