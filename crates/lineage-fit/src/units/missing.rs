use std::collections::BTreeSet;

use polars::prelude::{DataFrame, DataType};

use lineage_model::{ColumnName, LeafAdapter, SubMap};

use super::column;
use crate::config::NumericConfig;
use crate::error::Result;

/// Adds a `<column><suffix>` indicator next to numeric columns with gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingIndicator {
    inputs: Vec<ColumnName>,
    flagged: Vec<ColumnName>,
    suffix: String,
}

impl MissingIndicator {
    /// With `missing_only` only columns holding nulls (or NaN for floats)
    /// in `df` are flagged; otherwise every input is.
    pub fn fit(df: &DataFrame, columns: &[ColumnName], config: &NumericConfig) -> Result<Self> {
        let mut flagged = Vec::new();
        for name in columns {
            if !config.missing_only || has_missing(df, name)? {
                flagged.push(name.clone());
            }
        }
        Ok(Self {
            inputs: columns.to_vec(),
            flagged,
            suffix: config.indicator_suffix.clone(),
        })
    }

    /// Columns that received an indicator.
    pub fn flagged(&self) -> &[ColumnName] {
        &self.flagged
    }

    fn indicator(&self, name: &ColumnName) -> ColumnName {
        name.with_suffix(&self.suffix)
    }
}

fn has_missing(df: &DataFrame, name: &ColumnName) -> Result<bool> {
    let values = column(df, name)?;
    if values.null_count() > 0 {
        return Ok(true);
    }
    if !values.dtype().is_float() {
        return Ok(false);
    }
    let floats = values.cast(&DataType::Float64)?;
    Ok(floats.f64()?.iter().any(|value| value.is_some_and(f64::is_nan)))
}

impl LeafAdapter for MissingIndicator {
    fn inputs(&self) -> Vec<ColumnName> {
        self.inputs.clone()
    }

    fn outputs(&self) -> Vec<ColumnName> {
        self.inputs
            .iter()
            .cloned()
            .chain(self.flagged.iter().map(|name| self.indicator(name)))
            .collect()
    }

    fn explicit_sub_map(&self) -> Option<SubMap> {
        let flagged: BTreeSet<&ColumnName> = self.flagged.iter().collect();
        Some(
            self.inputs
                .iter()
                .map(|name| {
                    let mut produced = BTreeSet::from([name.clone()]);
                    if flagged.contains(name) {
                        produced.insert(self.indicator(name));
                    }
                    (name.clone(), produced)
                })
                .collect(),
        )
    }
}
