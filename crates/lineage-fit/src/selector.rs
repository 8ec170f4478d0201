//! Column selection by dtype class and name pattern.

use polars::prelude::{DataFrame, DataType};
use regex::Regex;

use lineage_model::ColumnName;

use crate::error::{FitError, Result};

/// Broad dtype families the template routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeClass {
    Numeric,
    Text,
}

impl DtypeClass {
    pub fn admits(self, dtype: &DataType) -> bool {
        match self {
            Self::Numeric => dtype.is_primitive_numeric(),
            Self::Text => matches!(dtype, DataType::String),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
        }
    }
}

/// Picks columns of one dtype class, optionally narrowed by anchored
/// include / exclude patterns and an explicit list of excluded names.
#[derive(Debug, Clone)]
pub struct ColumnSelector {
    class: DtypeClass,
    include: Option<Regex>,
    exclude: Option<Regex>,
    skip: Vec<String>,
}

impl ColumnSelector {
    pub fn new(class: DtypeClass) -> Self {
        Self {
            class,
            include: None,
            exclude: None,
            skip: Vec::new(),
        }
    }

    pub fn include(mut self, pattern: Option<&str>) -> Result<Self> {
        self.include = pattern.map(anchored).transpose()?;
        Ok(self)
    }

    pub fn exclude(mut self, pattern: Option<&str>) -> Result<Self> {
        self.exclude = pattern.map(anchored).transpose()?;
        Ok(self)
    }

    /// Leaves out these exact names regardless of dtype.
    pub fn skip_names(mut self, names: &[String]) -> Self {
        self.skip.extend(names.iter().cloned());
        self
    }

    /// Matching columns, in table order.
    pub fn select(&self, df: &DataFrame) -> Result<Vec<ColumnName>> {
        let mut selected = Vec::new();
        for column in df.get_columns() {
            let name = column.name().as_str();
            if !self.class.admits(column.dtype()) || self.skip.iter().any(|skip| skip == name) {
                continue;
            }
            if self.include.as_ref().is_some_and(|re| !re.is_match(name)) {
                continue;
            }
            if self.exclude.as_ref().is_some_and(|re| re.is_match(name)) {
                continue;
            }
            selected.push(ColumnName::new(name)?);
        }
        Ok(selected)
    }
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| FitError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
