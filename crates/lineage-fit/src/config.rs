//! Pipeline parameters loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! standard template:
//!
//! ```toml
//! [numeric]
//! add_missing_indicator = true
//! missing_only = true
//! indicator_suffix = "_na"
//! fill_value = 0.0
//!
//! [categorical]
//! fill_value = "_MISSING_"
//! binning = { strategy = "rare_label", tol = 0.05, n_categories = 10, replace_with = "Rare" }
//!
//! [text]
//! columns = []
//! lowercase = true
//! min_token_chars = 2
//!
//! [lineage]
//! prefix_mode = "regex"
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use lineage_core::LineageOptions;

use crate::error::{FitError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub numeric: NumericConfig,
    pub categorical: CategoricalConfig,
    pub text: TextConfig,
    pub lineage: LineageOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumericConfig {
    pub add_missing_indicator: bool,
    /// Only add indicators for columns that actually contain nulls.
    pub missing_only: bool,
    pub indicator_suffix: String,
    pub fill_value: f64,
    /// Anchored regex a numeric column must match to be routed.
    pub include: Option<String>,
    /// Anchored regex that removes numeric columns from the route.
    pub exclude: Option<String>,
}

impl Default for NumericConfig {
    fn default() -> Self {
        Self {
            add_missing_indicator: true,
            missing_only: true,
            indicator_suffix: "_na".to_string(),
            fill_value: 0.0,
            include: None,
            exclude: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoricalConfig {
    pub fill_value: String,
    pub binning: BinningConfig,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

impl Default for CategoricalConfig {
    fn default() -> Self {
        Self {
            fill_value: "_MISSING_".to_string(),
            binning: BinningConfig::default(),
            include: None,
            exclude: None,
        }
    }
}

/// How infrequent categorical levels are grouped before encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BinningConfig {
    /// Replace levels rarer than `tol` once a column has more than
    /// `n_categories` distinct levels.
    RareLabel {
        #[serde(default = "default_tol")]
        tol: f64,
        #[serde(default = "default_n_categories")]
        n_categories: usize,
        #[serde(default = "default_replace_with")]
        replace_with: String,
    },
    /// Keep the `max_levels` most frequent levels.
    MaxLevels {
        #[serde(default = "default_max_levels")]
        max_levels: usize,
        #[serde(default = "default_other_value")]
        other_value: String,
    },
    /// Keep levels whose frequency is at least `percent_threshold`.
    PercentThreshold {
        #[serde(default = "default_percent_threshold")]
        percent_threshold: f64,
        #[serde(default = "default_other_value")]
        other_value: String,
    },
    /// Keep the most frequent levels until they cover `cum_percent` of rows.
    CumulativePercent {
        #[serde(default = "default_cum_percent")]
        cum_percent: f64,
        #[serde(default = "default_other_value")]
        other_value: String,
    },
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self::RareLabel {
            tol: default_tol(),
            n_categories: default_n_categories(),
            replace_with: default_replace_with(),
        }
    }
}

impl BinningConfig {
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::RareLabel { .. } => "rare_label",
            Self::MaxLevels { .. } => "max_levels",
            Self::PercentThreshold { .. } => "percent_threshold",
            Self::CumulativePercent { .. } => "cumulative_percent",
        }
    }

    /// Level that grouped values are replaced with.
    pub fn replacement(&self) -> &str {
        match self {
            Self::RareLabel { replace_with, .. } => replace_with,
            Self::MaxLevels { other_value, .. }
            | Self::PercentThreshold { other_value, .. }
            | Self::CumulativePercent { other_value, .. } => other_value,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.replacement().is_empty() {
            return Err(FitError::invalid_config(format!(
                "categorical.binning ({}) replacement level must be non-empty",
                self.strategy()
            )));
        }
        match self {
            Self::RareLabel {
                tol, n_categories, ..
            } => {
                ensure_fraction("categorical.binning.tol", *tol)?;
                if *n_categories == 0 {
                    return Err(FitError::invalid_config(
                        "categorical.binning.n_categories must be at least 1",
                    ));
                }
            }
            Self::MaxLevels { max_levels, .. } => {
                if *max_levels == 0 {
                    return Err(FitError::invalid_config(
                        "categorical.binning.max_levels must be at least 1",
                    ));
                }
            }
            Self::PercentThreshold {
                percent_threshold, ..
            } => ensure_fraction("categorical.binning.percent_threshold", *percent_threshold)?,
            Self::CumulativePercent { cum_percent, .. } => {
                ensure_fraction("categorical.binning.cum_percent", *cum_percent)?;
            }
        }
        Ok(())
    }
}

fn default_tol() -> f64 {
    0.05
}

fn default_n_categories() -> usize {
    10
}

fn default_replace_with() -> String {
    "Rare".to_string()
}

fn default_max_levels() -> usize {
    20
}

fn default_percent_threshold() -> f64 {
    0.02
}

fn default_cum_percent() -> f64 {
    0.95
}

fn default_other_value() -> String {
    "_OTHER_".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Free-text columns, each vectorized on its own route.
    pub columns: Vec<String>,
    pub lowercase: bool,
    pub min_token_chars: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            lowercase: true,
            min_token_chars: 2,
        }
    }
}

impl PipelineConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FitError::io(path, e))?;
        Self::parse(&contents, path)
    }

    /// Parses TOML text; `origin` is only used in error messages.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| FitError::Toml {
            path: origin.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.numeric.indicator_suffix.is_empty() {
            return Err(FitError::invalid_config(
                "numeric.indicator_suffix must be non-empty",
            ));
        }
        if !self.numeric.fill_value.is_finite() {
            return Err(FitError::invalid_config("numeric.fill_value must be finite"));
        }
        if self.categorical.fill_value.is_empty() {
            return Err(FitError::invalid_config(
                "categorical.fill_value must be non-empty",
            ));
        }
        self.categorical.binning.validate()?;
        if self.text.min_token_chars == 0 {
            return Err(FitError::invalid_config(
                "text.min_token_chars must be at least 1",
            ));
        }
        let mut seen = BTreeSet::new();
        for column in &self.text.columns {
            if column.is_empty() {
                return Err(FitError::invalid_config("text.columns entries must be non-empty"));
            }
            if !seen.insert(column.as_str()) {
                return Err(FitError::invalid_config(format!(
                    "text.columns lists {column} twice"
                )));
            }
        }
        Ok(())
    }
}

fn ensure_fraction(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FitError::invalid_config(format!(
            "{field} must be between 0 and 1, got {value}"
        )))
    }
}
