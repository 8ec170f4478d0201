//! Prefix patterns built from input column names.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lineage_model::ColumnName;

/// How an input name is tested against the start of an output name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixMode {
    /// The input name is used as a regular expression anchored at the start
    /// of the output name.
    #[default]
    Regex,
    /// The input name must be a literal prefix of the output name.
    Literal,
}

impl PrefixMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Literal => "literal",
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Literal,
}

/// A compiled prefix test for one input column.
#[derive(Debug, Clone)]
pub struct PrefixPattern {
    name: ColumnName,
    matcher: Matcher,
}

impl PrefixPattern {
    /// Compiles `name` for the given mode.
    ///
    /// In regex mode a name that is not a valid pattern (`price(usd`) is
    /// matched literally instead.
    pub fn compile(name: &ColumnName, mode: PrefixMode) -> Self {
        let matcher = match mode {
            PrefixMode::Literal => Matcher::Literal,
            PrefixMode::Regex => match Regex::new(&format!("^(?:{})", name.as_str())) {
                Ok(regex) => Matcher::Regex(regex),
                Err(error) => {
                    debug!(column = %name, %error, "column name is not a valid pattern, matching literally");
                    Matcher::Literal
                }
            },
        };
        Self {
            name: name.clone(),
            matcher,
        }
    }

    pub fn name(&self) -> &ColumnName {
        &self.name
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(candidate),
            Matcher::Literal => candidate.starts_with(self.name.as_str()),
        }
    }
}
