use std::collections::BTreeSet;
use std::sync::LazyLock;

use polars::prelude::DataFrame;
use regex::Regex;

use lineage_model::{ColumnName, LeafAdapter};

use super::string_values;
use crate::config::TextConfig;
use crate::error::{FitError, Result};

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("Invalid word regex"));

/// Bag-of-words vectorizer over one free-text column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextVectorizer {
    column: ColumnName,
    vocabulary: BTreeSet<String>,
}

impl TextVectorizer {
    /// Builds the sorted vocabulary of `column`; null cells are skipped.
    pub fn fit(df: &DataFrame, column: &ColumnName, config: &TextConfig) -> Result<Self> {
        let mut vocabulary = BTreeSet::new();
        for text in string_values(df, column)?.into_iter().flatten() {
            vocabulary.extend(tokenize(&text, config));
        }
        if vocabulary.is_empty() {
            return Err(FitError::EmptyVocabulary {
                column: column.to_string(),
            });
        }
        Ok(Self {
            column: column.clone(),
            vocabulary,
        })
    }

    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }
}

fn tokenize(text: &str, config: &TextConfig) -> Vec<String> {
    let text = if config.lowercase {
        text.to_lowercase()
    } else {
        text.to_string()
    };
    WORD.find_iter(&text)
        .map(|token| token.as_str())
        .filter(|token| token.chars().count() >= config.min_token_chars)
        .map(str::to_string)
        .collect()
}

impl LeafAdapter for TextVectorizer {
    fn inputs(&self) -> Vec<ColumnName> {
        vec![self.column.clone()]
    }

    fn outputs(&self) -> Vec<ColumnName> {
        self.vocabulary
            .iter()
            .map(|token| self.column.with_suffix(&format!("_{token}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_word_runs_of_minimum_length() {
        let config = TextConfig::default();
        assert_eq!(
            tokenize("This is a test, isn't it?", &config),
            vec!["this", "is", "test", "isn", "it"]
        );
    }

    #[test]
    fn case_is_kept_when_lowercasing_is_off() {
        let config = TextConfig {
            lowercase: false,
            min_token_chars: 1,
            ..TextConfig::default()
        };
        assert_eq!(tokenize("Python é", &config), vec!["Python", "é"]);
    }
}
