use std::collections::{BTreeMap, BTreeSet};

use lineage_model::{ColumnName, LeafAdapter};

use crate::config::BinningConfig;

/// Groups infrequent categorical levels into a single replacement level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBinner {
    columns: Vec<ColumnName>,
    retained: BTreeMap<ColumnName, BTreeSet<String>>,
    replacement: String,
}

impl CategoryBinner {
    /// Learns the retained levels of each column from its imputed values.
    pub fn fit(values: &[(ColumnName, Vec<String>)], binning: &BinningConfig) -> Self {
        let retained = values
            .iter()
            .map(|(name, levels)| (name.clone(), retained_levels(levels, binning)))
            .collect();
        Self {
            columns: values.iter().map(|(name, _)| name.clone()).collect(),
            retained,
            replacement: binning.replacement().to_string(),
        }
    }

    pub fn retained(&self, name: &ColumnName) -> Option<&BTreeSet<String>> {
        self.retained.get(name)
    }

    /// Level a value of `name` becomes after binning.
    pub fn bin<'a>(&'a self, name: &ColumnName, value: &'a str) -> &'a str {
        match self.retained.get(name) {
            Some(levels) if !levels.contains(value) => &self.replacement,
            _ => value,
        }
    }
}

impl LeafAdapter for CategoryBinner {
    fn inputs(&self) -> Vec<ColumnName> {
        self.columns.clone()
    }

    fn outputs(&self) -> Vec<ColumnName> {
        self.columns.clone()
    }
}

struct LevelCount<'a> {
    level: &'a str,
    count: usize,
}

/// Distinct levels with their counts, in order of first appearance.
fn count_levels(values: &[String]) -> Vec<LevelCount<'_>> {
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    let mut counts: Vec<LevelCount<'_>> = Vec::new();
    for value in values {
        match index.get(value.as_str()) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(value.as_str(), counts.len());
                counts.push(LevelCount {
                    level: value,
                    count: 1,
                });
            }
        }
    }
    counts
}

fn retained_levels(values: &[String], binning: &BinningConfig) -> BTreeSet<String> {
    let mut counts = count_levels(values);
    let total = values.len() as f64;
    let share = |count: usize| count as f64 / total;

    let kept: Vec<&str> = match binning {
        BinningConfig::RareLabel {
            tol, n_categories, ..
        } => {
            if counts.len() > *n_categories {
                counts
                    .iter()
                    .filter(|entry| share(entry.count) >= *tol)
                    .map(|entry| entry.level)
                    .collect()
            } else {
                counts.iter().map(|entry| entry.level).collect()
            }
        }
        BinningConfig::MaxLevels { max_levels, .. } => {
            counts.sort_by(|left, right| right.count.cmp(&left.count));
            counts
                .iter()
                .take(*max_levels)
                .map(|entry| entry.level)
                .collect()
        }
        BinningConfig::PercentThreshold {
            percent_threshold, ..
        } => counts
            .iter()
            .filter(|entry| share(entry.count) >= *percent_threshold)
            .map(|entry| entry.level)
            .collect(),
        BinningConfig::CumulativePercent { cum_percent, .. } => {
            counts.sort_by(|left, right| {
                right
                    .count
                    .cmp(&left.count)
                    .then_with(|| left.level.cmp(right.level))
            });
            let mut before = 0usize;
            let mut kept = Vec::new();
            for entry in &counts {
                if share(before) <= *cum_percent {
                    kept.push(entry.level);
                }
                before += entry.count;
            }
            kept
        }
    };
    kept.into_iter().map(str::to_string).collect()
}
