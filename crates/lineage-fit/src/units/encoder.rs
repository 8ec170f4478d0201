use std::collections::BTreeSet;

use lineage_model::{ColumnName, LeafAdapter, SubMap};

/// One indicator column `<column>_<level>` per observed level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotEncoder {
    levels: Vec<(ColumnName, Vec<String>)>,
}

impl OneHotEncoder {
    /// Levels are kept in order of first appearance.
    pub fn fit<I, S>(columns: impl IntoIterator<Item = (ColumnName, I)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let levels = columns
            .into_iter()
            .map(|(name, values)| {
                let mut seen = BTreeSet::new();
                let mut ordered = Vec::new();
                for value in values {
                    let value = value.as_ref();
                    if seen.insert(value.to_string()) {
                        ordered.push(value.to_string());
                    }
                }
                (name, ordered)
            })
            .collect();
        Self { levels }
    }

    pub fn levels(&self, name: &ColumnName) -> Option<&[String]> {
        self.levels
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, levels)| levels.as_slice())
    }

    fn encoded(name: &ColumnName, levels: &[String]) -> impl Iterator<Item = ColumnName> {
        levels
            .iter()
            .map(move |level| name.with_suffix(&format!("_{level}")))
    }
}

impl LeafAdapter for OneHotEncoder {
    fn inputs(&self) -> Vec<ColumnName> {
        self.levels.iter().map(|(name, _)| name.clone()).collect()
    }

    fn outputs(&self) -> Vec<ColumnName> {
        self.levels
            .iter()
            .flat_map(|(name, levels)| Self::encoded(name, levels))
            .collect()
    }

    fn explicit_sub_map(&self) -> Option<SubMap> {
        Some(
            self.levels
                .iter()
                .map(|(name, levels)| (name.clone(), Self::encoded(name, levels).collect()))
                .collect(),
        )
    }
}
