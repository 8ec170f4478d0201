use std::collections::{BTreeMap, BTreeSet};

use crate::{ColumnName, LineageError, Result};

/// Output to input attribution produced by [`LineageMap::invert`].
pub type ReverseLineage = BTreeMap<ColumnName, ColumnName>;

/// Root input column to the set of final output columns derived from it.
///
/// Every declared input of the traced node is a key, including inputs that
/// were dropped along the way (their set is empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LineageMap(BTreeMap<ColumnName, BTreeSet<ColumnName>>);

impl LineageMap {
    pub fn from_entries(entries: BTreeMap<ColumnName, BTreeSet<ColumnName>>) -> Self {
        Self(entries)
    }

    pub fn get(&self, input: &str) -> Option<&BTreeSet<ColumnName>> {
        self.0.get(input)
    }

    pub fn contains_input(&self, input: &str) -> bool {
        self.0.contains_key(input)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnName, &BTreeSet<ColumnName>)> {
        self.0.iter()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &ColumnName> {
        self.0.keys()
    }

    /// Union of every value set.
    pub fn outputs(&self) -> BTreeSet<&ColumnName> {
        self.0.values().flatten().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inputs whose set contains `output`, in key order.
    pub fn claimants(&self, output: &str) -> Vec<&ColumnName> {
        self.0
            .iter()
            .filter(|(_, produced)| produced.contains(output))
            .map(|(input, _)| input)
            .collect()
    }

    /// Builds the output to input map.
    ///
    /// Fails on the first output (in name order) that more than one input
    /// claims.
    pub fn invert(&self) -> Result<ReverseLineage> {
        let mut claims: BTreeMap<&ColumnName, Vec<&ColumnName>> = BTreeMap::new();
        for (input, produced) in &self.0 {
            for output in produced {
                claims.entry(output).or_default().push(input);
            }
        }
        let mut reverse = ReverseLineage::new();
        for (output, inputs) in claims {
            if let [input] = inputs.as_slice() {
                reverse.insert(output.clone(), (*input).clone());
            } else {
                return Err(LineageError::AmbiguousProvenance {
                    output: output.to_string(),
                    inputs: inputs.iter().map(|name| name.to_string()).collect(),
                });
            }
        }
        Ok(reverse)
    }

    pub fn into_inner(self) -> BTreeMap<ColumnName, BTreeSet<ColumnName>> {
        self.0
    }
}

impl<'a> IntoIterator for &'a LineageMap {
    type Item = (&'a ColumnName, &'a BTreeSet<ColumnName>);
    type IntoIter = std::collections::btree_map::Iter<'a, ColumnName, BTreeSet<ColumnName>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
