//! Leaf-level name resolution.
//!
//! A fitted unit only declares which columns it read and which it wrote.
//! [`NameMatcher`] recovers which input produced which output, trying the
//! tiers of [`MatchTier`] in order and using the first that applies.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use lineage_model::{ColumnName, Leaf, LineageError, LineageMap, Result};

use crate::prefix::{PrefixMode, PrefixPattern};

/// The rule that attributed a leaf's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    /// The unit reported its own sub-map.
    Explicit,
    /// The unit read a single column, which owns every output.
    SingleInput,
    /// No input name prefixes any output; every input owns every output.
    Broadcast,
    /// Outputs were attributed to the input name that prefixes them.
    PrefixMatch,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::SingleInput => "single_input",
            Self::Broadcast => "broadcast",
            Self::PrefixMatch => "prefix_match",
        }
    }
}

/// Result of resolving one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub tier: MatchTier,
    pub map: LineageMap,
}

/// Resolves leaf outputs back to leaf inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameMatcher {
    mode: PrefixMode,
}

type Entries = BTreeMap<ColumnName, BTreeSet<ColumnName>>;

impl NameMatcher {
    pub fn new(mode: PrefixMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PrefixMode {
        self.mode
    }

    /// Attributes every output of `leaf` to the inputs that produced it.
    ///
    /// `node` names the leaf in error messages.
    ///
    /// # Errors
    ///
    /// [`LineageError::UnaccountedOutput`] when an output cannot be
    /// attributed, [`LineageError::MalformedTree`] when an explicit map
    /// gives an output to more than one input, plus any shape error from
    /// [`Leaf::validate`].
    pub fn resolve(&self, leaf: &Leaf, node: &str) -> Result<MatchOutcome> {
        leaf.validate(node)?;
        let inputs = leaf.inputs();
        let outputs = leaf.outputs();

        let (tier, entries) = if let Some(explicit) = leaf.explicit_map() {
            let mut entries = seed(inputs);
            for (input, produced) in explicit {
                entries
                    .entry(input.clone())
                    .or_default()
                    .extend(produced.iter().cloned());
            }
            ensure_single_claim(&entries, node)?;
            ensure_covered(&entries, outputs, node)?;
            (MatchTier::Explicit, entries)
        } else if let [only] = inputs {
            let mut entries = Entries::new();
            entries.insert(only.clone(), outputs.iter().cloned().collect());
            (MatchTier::SingleInput, entries)
        } else {
            let patterns = descending_patterns(inputs, self.mode);
            let any_prefix = patterns
                .iter()
                .any(|pattern| outputs.iter().any(|output| pattern.matches(output.as_str())));
            if any_prefix {
                (
                    MatchTier::PrefixMatch,
                    prefix_match(inputs, outputs, &patterns, node)?,
                )
            } else {
                let all: BTreeSet<ColumnName> = outputs.iter().cloned().collect();
                let entries = inputs
                    .iter()
                    .map(|input| (input.clone(), all.clone()))
                    .collect();
                (MatchTier::Broadcast, entries)
            }
        };

        debug!(
            node,
            tier = tier.as_str(),
            input_count = inputs.len(),
            output_count = outputs.len(),
            "resolved leaf names"
        );
        Ok(MatchOutcome {
            tier,
            map: LineageMap::from_entries(entries),
        })
    }
}

fn seed(inputs: &[ColumnName]) -> Entries {
    inputs
        .iter()
        .map(|input| (input.clone(), BTreeSet::new()))
        .collect()
}

fn descending_patterns(inputs: &[ColumnName], mode: PrefixMode) -> Vec<PrefixPattern> {
    let mut sorted: Vec<&ColumnName> = inputs.iter().collect();
    sorted.sort_by(|left, right| right.cmp(left));
    sorted
        .into_iter()
        .map(|name| PrefixPattern::compile(name, mode))
        .collect()
}

/// Greedy attribution over descending-sorted names.
///
/// An output equal to an input name belongs to that input. Otherwise the
/// first input (in descending order) whose pattern matches the start of the
/// output wins, so `xx_suffix` goes to `xx` rather than `x`.
fn prefix_match(
    inputs: &[ColumnName],
    outputs: &[ColumnName],
    patterns: &[PrefixPattern],
    node: &str,
) -> Result<Entries> {
    let declared: BTreeSet<&ColumnName> = inputs.iter().collect();
    let mut sorted_outputs: Vec<&ColumnName> = outputs.iter().collect();
    sorted_outputs.sort_by(|left, right| right.cmp(left));

    let mut entries = seed(inputs);
    let mut missing = Vec::new();
    for output in sorted_outputs {
        let owner = if declared.contains(output) {
            Some(output)
        } else {
            patterns
                .iter()
                .find(|pattern| pattern.matches(output.as_str()))
                .map(PrefixPattern::name)
        };
        match owner {
            Some(input) => {
                entries
                    .entry(input.clone())
                    .or_default()
                    .insert(output.clone());
            }
            None => missing.push(output.to_string()),
        }
    }
    if !missing.is_empty() {
        missing.sort();
        return Err(LineageError::UnaccountedOutput {
            node: node.to_string(),
            missing,
        });
    }
    Ok(entries)
}

/// A self-reported map may not give one output to two inputs.
fn ensure_single_claim(entries: &Entries, node: &str) -> Result<()> {
    let mut claims: BTreeMap<&ColumnName, Vec<&str>> = BTreeMap::new();
    for (input, produced) in entries {
        for output in produced {
            claims.entry(output).or_default().push(input.as_str());
        }
    }
    match claims.into_iter().find(|(_, inputs)| inputs.len() > 1) {
        Some((output, inputs)) => Err(LineageError::MalformedTree {
            node: node.to_string(),
            reason: format!(
                "explicit map attributes {output} to {}",
                inputs.join(", ")
            ),
        }),
        None => Ok(()),
    }
}

fn ensure_covered(entries: &Entries, outputs: &[ColumnName], node: &str) -> Result<()> {
    let covered: BTreeSet<&ColumnName> = entries.values().flatten().collect();
    let missing: Vec<String> = outputs
        .iter()
        .filter(|output| !covered.contains(output))
        .map(ToString::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LineageError::UnaccountedOutput {
            node: node.to_string(),
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(inputs: &[&str], outputs: &[&str]) -> Result<MatchOutcome> {
        let leaf = Leaf::from_names(inputs.iter().copied(), outputs.iter().copied())?;
        NameMatcher::default().resolve(&leaf, "leaf")
    }

    fn owned(outcome: &MatchOutcome, input: &str) -> Vec<String> {
        outcome
            .map
            .get(input)
            .map(|set| set.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn exact_name_wins_over_longer_pattern() {
        // `a*` sorts before `a` descending and its pattern matches anything
        // starting with "a"; the pass-through `a` must still stay with `a`.
        let outcome = resolve(&["a", "a*"], &["a", "a*"]).unwrap();
        assert_eq!(outcome.tier, MatchTier::PrefixMatch);
        assert_eq!(owned(&outcome, "a"), vec!["a"]);
        assert_eq!(owned(&outcome, "a*"), vec!["a*"]);
    }

    #[test]
    fn unmatched_outputs_are_all_reported() {
        let err = resolve(&["a", "b"], &["a_1", "zz", "c"]).unwrap_err();
        assert_eq!(
            err,
            LineageError::UnaccountedOutput {
                node: "leaf".to_string(),
                missing: vec!["c".to_string(), "zz".to_string()],
            }
        );
    }
}
