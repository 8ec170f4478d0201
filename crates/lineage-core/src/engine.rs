//! Lineage engine entry points.
//!
//! [`LineageEngine::compute`] walks a fitted tree depth-first. Leaves are
//! resolved by the [`NameMatcher`], routers and sequential chains compose
//! their children's maps, and every composite re-checks that each of its
//! declared outputs is attributed to some input before returning.
//!
//! The engine holds no mutable state; one instance can serve any number of
//! threads as long as the tree is not being modified.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug_span, info};

use lineage_match::{NameMatcher, PrefixMode};
use lineage_model::{ColumnName, LineageError, LineageMap, Node, Result, ReverseLineage};

use crate::path::NodePath;
use crate::{router, sequential};

pub(crate) type Entries = BTreeMap<ColumnName, BTreeSet<ColumnName>>;

/// Tunables for a lineage computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageOptions {
    /// How leaf input names are matched against output names.
    pub prefix_mode: PrefixMode,
}

/// Computes lineage maps for fitted trees.
#[derive(Debug, Clone, Default)]
pub struct LineageEngine {
    matcher: NameMatcher,
}

impl LineageEngine {
    pub fn new(options: LineageOptions) -> Self {
        Self {
            matcher: NameMatcher::new(options.prefix_mode),
        }
    }

    /// Traces every input of `root` to the outputs derived from it.
    ///
    /// # Errors
    ///
    /// The first [`LineageError`] raised anywhere in the tree, unchanged.
    pub fn compute(&self, root: &Node) -> Result<LineageMap> {
        let map = self.trace(root, &NodePath::root())?;
        info!(
            kind = root.kind_name(),
            input_count = map.len(),
            output_count = map.outputs().len(),
            "lineage computed"
        );
        Ok(map)
    }

    pub(crate) fn trace(&self, node: &Node, path: &NodePath) -> Result<LineageMap> {
        match node {
            Node::Leaf(leaf) => {
                let _span = debug_span!("lineage.leaf", node = %path).entered();
                Ok(self.matcher.resolve(leaf, &path.to_string())?.map)
            }
            Node::Sequential(chain) => sequential::compose(self, chain, path),
            Node::Router(router) => router::compose(self, router, path),
        }
    }
}

/// Traces `root` with default options.
pub fn compute_lineage(root: &Node) -> Result<LineageMap> {
    LineageEngine::default().compute(root)
}

/// Output to input map of `map`.
///
/// # Errors
///
/// [`LineageError::AmbiguousProvenance`] when an output belongs to more than
/// one input.
pub fn invert(map: &LineageMap) -> Result<ReverseLineage> {
    map.invert()
}

/// Fails with [`LineageError::UnaccountedOutput`] unless every declared
/// output appears in some value set.
pub(crate) fn ensure_accounted(entries: &Entries, declared: &[ColumnName], node: &str) -> Result<()> {
    let accounted: BTreeSet<&ColumnName> = entries.values().flatten().collect();
    let missing: Vec<String> = declared
        .iter()
        .filter(|name| !accounted.contains(name))
        .map(ToString::to_string)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(LineageError::UnaccountedOutput {
        node: node.to_string(),
        missing,
    })
}
