//! Sequential composition.

use std::collections::BTreeSet;

use tracing::{debug_span, trace};

use lineage_model::{ColumnName, LineageMap, Result, Sequential};

use crate::engine::{Entries, LineageEngine, ensure_accounted};
use crate::path::NodePath;

/// Chains stage maps transitively.
///
/// `current` starts as the identity over the chain's inputs. After each
/// stage every set is replaced by the stage outputs its members map to; a
/// member the stage does not know contributes nothing. The final sets keep
/// only the chain's declared outputs.
pub(crate) fn compose(
    engine: &LineageEngine,
    chain: &Sequential,
    path: &NodePath,
) -> Result<LineageMap> {
    let _span =
        debug_span!("lineage.sequential", node = %path, stages = chain.stages().len()).entered();
    let node = path.to_string();
    chain.validate(&node)?;

    let mut current: Entries = chain
        .inputs()
        .into_iter()
        .map(|input| (input.clone(), BTreeSet::from([input])))
        .collect();

    for stage in chain.stages() {
        let step = engine.trace(&stage.node, &path.child(&stage.name))?;
        for names in current.values_mut() {
            *names = names
                .iter()
                .filter_map(|name| step.get(name.as_str()))
                .flatten()
                .cloned()
                .collect();
        }
        trace!(node = %node, stage = %stage.name, "stage composed");
    }

    let declared = chain.outputs();
    let keep: BTreeSet<&ColumnName> = declared.iter().collect();
    for names in current.values_mut() {
        names.retain(|name| keep.contains(name));
    }

    // Unreachable while the chain invariant holds and stage maps are complete.
    ensure_accounted(&current, &declared, &node)?;
    Ok(LineageMap::from_entries(current))
}
