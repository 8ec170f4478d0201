//! Router composition.

use std::collections::BTreeSet;

use tracing::{debug_span, trace};

use lineage_model::{ColumnName, LineageMap, Result, Router};

use crate::engine::{Entries, LineageEngine, ensure_accounted};
use crate::path::NodePath;

/// Unions the namespaced maps of every route.
///
/// Every router input is a key, so columns no route consumes show up with an
/// empty set. An input sent to several routes collects the outputs of all of
/// them.
pub(crate) fn compose(engine: &LineageEngine, router: &Router, path: &NodePath) -> Result<LineageMap> {
    let _span = debug_span!("lineage.router", node = %path, routes = router.routes().len()).entered();
    let node = path.to_string();
    router.validate(&node)?;

    let mut entries: Entries = router
        .inputs()
        .iter()
        .map(|input| (input.clone(), BTreeSet::new()))
        .collect();

    for route in router.routes() {
        let child = engine.trace(&route.node, &path.child(&route.token))?;
        let routed: BTreeSet<&ColumnName> = route.columns.iter().collect();
        for (input, produced) in &child {
            if !routed.contains(input) {
                continue;
            }
            entries
                .entry(input.clone())
                .or_default()
                .extend(produced.iter().map(|name| name.namespaced(&route.token)));
        }
        trace!(node = %node, token = %route.token, "route composed");
    }

    // Unreachable while `Router::validate` holds and child maps are complete.
    ensure_accounted(&entries, &router.outputs(), &node)?;
    Ok(LineageMap::from_entries(entries))
}
