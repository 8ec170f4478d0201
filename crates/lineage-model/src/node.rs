//! Fitted transformation tree shapes.
//!
//! A tree is built once, after its units have been fitted against a concrete
//! table, and is read-only afterwards. Constructors validate the local shape
//! of each node; [`Node::validate`] re-runs the same checks so that trees
//! deserialized from JSON get the same guarantees.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::{column_names, ensure_non_empty, ensure_unique};
use crate::{ColumnName, LineageError, Result};

/// Per-input output sets reported by a unit that knows its own provenance.
pub type SubMap = BTreeMap<ColumnName, BTreeSet<ColumnName>>;

/// Descriptive contract every fitted transformation unit exposes.
///
/// Implementations must not have side effects.
pub trait LeafAdapter {
    /// Columns the unit consumed, in order.
    fn inputs(&self) -> Vec<ColumnName>;

    /// Columns the unit produced, in order.
    fn outputs(&self) -> Vec<ColumnName>;

    /// Exact input to output attribution, when the unit can report it.
    fn explicit_sub_map(&self) -> Option<SubMap> {
        None
    }
}

/// A single opaque unit, described only by its column-name contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    inputs: Vec<ColumnName>,
    outputs: Vec<ColumnName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explicit_map: Option<SubMap>,
}

impl Leaf {
    pub fn new(inputs: Vec<ColumnName>, outputs: Vec<ColumnName>) -> Result<Self> {
        let leaf = Self {
            inputs,
            outputs,
            explicit_map: None,
        };
        leaf.validate("leaf")?;
        Ok(leaf)
    }

    /// Builds a leaf from raw name lists.
    pub fn from_names<I, O, S, T>(inputs: I, outputs: O) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(
            column_names(inputs, "leaf inputs")?,
            column_names(outputs, "leaf outputs")?,
        )
    }

    /// Snapshots the contract of a fitted unit.
    pub fn from_adapter(adapter: &dyn LeafAdapter) -> Result<Self> {
        let leaf = Self::new(adapter.inputs(), adapter.outputs())?;
        match adapter.explicit_sub_map() {
            Some(map) => leaf.with_explicit_map(map),
            None => Ok(leaf),
        }
    }

    /// Attaches a self-reported sub-map.
    pub fn with_explicit_map(mut self, map: SubMap) -> Result<Self> {
        self.explicit_map = Some(map);
        self.validate("leaf")?;
        Ok(self)
    }

    pub fn inputs(&self) -> &[ColumnName] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ColumnName] {
        &self.outputs
    }

    pub fn explicit_map(&self) -> Option<&SubMap> {
        self.explicit_map.as_ref()
    }

    /// Checks list sizes, name uniqueness, and that an explicit map only
    /// refers to declared columns.
    pub fn validate(&self, node: &str) -> Result<()> {
        ensure_non_empty(&self.inputs, node, "leaf inputs")?;
        ensure_non_empty(&self.outputs, node, "leaf outputs")?;
        ensure_unique(&self.inputs, &format!("{node} inputs"))?;
        ensure_unique(&self.outputs, &format!("{node} outputs"))?;
        let Some(map) = &self.explicit_map else {
            return Ok(());
        };
        let inputs: BTreeSet<&ColumnName> = self.inputs.iter().collect();
        let outputs: BTreeSet<&ColumnName> = self.outputs.iter().collect();
        for (input, produced) in map {
            if !inputs.contains(input) {
                return Err(LineageError::malformed(
                    node,
                    format!("explicit map names undeclared input {input}"),
                ));
            }
            if let Some(unknown) = produced.iter().find(|name| !outputs.contains(name)) {
                return Err(LineageError::malformed(
                    node,
                    format!("explicit map attributes undeclared output {unknown} to {input}"),
                ));
            }
        }
        Ok(())
    }
}

/// One named step of a [`Sequential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub node: Node,
}

impl Stage {
    pub fn new(name: impl Into<String>, node: impl Into<Node>) -> Self {
        Self {
            name: name.into(),
            node: node.into(),
        }
    }
}

/// An ordered chain where each stage consumes exactly what the previous
/// stage produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequential {
    stages: Vec<Stage>,
}

impl Sequential {
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        let sequential = Self { stages };
        sequential.validate("sequential")?;
        Ok(sequential)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn inputs(&self) -> Vec<ColumnName> {
        self.stages
            .first()
            .map(|stage| stage.node.inputs())
            .unwrap_or_default()
    }

    pub fn outputs(&self) -> Vec<ColumnName> {
        self.stages
            .last()
            .map(|stage| stage.node.outputs())
            .unwrap_or_default()
    }

    /// Checks the chain invariant between neighbouring stages.
    ///
    /// Child nodes are not descended into.
    pub fn validate(&self, node: &str) -> Result<()> {
        if self.stages.is_empty() {
            return Err(LineageError::malformed(
                node,
                "sequential node has no stages",
            ));
        }
        let mut names = BTreeSet::new();
        for stage in &self.stages {
            if stage.name.is_empty() {
                return Err(LineageError::malformed(node, "stage names must be non-empty"));
            }
            if !names.insert(stage.name.as_str()) {
                return Err(LineageError::malformed(
                    node,
                    format!("stage name {} is used twice", stage.name),
                ));
            }
        }
        for pair in self.stages.windows(2) {
            let produced: BTreeSet<ColumnName> = pair[0].node.outputs().into_iter().collect();
            let consumed: BTreeSet<ColumnName> = pair[1].node.inputs().into_iter().collect();
            if produced != consumed {
                return Err(LineageError::malformed(
                    node,
                    format!(
                        "stage {} outputs [{}] do not match stage {} inputs [{}]",
                        pair[0].name,
                        join(&produced),
                        pair[1].name,
                        join(&consumed),
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// One branch of a [`Router`]: a child and the columns routed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub token: String,
    pub node: Node,
    pub columns: Vec<ColumnName>,
}

impl Route {
    pub fn new(token: impl Into<String>, node: impl Into<Node>, columns: Vec<ColumnName>) -> Self {
        Self {
            token: token.into(),
            node: node.into(),
            columns,
        }
    }

    /// Routes exactly the columns the child declares as its inputs.
    pub fn over_inputs(token: impl Into<String>, node: impl Into<Node>) -> Self {
        let node = node.into();
        let columns = node.inputs();
        Self {
            token: token.into(),
            node,
            columns,
        }
    }

    /// Child outputs with this route's namespace applied.
    pub fn namespaced_outputs(&self) -> Vec<ColumnName> {
        self.node
            .outputs()
            .iter()
            .map(|name| name.namespaced(&self.token))
            .collect()
    }
}

/// A parallel composite that splits the incoming columns among children
/// and concatenates their namespaced outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    inputs: Vec<ColumnName>,
    routes: Vec<Route>,
}

impl Router {
    pub fn new(inputs: Vec<ColumnName>, routes: Vec<Route>) -> Result<Self> {
        let router = Self { inputs, routes };
        router.validate("router")?;
        Ok(router)
    }

    pub fn inputs(&self) -> &[ColumnName] {
        &self.inputs
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Declared outputs: every child's outputs, namespaced, in child order.
    pub fn outputs(&self) -> Vec<ColumnName> {
        self.routes
            .iter()
            .flat_map(Route::namespaced_outputs)
            .collect()
    }

    /// Checks tokens, route membership, and namespace collisions.
    ///
    /// Child nodes are not descended into.
    pub fn validate(&self, node: &str) -> Result<()> {
        ensure_non_empty(&self.inputs, node, "router inputs")?;
        ensure_unique(&self.inputs, &format!("{node} inputs"))?;
        if self.routes.is_empty() {
            return Err(LineageError::malformed(node, "router has no routes"));
        }
        let declared: BTreeSet<&ColumnName> = self.inputs.iter().collect();
        let mut tokens = BTreeSet::new();
        for route in &self.routes {
            if route.token.is_empty() {
                return Err(LineageError::malformed(node, "route tokens must be non-empty"));
            }
            if !tokens.insert(route.token.as_str()) {
                return Err(LineageError::malformed(
                    node,
                    format!("route token {} is used twice", route.token),
                ));
            }
            ensure_unique(&route.columns, &format!("{node}/{} routed columns", route.token))?;
            let outside: Vec<&ColumnName> = route
                .columns
                .iter()
                .filter(|column| !declared.contains(column))
                .collect();
            if !outside.is_empty() {
                return Err(LineageError::malformed(
                    node,
                    format!(
                        "route {} receives columns not declared by the router: {}",
                        route.token,
                        join(outside)
                    ),
                ));
            }
            let routed: BTreeSet<ColumnName> = route.columns.iter().cloned().collect();
            let consumed: BTreeSet<ColumnName> = route.node.inputs().into_iter().collect();
            if routed != consumed {
                return Err(LineageError::malformed(
                    node,
                    format!(
                        "route {} sends [{}] but its child consumes [{}]",
                        route.token,
                        join(&routed),
                        join(&consumed),
                    ),
                ));
            }
        }
        let mut produced = BTreeMap::new();
        for route in &self.routes {
            for name in route.namespaced_outputs() {
                if let Some(previous) = produced.insert(name.clone(), route.token.as_str()) {
                    return Err(LineageError::malformed(
                        node,
                        format!(
                            "routes {previous} and {} both produce {name} after namespacing",
                            route.token
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A node of a fitted transformation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf(Leaf),
    Sequential(Sequential),
    Router(Router),
}

impl Node {
    pub fn inputs(&self) -> Vec<ColumnName> {
        match self {
            Self::Leaf(leaf) => leaf.inputs().to_vec(),
            Self::Sequential(sequential) => sequential.inputs(),
            Self::Router(router) => router.inputs().to_vec(),
        }
    }

    pub fn outputs(&self) -> Vec<ColumnName> {
        match self {
            Self::Leaf(leaf) => leaf.outputs().to_vec(),
            Self::Sequential(sequential) => sequential.outputs(),
            Self::Router(router) => router.outputs(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Sequential(_) => "sequential",
            Self::Router(_) => "router",
        }
    }

    /// Validates this node's own shape (not its descendants).
    pub fn validate(&self, node: &str) -> Result<()> {
        match self {
            Self::Leaf(leaf) => leaf.validate(node),
            Self::Sequential(sequential) => sequential.validate(node),
            Self::Router(router) => router.validate(node),
        }
    }
}

impl From<Leaf> for Node {
    fn from(value: Leaf) -> Self {
        Self::Leaf(value)
    }
}

impl From<Sequential> for Node {
    fn from(value: Sequential) -> Self {
        Self::Sequential(value)
    }
}

impl From<Router> for Node {
    fn from(value: Router) -> Self {
        Self::Router(value)
    }
}

fn join<'a>(names: impl IntoIterator<Item = &'a ColumnName>) -> String {
    names
        .into_iter()
        .map(ColumnName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<ColumnName> {
        raw.iter().map(|name| ColumnName::new(*name).unwrap()).collect()
    }

    #[test]
    fn leaf_rejects_duplicate_outputs() {
        let err = Leaf::new(names(&["x"]), names(&["x_a", "x_a"])).unwrap_err();
        assert_eq!(
            err,
            LineageError::DuplicateColumnName {
                context: "leaf outputs".to_string(),
                names: vec!["x_a".to_string()],
            }
        );
    }

    #[test]
    fn leaf_rejects_empty_inputs() {
        let err = Leaf::new(Vec::new(), names(&["x"])).unwrap_err();
        assert_eq!(err.kind(), "malformed_tree");
    }

    #[test]
    fn explicit_map_must_stay_inside_declared_columns() {
        let leaf = Leaf::new(names(&["y"]), names(&["y_a"])).unwrap();
        let mut map = SubMap::new();
        map.insert(
            ColumnName::new("y").unwrap(),
            names(&["y_b"]).into_iter().collect(),
        );
        let err = leaf.with_explicit_map(map).unwrap_err();
        assert!(err.to_string().contains("undeclared output y_b"));
    }

    #[test]
    fn router_outputs_are_namespaced_in_route_order() {
        let router = Router::new(
            names(&["x", "y"]),
            vec![
                Route::over_inputs("num", Leaf::from_names(["x"], ["x"]).unwrap()),
                Route::over_inputs("cat", Leaf::from_names(["y"], ["y_a", "y_b"]).unwrap()),
            ],
        )
        .unwrap();
        assert_eq!(
            router.outputs(),
            names(&["num__x", "cat__y_a", "cat__y_b"])
        );
    }

    #[test]
    fn router_rejects_route_outside_inputs() {
        let err = Router::new(
            names(&["x"]),
            vec![Route::over_inputs(
                "cat",
                Leaf::from_names(["y"], ["y_a"]).unwrap(),
            )],
        )
        .unwrap_err();
        assert!(matches!(err, LineageError::MalformedTree { .. }));
        assert!(err.to_string().contains("not declared by the router: y"));
    }

    #[test]
    fn sequential_rejects_broken_chain() {
        let err = Sequential::new(vec![
            Stage::new("first", Leaf::from_names(["x"], ["x", "x_na"]).unwrap()),
            Stage::new("second", Leaf::from_names(["x"], ["x_scaled"]).unwrap()),
        ])
        .unwrap_err();
        assert!(
            err.to_string()
                .contains("stage first outputs [x, x_na] do not match stage second inputs [x]")
        );
    }
}
