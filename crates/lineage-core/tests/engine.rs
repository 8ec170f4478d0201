use std::collections::BTreeSet;

use lineage_core::{LineageEngine, LineageOptions, LineageReport, compute_lineage, invert};
use lineage_match::PrefixMode;
use lineage_model::{
    ColumnName, Leaf, LineageError, LineageMap, Node, Route, Router, Sequential, Stage,
};

fn leaf(inputs: &[&str], outputs: &[&str]) -> Leaf {
    Leaf::from_names(inputs.iter().copied(), outputs.iter().copied()).unwrap()
}

fn names(raw: &[&str]) -> Vec<ColumnName> {
    raw.iter().map(|name| ColumnName::new(*name).unwrap()).collect()
}

fn owned(map: &LineageMap, input: &str) -> Vec<String> {
    map.get(input)
        .map(|set| set.iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

fn scenario_c() -> Node {
    Router::new(
        names(&["x", "y"]),
        vec![
            Route::new("num", leaf(&["x"], &["x"]), names(&["x"])),
            Route::new("cat", leaf(&["y"], &["y_a", "y_b"]), names(&["y"])),
        ],
    )
    .unwrap()
    .into()
}

fn scenario_d() -> Node {
    Sequential::new(vec![
        Stage::new("add_missing_ind", leaf(&["x"], &["x", "x_na"])),
        Stage::new("scale", leaf(&["x", "x_na"], &["x_scaled"])),
    ])
    .unwrap()
    .into()
}

/// Mirrors the default preprocessing layout: numeric, categorical and text
/// branches under one router, wrapped in a single-stage chain.
fn standard_tree() -> Node {
    let num = Sequential::new(vec![
        Stage::new("add_missing_ind", leaf(&["x"], &["x", "x_na"])),
        Stage::new("arb_num_imputer", leaf(&["x", "x_na"], &["x", "x_na"])),
    ])
    .unwrap();
    let cat = Sequential::new(vec![
        Stage::new("cat_imputer", leaf(&["y"], &["y"])),
        Stage::new("rare_label_enc", leaf(&["y"], &["y"])),
        Stage::new("one_hot_encoder", leaf(&["y"], &["y_a", "y_b", "y_Rare"])),
    ])
    .unwrap();
    let text = leaf(&["z"], &["z_cool", "z_is", "z_python"]);
    let router = Router::new(
        names(&["x", "y", "z"]),
        vec![
            Route::over_inputs("num", num),
            Route::over_inputs("cat", cat),
            Route::over_inputs("text_0", text),
        ],
    )
    .unwrap();
    Sequential::new(vec![Stage::new("base_pipeline", router)])
        .unwrap()
        .into()
}

#[test]
fn leaf_with_single_input_owns_its_indicator() {
    let map = compute_lineage(&leaf(&["x"], &["x_na"]).into()).unwrap();
    assert_eq!(owned(&map, "x"), vec!["x_na"]);
    assert_eq!(map.len(), 1);
}

#[test]
fn leaf_with_single_input_owns_every_level() {
    let map = compute_lineage(&leaf(&["y"], &["y_a", "y_b", "y_Rare"]).into()).unwrap();
    assert_eq!(owned(&map, "y"), vec!["y_Rare", "y_a", "y_b"]);
}

#[test]
fn router_namespaces_child_outputs() {
    let map = compute_lineage(&scenario_c()).unwrap();
    assert_eq!(owned(&map, "x"), vec!["num__x"]);
    assert_eq!(owned(&map, "y"), vec!["cat__y_a", "cat__y_b"]);
}

#[test]
fn router_map_snapshot() {
    let map = compute_lineage(&scenario_c()).unwrap();
    insta::assert_json_snapshot!(map, @r#"
    {
      "x": [
        "num__x"
      ],
      "y": [
        "cat__y_a",
        "cat__y_b"
      ]
    }
    "#);
}

#[test]
fn sequential_drops_intermediate_columns() {
    let map = compute_lineage(&scenario_d()).unwrap();
    assert_eq!(owned(&map, "x"), vec!["x_scaled"]);
}

#[test]
fn longer_input_wins_the_prefix_tie() {
    let map = compute_lineage(&leaf(&["x", "xx"], &["xx_suffix"]).into()).unwrap();
    assert_eq!(owned(&map, "xx"), vec!["xx_suffix"]);
    assert!(owned(&map, "x").is_empty());
}

#[test]
fn standard_tree_traces_every_branch() {
    let tree = standard_tree();
    let map = compute_lineage(&tree).unwrap();
    assert_eq!(owned(&map, "x"), vec!["num__x", "num__x_na"]);
    assert_eq!(owned(&map, "y"), vec!["cat__y_Rare", "cat__y_a", "cat__y_b"]);
    assert_eq!(
        owned(&map, "z"),
        vec!["text_0__z_cool", "text_0__z_is", "text_0__z_python"]
    );

    let declared: BTreeSet<ColumnName> = tree.outputs().into_iter().collect();
    let produced: BTreeSet<ColumnName> = map.outputs().into_iter().cloned().collect();
    assert_eq!(declared, produced);

    let reverse = invert(&map).unwrap();
    assert_eq!(reverse.len(), 7);
    assert_eq!(reverse.get("cat__y_Rare").map(ColumnName::as_str), Some("y"));
}

#[test]
fn unrouted_router_input_maps_to_nothing() {
    let router = Router::new(
        names(&["x", "dropped"]),
        vec![Route::new("num", leaf(&["x"], &["x"]), names(&["x"]))],
    )
    .unwrap();
    let map = compute_lineage(&router.into()).unwrap();
    assert!(map.contains_input("dropped"));
    assert!(owned(&map, "dropped").is_empty());
    assert_eq!(owned(&map, "x"), vec!["num__x"]);
}

#[test]
fn overlapping_routes_union_their_outputs() {
    let router = Router::new(
        names(&["x"]),
        vec![
            Route::new("raw", leaf(&["x"], &["x"]), names(&["x"])),
            Route::new("log", leaf(&["x"], &["x_log"]), names(&["x"])),
        ],
    )
    .unwrap();
    let map = compute_lineage(&router.into()).unwrap();
    assert_eq!(owned(&map, "x"), vec!["log__x_log", "raw__x"]);
}

#[test]
fn leaf_failure_reports_its_path() {
    let encode = Sequential::new(vec![Stage::new(
        "encode",
        leaf(&["a", "b"], &["a_x", "zzz"]),
    )])
    .unwrap();
    let router = Router::new(names(&["a", "b"]), vec![Route::over_inputs("cat", encode)]).unwrap();

    let err = compute_lineage(&router.into()).unwrap_err();
    assert_eq!(
        err,
        LineageError::UnaccountedOutput {
            node: "root/cat/encode".to_string(),
            missing: vec!["zzz".to_string()],
        }
    );
}

#[test]
fn broken_chain_inside_router_is_malformed() {
    let json = r#"{
        "kind": "router",
        "inputs": ["x"],
        "routes": [{
            "token": "num",
            "columns": ["x"],
            "node": {
                "kind": "sequential",
                "stages": [
                    {"name": "first", "node": {"kind": "leaf", "inputs": ["x"], "outputs": ["x", "x_na"]}},
                    {"name": "second", "node": {"kind": "leaf", "inputs": ["x"], "outputs": ["x"]}}
                ]
            }
        }]
    }"#;
    let tree: Node = serde_json::from_str(json).unwrap();

    let err = compute_lineage(&tree).unwrap_err();
    assert_eq!(err.kind(), "malformed_tree");
    assert_eq!(
        err.to_string(),
        "malformed tree at root/num: stage first outputs [x, x_na] do not match stage second inputs [x]"
    );
}

#[test]
fn broadcast_leaf_cannot_be_inverted() {
    let map = compute_lineage(&leaf(&["a", "b"], &["pc1", "pc2"]).into()).unwrap();
    assert_eq!(owned(&map, "a"), vec!["pc1", "pc2"]);
    assert_eq!(owned(&map, "b"), vec!["pc1", "pc2"]);

    let err = invert(&map).unwrap_err();
    assert!(matches!(err, LineageError::AmbiguousProvenance { ref output, .. } if output == "pc1"));
}

#[test]
fn literal_mode_does_not_expand_metacharacters() {
    let tree: Node = leaf(&["a.b", "c"], &["aXb_1", "c_1"]).into();

    let regex = LineageEngine::default().compute(&tree).unwrap();
    assert_eq!(owned(&regex, "a.b"), vec!["aXb_1"]);

    let literal = LineageEngine::new(LineageOptions {
        prefix_mode: PrefixMode::Literal,
    })
    .compute(&tree)
    .unwrap_err();
    assert!(matches!(literal, LineageError::UnaccountedOutput { ref node, .. } if node == "root"));
}

#[test]
fn repeated_runs_are_identical() {
    let tree = standard_tree();
    let first = compute_lineage(&tree).unwrap();
    let second = compute_lineage(&tree).unwrap();
    assert_eq!(first, second);
}

#[test]
fn shared_tree_can_be_traced_from_many_threads() {
    let tree = standard_tree();
    let engine = LineageEngine::default();
    let expected = engine.compute(&tree).unwrap();

    let results: Vec<LineageMap> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.compute(&tree).unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(results.iter().all(|map| *map == expected));
}

#[test]
fn report_rows_follow_the_map() {
    let map = compute_lineage(&standard_tree()).unwrap();
    let report = LineageReport::from_map(&map);
    assert_eq!(report.rows.len(), 7);
    assert_eq!(report.rows[0].output, "cat__y_Rare");
    assert_eq!(report.stats.input_count, 3);
    assert_eq!(report.stats.max_fan_out, 3);
    assert!(report.stats.dropped_inputs.is_empty());
}
