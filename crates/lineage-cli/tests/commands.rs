use std::io::Write;

use lineage_cli::commands::{FitRequest, TreeRequest, run_fit, run_tree};
use lineage_cli::summary::{render_csv, render_json, render_table};
use lineage_match::PrefixMode;
use lineage_model::{ColumnName, LineageError};
use tempfile::NamedTempFile;

const TABLE_CSV: &str = "\
age,site,notes
31,north,Follow up in spring
,south,
52,north,Spring visit
";

const BROADCAST_TREE: &str = r#"{
    "kind": "leaf",
    "inputs": ["a", "b"],
    "outputs": ["pc1", "pc2"]
}"#;

const ROUTED_TREE: &str = r#"{
    "kind": "router",
    "inputs": ["x", "y"],
    "routes": [
        {"token": "num", "columns": ["x"], "node": {"kind": "leaf", "inputs": ["x"], "outputs": ["x", "x_na"]}},
        {"token": "cat", "columns": ["y"], "node": {"kind": "leaf", "inputs": ["y"], "outputs": ["y_a", "y_b"]}}
    ]
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn fit_request(csv: &NamedTempFile) -> FitRequest {
    FitRequest {
        csv: csv.path().to_path_buf(),
        text_columns: vec!["notes".to_string()],
        ..FitRequest::default()
    }
}

#[test]
fn fit_routes_text_columns_from_flags() {
    let csv = write_temp(TABLE_CSV);
    let outcome = run_fit(&fit_request(&csv)).unwrap();

    let notes: Vec<String> = outcome
        .map
        .get("notes")
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        notes,
        vec![
            "text_0__notes_follow",
            "text_0__notes_in",
            "text_0__notes_spring",
            "text_0__notes_up",
            "text_0__notes_visit",
        ]
    );
    assert_eq!(outcome.report.stats.input_count, 3);
    assert!(outcome.reverse.is_none());
}

#[test]
fn fit_reads_config_and_inverts() {
    let csv = write_temp(TABLE_CSV);
    let config = write_temp("[numeric]\nadd_missing_indicator = false\n");
    let outcome = run_fit(&FitRequest {
        config: Some(config.path().to_path_buf()),
        invert: true,
        ..fit_request(&csv)
    })
    .unwrap();

    let reverse = outcome.reverse.unwrap();
    assert_eq!(reverse.get("num__age").map(ColumnName::as_str), Some("age"));
    assert!(!reverse.contains_key("num__age_na"));
    assert_eq!(reverse.get("cat__site_south").map(ColumnName::as_str), Some("site"));
}

#[test]
fn fit_reports_missing_csv() {
    let err = run_fit(&FitRequest {
        csv: "does/not/exist.csv".into(),
        ..FitRequest::default()
    })
    .unwrap_err();
    assert!(format!("{err:#}").starts_with("read does/not/exist.csv"));
}

#[test]
fn tree_json_renders_forward_map() {
    let tree = write_temp(ROUTED_TREE);
    let outcome = run_tree(&TreeRequest {
        tree: tree.path().to_path_buf(),
        ..TreeRequest::default()
    })
    .unwrap();

    insta::assert_snapshot!(render_json(&outcome).unwrap(), @r#"
    {
      "x": [
        "num__x",
        "num__x_na"
      ],
      "y": [
        "cat__y_a",
        "cat__y_b"
      ]
    }
    "#);
}

#[test]
fn tree_json_renders_inverted_map() {
    let tree = write_temp(ROUTED_TREE);
    let outcome = run_tree(&TreeRequest {
        tree: tree.path().to_path_buf(),
        prefix_mode: Some(PrefixMode::Literal),
        invert: true,
    })
    .unwrap();

    insta::assert_snapshot!(render_json(&outcome).unwrap(), @r#"
    {
      "cat__y_a": "y",
      "cat__y_b": "y",
      "num__x": "x",
      "num__x_na": "x"
    }
    "#);
}

#[test]
fn tree_csv_lists_output_input_rows() {
    let tree = write_temp(ROUTED_TREE);
    let outcome = run_tree(&TreeRequest {
        tree: tree.path().to_path_buf(),
        ..TreeRequest::default()
    })
    .unwrap();

    assert_eq!(
        render_csv(&outcome).unwrap(),
        "output,input\ncat__y_a,y\ncat__y_b,y\nnum__x,x\nnum__x_na,x\n"
    );
    let table = render_table(&outcome);
    assert!(table.contains("num__x_na"));
    assert!(table.contains("Max fan-out"));
}

#[test]
fn inverted_csv_lists_one_row_per_output() {
    let tree = write_temp(ROUTED_TREE);
    let outcome = run_tree(&TreeRequest {
        tree: tree.path().to_path_buf(),
        invert: true,
        ..TreeRequest::default()
    })
    .unwrap();

    let reverse = outcome.reverse.as_ref().unwrap();
    assert_eq!(outcome.report.rows.len(), reverse.len());
    assert_eq!(
        render_csv(&outcome).unwrap(),
        "output,input\ncat__y_a,y\ncat__y_b,y\nnum__x,x\nnum__x_na,x\n"
    );
    assert!(render_table(&outcome).contains("cat__y_b"));
}

#[test]
fn inverting_broadcast_tree_fails() {
    let tree = write_temp(BROADCAST_TREE);
    let err = run_tree(&TreeRequest {
        tree: tree.path().to_path_buf(),
        invert: true,
        ..TreeRequest::default()
    })
    .unwrap_err();

    let lineage = err.downcast_ref::<LineageError>().unwrap();
    assert_eq!(lineage.kind(), "ambiguous_provenance");
}

#[test]
fn malformed_tree_json_is_rejected() {
    let tree = write_temp(r#"{"kind": "leaf", "inputs": [""], "outputs": ["a"]}"#);
    let err = run_tree(&TreeRequest {
        tree: tree.path().to_path_buf(),
        ..TreeRequest::default()
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("parse tree"));
}
