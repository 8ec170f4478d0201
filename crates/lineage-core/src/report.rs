//! Tabular view of a lineage map.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use serde::Serialize;

use lineage_model::{LineageMap, ReverseLineage};

/// One attribution: `output` was derived from `input`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LineageRow {
    pub output: String,
    pub input: String,
}

/// Summary counts for a lineage map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineageStats {
    pub input_count: usize,
    pub output_count: usize,
    /// Inputs that reach no output.
    pub dropped_inputs: Vec<String>,
    /// Largest number of outputs derived from one input.
    pub max_fan_out: usize,
    /// Outputs attributed to more than one input.
    pub shared_outputs: usize,
}

/// Flattened `(output, input)` rows plus summary counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineageReport {
    pub rows: Vec<LineageRow>,
    pub stats: LineageStats,
}

impl LineageReport {
    /// Rows are ordered by output, then input.
    pub fn from_map(map: &LineageMap) -> Self {
        let mut rows: Vec<LineageRow> = map
            .iter()
            .flat_map(|(input, produced)| {
                produced.iter().map(move |output| LineageRow {
                    output: output.to_string(),
                    input: input.to_string(),
                })
            })
            .collect();
        rows.sort();

        let outputs = map.outputs();
        let shared_outputs = outputs
            .iter()
            .filter(|output| map.claimants(output.as_str()).len() > 1)
            .count();
        let stats = LineageStats {
            input_count: map.len(),
            output_count: outputs.len(),
            dropped_inputs: map
                .iter()
                .filter(|(_, produced)| produced.is_empty())
                .map(|(input, _)| input.to_string())
                .collect(),
            max_fan_out: map.iter().map(|(_, produced)| produced.len()).max().unwrap_or(0),
            shared_outputs,
        };
        Self { rows, stats }
    }

    /// Replaces the rows with the attributions of an inverted map.
    pub fn with_reverse_rows(mut self, reverse: &ReverseLineage) -> Self {
        self.rows = reverse
            .iter()
            .map(|(output, input)| LineageRow {
                output: output.to_string(),
                input: input.to_string(),
            })
            .collect();
        self
    }

    /// Renders the rows as a two-column `output`/`input` frame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let outputs: Vec<String> = self.rows.iter().map(|row| row.output.clone()).collect();
        let inputs: Vec<String> = self.rows.iter().map(|row| row.input.clone()).collect();
        DataFrame::new(vec![
            Series::new("output".into(), outputs).into_column(),
            Series::new("input".into(), inputs).into_column(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use lineage_model::ColumnName;

    use super::*;

    fn map(entries: &[(&str, &[&str])]) -> LineageMap {
        let mut inner = BTreeMap::new();
        for (input, outputs) in entries {
            let set: BTreeSet<ColumnName> = outputs
                .iter()
                .map(|name| ColumnName::new(*name).unwrap())
                .collect();
            inner.insert(ColumnName::new(*input).unwrap(), set);
        }
        LineageMap::from_entries(inner)
    }

    #[test]
    fn rows_are_sorted_by_output() {
        let report = LineageReport::from_map(&map(&[
            ("y", &["cat__y_b", "cat__y_a"]),
            ("x", &["num__x"]),
            ("w", &[]),
        ]));
        let outputs: Vec<&str> = report.rows.iter().map(|row| row.output.as_str()).collect();
        assert_eq!(outputs, vec!["cat__y_a", "cat__y_b", "num__x"]);
        assert_eq!(report.stats.input_count, 3);
        assert_eq!(report.stats.output_count, 3);
        assert_eq!(report.stats.dropped_inputs, vec!["w".to_string()]);
        assert_eq!(report.stats.max_fan_out, 2);
        assert_eq!(report.stats.shared_outputs, 0);
    }

    #[test]
    fn broadcast_outputs_are_counted_as_shared() {
        let report = LineageReport::from_map(&map(&[("a", &["pc1", "pc2"]), ("b", &["pc1", "pc2"])]));
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.stats.output_count, 2);
        assert_eq!(report.stats.shared_outputs, 2);
    }

    #[test]
    fn reverse_rows_follow_the_inverted_map() {
        let forward = map(&[("x", &["num__x_na", "num__x"]), ("w", &[])]);
        let reverse = forward.invert().unwrap();
        let report = LineageReport::from_map(&forward).with_reverse_rows(&reverse);
        let rows: Vec<(&str, &str)> = report
            .rows
            .iter()
            .map(|row| (row.output.as_str(), row.input.as_str()))
            .collect();
        assert_eq!(rows, vec![("num__x", "x"), ("num__x_na", "x")]);
        assert_eq!(report.stats.dropped_inputs, vec!["w".to_string()]);
    }

    #[test]
    fn dataframe_has_output_and_input_columns() {
        let report = LineageReport::from_map(&map(&[("x", &["num__x", "num__x_na"])]));
        let df = report.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, vec!["output", "input"]);
        let inputs = df.column("input").unwrap().str().unwrap();
        assert_eq!(inputs.get(0), Some("x"));
    }
}
