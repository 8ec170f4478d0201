use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use lineage_core::{LineageEngine, LineageOptions, LineageReport, invert};
use lineage_fit::{PipelineConfig, read_csv, trace_standard_pipeline};
use lineage_match::PrefixMode;
use lineage_model::{LineageMap, Node, ReverseLineage};

/// Inputs of the `fit` command.
#[derive(Debug, Clone, Default)]
pub struct FitRequest {
    pub csv: PathBuf,
    pub config: Option<PathBuf>,
    /// Appended to the text columns named in the config.
    pub text_columns: Vec<String>,
    pub prefix_mode: Option<PrefixMode>,
    pub invert: bool,
}

/// Inputs of the `tree` command.
#[derive(Debug, Clone, Default)]
pub struct TreeRequest {
    pub tree: PathBuf,
    pub prefix_mode: Option<PrefixMode>,
    pub invert: bool,
}

/// A computed lineage ready for rendering.
#[derive(Debug, Clone)]
pub struct LineageOutcome {
    pub map: LineageMap,
    /// Present when inversion was requested.
    pub reverse: Option<ReverseLineage>,
    pub report: LineageReport,
}

impl LineageOutcome {
    fn new(map: LineageMap, want_reverse: bool) -> Result<Self> {
        let reverse = if want_reverse {
            Some(invert(&map).context("invert lineage")?)
        } else {
            None
        };
        let report = match &reverse {
            Some(reverse) => LineageReport::from_map(&map).with_reverse_rows(reverse),
            None => LineageReport::from_map(&map),
        };
        Ok(Self {
            map,
            reverse,
            report,
        })
    }
}

pub fn run_fit(request: &FitRequest) -> Result<LineageOutcome> {
    let _span = info_span!("fit", csv = %request.csv.display()).entered();
    let mut config = match &request.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    for column in &request.text_columns {
        if !config.text.columns.contains(column) {
            config.text.columns.push(column.clone());
        }
    }
    if let Some(mode) = request.prefix_mode {
        config.lineage.prefix_mode = mode;
    }

    let df = read_csv(&request.csv)
        .with_context(|| format!("read {}", request.csv.display()))?;
    let (_, map) = trace_standard_pipeline(&df, &config).context("fit standard pipeline")?;
    info!(inputs = map.len(), "fit complete");
    LineageOutcome::new(map, request.invert)
}

pub fn run_tree(request: &TreeRequest) -> Result<LineageOutcome> {
    let _span = info_span!("tree", path = %request.tree.display()).entered();
    let tree = load_tree(&request.tree)?;
    let options = LineageOptions {
        prefix_mode: request.prefix_mode.unwrap_or_default(),
    };
    let map = LineageEngine::new(options)
        .compute(&tree)
        .context("compute lineage")?;
    LineageOutcome::new(map, request.invert)
}

fn load_tree(path: &Path) -> Result<Node> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse tree {}", path.display()))
}
