//! The standard preprocessing template.
//!
//! ```text
//! base_pipeline: router over every table column
//!   num     add_missing_ind -> arb_num_imputer                   numeric columns
//!   cat     cat_imputer -> rare_label_enc -> one_hot_encoder     string columns
//!   text_i  text vectorizer                                      one per text column
//! ```
//!
//! Routes whose selection is empty are left out and unselected columns are
//! dropped.

use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use lineage_core::LineageEngine;
use lineage_model::{ColumnName, Leaf, LineageMap, Node, Route, Router, Sequential, Stage};

use crate::config::{BinningConfig, CategoricalConfig, NumericConfig, PipelineConfig};
use crate::error::{FitError, Result};
use crate::ingest::frame_columns;
use crate::selector::{ColumnSelector, DtypeClass};
use crate::units::{
    CategoricalImputer, CategoryBinner, MissingIndicator, NumberImputer, OneHotEncoder,
    TextVectorizer,
};

/// Fits every unit of the template to `df` and returns the frozen tree.
///
/// # Errors
///
/// [`FitError::UnknownColumn`] when a configured text column is missing,
/// [`FitError::InvalidConfig`] when no column is selected by any route, plus
/// any shape error raised while assembling the tree.
pub fn fit_standard_pipeline(df: &DataFrame, config: &PipelineConfig) -> Result<Node> {
    let _span = info_span!(
        "fit_standard_pipeline",
        rows = df.height(),
        columns = df.width()
    )
    .entered();
    config.validate()?;
    let inputs = frame_columns(df)?;
    let text_columns = text_columns(&inputs, &config.text.columns)?;

    let numeric = ColumnSelector::new(DtypeClass::Numeric)
        .include(config.numeric.include.as_deref())?
        .exclude(config.numeric.exclude.as_deref())?
        .skip_names(&config.text.columns)
        .select(df)?;
    let categorical = ColumnSelector::new(DtypeClass::Text)
        .include(config.categorical.include.as_deref())?
        .exclude(config.categorical.exclude.as_deref())?
        .skip_names(&config.text.columns)
        .select(df)?;

    let mut routes = Vec::new();
    if !numeric.is_empty() {
        debug!(columns = numeric.len(), "fitting numeric route");
        routes.push(Route::over_inputs(
            "num",
            fit_numeric(df, &numeric, &config.numeric)?,
        ));
    }
    if !categorical.is_empty() {
        debug!(columns = categorical.len(), "fitting categorical route");
        routes.push(Route::over_inputs(
            "cat",
            fit_categorical(df, &categorical, &config.categorical)?,
        ));
    }
    for (index, column) in text_columns.iter().enumerate() {
        let vectorizer = TextVectorizer::fit(df, column, &config.text)?;
        debug!(
            column = %column,
            vocabulary = vectorizer.vocabulary().len(),
            "fitted text route"
        );
        routes.push(Route::over_inputs(
            format!("text_{index}"),
            Leaf::from_adapter(&vectorizer)?,
        ));
    }
    if routes.is_empty() {
        return Err(FitError::invalid_config(
            "no table column was selected by any route",
        ));
    }

    let route_count = routes.len();
    let router = Router::new(inputs, routes)?;
    let root = Sequential::new(vec![Stage::new("base_pipeline", router)])?;
    info!(
        routes = route_count,
        outputs = root.outputs().len(),
        "fitted standard pipeline"
    );
    Ok(root.into())
}

/// Fits the template and traces it with the configured lineage options.
pub fn trace_standard_pipeline(
    df: &DataFrame,
    config: &PipelineConfig,
) -> Result<(Node, LineageMap)> {
    let tree = fit_standard_pipeline(df, config)?;
    let map = LineageEngine::new(config.lineage).compute(&tree)?;
    Ok((tree, map))
}

fn text_columns(inputs: &[ColumnName], configured: &[String]) -> Result<Vec<ColumnName>> {
    configured
        .iter()
        .map(|name| {
            inputs
                .iter()
                .find(|input| input.as_str() == name.as_str())
                .cloned()
                .ok_or_else(|| FitError::UnknownColumn {
                    column: name.clone(),
                })
        })
        .collect()
}

fn fit_numeric(df: &DataFrame, columns: &[ColumnName], config: &NumericConfig) -> Result<Sequential> {
    let mut stages = Vec::new();
    let mut current = columns.to_vec();
    if config.add_missing_indicator {
        let indicator = MissingIndicator::fit(df, columns, config)?;
        debug!(flagged = indicator.flagged().len(), "fitted missing indicator");
        let leaf = Leaf::from_adapter(&indicator)?;
        current = leaf.outputs().to_vec();
        stages.push(Stage::new("add_missing_ind", leaf));
    }
    let imputer = NumberImputer::fit(&current, config.fill_value);
    debug!(fill_value = imputer.fill_value(), "fitted number imputer");
    stages.push(Stage::new("arb_num_imputer", Leaf::from_adapter(&imputer)?));
    Ok(Sequential::new(stages)?)
}

fn fit_categorical(
    df: &DataFrame,
    columns: &[ColumnName],
    config: &CategoricalConfig,
) -> Result<Sequential> {
    let imputer = CategoricalImputer::fit(columns, &config.fill_value);
    let imputed = columns
        .iter()
        .map(|name| Ok((name.clone(), imputer.imputed(df, name)?)))
        .collect::<Result<Vec<_>>>()?;

    let binner = CategoryBinner::fit(&imputed, &config.binning);
    let binner_ref = &binner;
    let encoder = OneHotEncoder::fit(imputed.iter().map(|(name, values)| {
        (
            name.clone(),
            values.iter().map(move |value| binner_ref.bin(name, value)),
        )
    }));

    let binner_stage = match config.binning {
        BinningConfig::RareLabel { .. } => "rare_label_enc",
        _ => "category_binner",
    };
    Ok(Sequential::new(vec![
        Stage::new("cat_imputer", Leaf::from_adapter(&imputer)?),
        Stage::new(binner_stage, Leaf::from_adapter(&binner)?),
        Stage::new("one_hot_encoder", Leaf::from_adapter(&encoder)?),
    ])?)
}
