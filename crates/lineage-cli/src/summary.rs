use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use polars::prelude::{CsvWriter, SerWriter};

use crate::commands::LineageOutcome;

pub fn render_table(outcome: &LineageOutcome) -> String {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Output"), header_cell("Input")]);
    apply_table_style(&mut table);
    for row in &outcome.report.rows {
        table.add_row(vec![Cell::new(&row.output), Cell::new(&row.input)]);
    }
    for input in &outcome.report.stats.dropped_inputs {
        table.add_row(vec![dim_cell("-"), dim_cell(input)]);
    }

    let stats = &outcome.report.stats;
    let mut totals = Table::new();
    totals.set_header(vec![
        header_cell("Inputs"),
        header_cell("Outputs"),
        header_cell("Dropped"),
        header_cell("Max fan-out"),
        header_cell("Shared"),
    ]);
    apply_table_style(&mut totals);
    totals.add_row(vec![
        Cell::new(stats.input_count),
        Cell::new(stats.output_count),
        count_cell(stats.dropped_inputs.len(), Color::Yellow),
        Cell::new(stats.max_fan_out),
        count_cell(stats.shared_outputs, Color::Yellow),
    ]);
    format!("{table}\n{totals}")
}

/// Forward map as `{input: [outputs]}`, or `{output: input}` when inverted.
pub fn render_json(outcome: &LineageOutcome) -> serde_json::Result<String> {
    match &outcome.reverse {
        Some(reverse) => serde_json::to_string_pretty(reverse),
        None => serde_json::to_string_pretty(&outcome.map),
    }
}

/// `output,input` rows.
pub fn render_csv(outcome: &LineageOutcome) -> anyhow::Result<String> {
    let mut df = outcome.report.to_dataframe()?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer).finish(&mut df)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
