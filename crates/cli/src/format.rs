//! Output → human/json string formatting.
//!
//! - **Human** (default): aligned text tables, one name per line for listings
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use serde_json::{Value, json};

use workwear_issuance::IssuanceEntry;

use crate::execute::Output;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> anyhow::Result<String> {
    match mode {
        OutputMode::Human => Ok(format_human(output)),
        OutputMode::Json => Ok(serde_json::to_string_pretty(&to_json(output)?)?),
    }
}

/// Format an error, including its cause chain.
pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    let message = format!("{err:#}");
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&json!({ "error": message }))
            .unwrap_or_else(|_| format!("{{\"error\": {message:?}}}")),
        OutputMode::Human => format!("(error) {message}"),
    }
}

fn to_json(output: &Output) -> serde_json::Result<Value> {
    Ok(match output {
        Output::Added {
            garment_type,
            size,
            quantity,
            on_hand,
        } => json!({
            "garment_type": garment_type,
            "size": size,
            "quantity": quantity,
            "on_hand": on_hand,
        }),
        Output::Issued(receipt) => serde_json::to_value(receipt)?,
        Output::Registered { kind, name } => json!({ "kind": kind, "name": name }),
        Output::Names(names) => json!(names),
        Output::Stock(lines) => serde_json::to_value(lines)?,
        Output::Log(entries) => serde_json::to_value(entries)?,
        Output::Summary(totals) => serde_json::to_value(totals)?,
        Output::Pivot(pivot) => serde_json::to_value(pivot)?,
        Output::Exported { path, rows } => json!({
            "exported": path.display().to_string(),
            "rows": rows,
        }),
    })
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Added {
            garment_type,
            size,
            quantity,
            on_hand,
        } => format!("Added {quantity} x {garment_type} {size} (on hand: {on_hand})"),
        Output::Issued(receipt) => {
            let entry = &receipt.entry;
            format!(
                "Issued {} x {} {} to {} (remaining: {})",
                entry.quantity(),
                entry.garment_type(),
                entry.size(),
                entry.worker(),
                receipt.remaining
            )
        }
        Output::Registered { kind, name } => format!("Registered {kind} {name}"),
        Output::Names(names) if names.is_empty() => "(none)".to_string(),
        Output::Names(names) => names.join("\n"),
        Output::Stock(lines) if lines.is_empty() => "(no stock)".to_string(),
        Output::Stock(lines) => table(
            &["Type", "Size", "Quantity", "Low Stock"],
            lines
                .iter()
                .map(|line| {
                    vec![
                        line.record.garment_type.to_string(),
                        line.record.size.to_string(),
                        line.record.quantity.to_string(),
                        if line.low_stock { "LOW" } else { "" }.to_string(),
                    ]
                })
                .collect(),
        ),
        Output::Log(entries) if entries.is_empty() => "(no entries)".to_string(),
        Output::Log(entries) => table(
            &["Date", "Worker", "Type", "Size", "Quantity"],
            entries.iter().map(log_row).collect(),
        ),
        Output::Summary(totals) if totals.is_empty() => "(no entries)".to_string(),
        Output::Summary(totals) => table(
            &["Worker", "Total Issued"],
            totals
                .iter()
                .map(|t| vec![t.worker.to_string(), t.total.to_string()])
                .collect(),
        ),
        Output::Pivot(pivot) if pivot.is_empty() => "(no entries)".to_string(),
        Output::Pivot(pivot) => {
            let mut headers: Vec<&str> = vec!["Worker"];
            headers.extend(pivot.types.iter().map(|t| t.as_str()));
            headers.push("Total");
            let rows = pivot
                .rows
                .iter()
                .map(|row| {
                    let mut cells = vec![row.worker.to_string()];
                    cells.extend(row.quantities.iter().map(u64::to_string));
                    cells.push(row.total.to_string());
                    cells
                })
                .collect();
            table(&headers, rows)
        }
        Output::Exported { path, rows } => format!("Exported {rows} row(s) to {}", path.display()),
    }
}

fn log_row(entry: &IssuanceEntry) -> Vec<String> {
    vec![
        entry.formatted_timestamp(),
        entry.worker().to_string(),
        entry.garment_type().to_string(),
        entry.size().to_string(),
        entry.quantity().to_string(),
    ]
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(headers.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        lines.push(render_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn table_aligns_columns() {
        let out = table(
            &["Worker", "Total Issued"],
            vec![
                vec!["Anna".to_string(), "3".to_string()],
                vec!["Bartholomew".to_string(), "12".to_string()],
            ],
        );
        let expected = "\
Worker       Total Issued
-----------  ------------
Anna         3
Bartholomew  12";
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_listings_say_so() {
        assert_eq!(format_human(&Output::Names(vec![])), "(none)");
        assert_eq!(format_human(&Output::Stock(vec![])), "(no stock)");
        assert_eq!(format_human(&Output::Log(vec![])), "(no entries)");
    }

    #[test]
    fn json_mode_renders_structured_values() {
        let out = format_output(
            &Output::Exported {
                path: PathBuf::from("out.csv"),
                rows: 2,
            },
            OutputMode::Json,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({ "exported": "out.csv", "rows": 2 }));

        let names = format_output(&Output::Names(vec!["Jacket".to_string()]), OutputMode::Json).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&names).unwrap(), json!(["Jacket"]));
    }

    #[test]
    fn errors_are_prefixed_or_wrapped() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(format_error(&err, OutputMode::Human), "(error) boom");
        let json_err: Value = serde_json::from_str(&format_error(&err, OutputMode::Json)).unwrap();
        assert_eq!(json_err, json!({ "error": "boom" }));
    }
}
