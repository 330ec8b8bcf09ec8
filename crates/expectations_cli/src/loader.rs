//! CSV loading with per-column type inference.

use anyhow::Result;
use expectations_core::{Batch, Column, DataValue};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Cells read as missing.
const MISSING_MARKERS: [&str; 3] = ["", "NA", "NaN"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Inferred {
    Int,
    Float,
    String,
}

/// Loads a CSV file with a header row into a [`Batch`].
pub fn load_csv(path: &Path) -> Result<Batch> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let batch = read_batch(reader)?;
    debug!(
        rows = batch.row_count(),
        columns = batch.column_count(),
        "Loaded CSV"
    );
    Ok(batch)
}

fn read_batch<R: Read>(mut reader: csv::Reader<R>) -> Result<Batch> {
    let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];

    for record in reader.records() {
        let record = record?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push(cell.to_string());
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Ok(Batch::new(columns)?)
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.iter().any(|marker| cell.eq_ignore_ascii_case(marker))
}

/// All-integer columns stay `Int`; any float widens the column to `Float`;
/// anything else makes it a `String` column.
fn infer_column(name: String, cells: Vec<String>) -> Column {
    let kind = cells
        .iter()
        .filter(|cell| !is_missing(cell))
        .map(|cell| {
            if cell.parse::<i64>().is_ok() {
                Inferred::Int
            } else if cell.parse::<f64>().is_ok() {
                Inferred::Float
            } else {
                Inferred::String
            }
        })
        .max()
        .unwrap_or(Inferred::Int);

    let values = cells.into_iter().map(|cell| {
        if is_missing(&cell) {
            return DataValue::Null;
        }
        match kind {
            Inferred::Int => cell.parse::<i64>().map_or(DataValue::Null, DataValue::Int),
            Inferred::Float => cell.parse::<f64>().map_or(DataValue::Null, DataValue::Float),
            Inferred::String => DataValue::String(cell),
        }
    });

    Column::new(name, values)
}
