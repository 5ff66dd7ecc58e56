//! Sheet export of processed runs.
//!
//! Layout: the seven input columns, then [`RESULT_COLUMNS`]. A failed row
//! carries [`ERROR_MARKER`] in every computed column and its reason in
//! `Status`. The errors-only export has the input columns plus `Error`, so
//! a corrected sheet can be uploaded again as is.

use compa_core::InputField;

use crate::batch::{BatchRecord, BatchRun, RowOutcome};
use crate::upload::sheet::Sheet;

/// Columns appended after the input columns.
pub const RESULT_COLUMNS: [&str; 6] = [
    "Compa Ratio",
    "Band",
    "Increase %",
    "New Salary",
    "Increase Amount",
    "Status",
];

/// Placeholder written into computed columns of a failed row.
pub const ERROR_MARKER: &str = "ERROR";

const NO_BAND: &str = "N/A";

/// Every record of `run`, in source order.
pub fn encode_run(run: &BatchRun) -> Sheet {
    let mut header = input_header();
    header.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));

    let mut sheet = Sheet::from_text([header]);
    for record in &run.records {
        sheet.push_row(result_row(record));
    }
    sheet
}

/// Only the failed records of `run`, with their reasons.
pub fn encode_errors(run: &BatchRun) -> Sheet {
    let mut header = input_header();
    header.push("Error".to_string());

    let mut sheet = Sheet::from_text([header]);
    for record in run.failed_records() {
        let mut cells = input_cells(record);
        if let Some(error) = record.error() {
            cells.push(Some(error.reason.clone()));
        }
        sheet.push_row(cells);
    }
    sheet
}

fn input_header() -> Vec<String> {
    InputField::ALL.iter().map(|f| f.label().to_string()).collect()
}

fn input_cells(record: &BatchRecord) -> Vec<Option<String>> {
    InputField::ALL
        .iter()
        .map(|f| record.raw.get(*f).map(str::to_string))
        .collect()
}

fn result_row(record: &BatchRecord) -> Vec<Option<String>> {
    let mut cells = input_cells(record);
    match &record.outcome {
        RowOutcome::Computed {
            result, warnings, ..
        } => {
            let status = if warnings.is_empty() {
                "OK".to_string()
            } else {
                let notes: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
                format!("OK: {}", notes.join("; "))
            };
            cells.extend([
                Some(result.compa_ratio.to_string()),
                Some(
                    result
                        .band_label
                        .clone()
                        .unwrap_or_else(|| NO_BAND.to_string()),
                ),
                Some(result.increase_percent.normalize().to_string()),
                Some(result.new_salary.to_string()),
                Some(result.increase_amount.to_string()),
                Some(status),
            ]);
        }
        RowOutcome::Failed { error } => {
            cells.extend((0..RESULT_COLUMNS.len() - 1).map(|_| Some(ERROR_MARKER.to_string())));
            cells.push(Some(error.reason.clone()));
        }
    }
    cells
}
