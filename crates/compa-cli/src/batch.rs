//! # Batch Subcommand
//!
//! Process an uploaded sheet for a tenant and export the outcome.
//!
//! The sheet is a JSON array of rows, each an array of cells; the first row
//! is the header. Cells may be strings, numbers, booleans or `null`.
//!
//! Exit codes: 0 when every row computed, 2 when some rows failed, 1 when
//! the batch was rejected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;

use compa_core::PerformanceRatingScale;
use compa_engine::{
    encode_errors, encode_run, BatchProcessor, BatchRun, InMemoryResultRepository, Sheet,
    UploadOutcome,
};

use crate::config::CompaConfig;
use crate::matrix::load_store;

/// Arguments for the `compa batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Sheet to process.
    pub input: PathBuf,

    #[arg(long, default_value = "default")]
    pub tenant: String,

    /// Rating scale; the configured default when omitted.
    #[arg(long)]
    pub scale: Option<PerformanceRatingScale>,

    /// Matrix file; the default table when omitted.
    #[arg(long)]
    pub matrix: Option<PathBuf>,

    /// Write every row with its computed columns to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write only the failed rows, ready for correction and re-upload.
    #[arg(long)]
    pub errors: Option<PathBuf>,

    /// Print the full run as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

/// Execute the batch subcommand.
pub fn run_batch(args: &BatchArgs, config: &CompaConfig) -> Result<u8> {
    let ctx = config.tenant_context(&args.tenant, args.scale)?;
    let sheet = read_sheet(&args.input)?;
    let store = load_store(args.matrix.as_deref(), &ctx.tenant_id)?;
    let processor = BatchProcessor::new(
        store,
        Arc::new(InMemoryResultRepository::new()),
        config.engine.clone(),
    )?;

    let run = processor
        .process_sheet(&ctx, &sheet)
        .with_context(|| format!("batch rejected: {}", args.input.display()))?;

    if let Some(path) = &args.output {
        write_sheet(path, &encode_run(&run))?;
    }
    if let Some(path) = &args.errors {
        write_sheet(path, &encode_errors(&run))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", summary(&run));
    }

    Ok(match run.outcome() {
        UploadOutcome::Completed => 0,
        UploadOutcome::Partial | UploadOutcome::Failed => 2,
    })
}

/// Read a JSON sheet, turning every scalar cell into text.
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read sheet: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse sheet: {}", path.display()))?;
    sheet_from_json(value).with_context(|| format!("invalid sheet: {}", path.display()))
}

fn sheet_from_json(value: Value) -> Result<Sheet> {
    let Value::Array(rows) = value else {
        bail!("sheet must be an array of rows");
    };
    let mut grid = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let Value::Array(cells) = row else {
            bail!("row {} is not an array of cells", i + 1);
        };
        let cells = cells
            .into_iter()
            .enumerate()
            .map(|(j, cell)| -> Result<Option<String>> {
                match cell {
                    Value::Null => Ok(None),
                    Value::String(s) => Ok(Some(s)),
                    Value::Number(n) => Ok(Some(n.to_string())),
                    Value::Bool(b) => Ok(Some(b.to_string())),
                    Value::Array(_) | Value::Object(_) => {
                        bail!("cell {} of row {} is not a scalar", j + 1, i + 1)
                    }
                }
            })
            .collect::<Result<Vec<_>>>()?;
        grid.push(cells);
    }
    Ok(Sheet::new(grid))
}

fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let json = serde_json::to_string_pretty(sheet)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = sheet.len(), "wrote sheet");
    Ok(())
}

fn summary(run: &BatchRun) -> String {
    let mut out = format!(
        "{} {} {}: {} rows, {} computed, {} failed\n",
        run.batch_id,
        run.state(),
        run.outcome(),
        run.total,
        run.success_count,
        run.error_count
    );
    for record in run.records.iter() {
        if let Some(error) = record.error() {
            out.push_str(&format!("  row {}: {}\n", record.row_index, error));
        }
        for warning in record.warnings() {
            out.push_str(&format!("  row {}: warning: {}\n", record.row_index, warning));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header() -> Value {
        json!([
            "Employee Code",
            "Employee Name",
            "Job Title",
            "Years of Experience",
            "Performance Rating",
            "Current Salary",
            "Mid of Scale"
        ])
    }

    fn args(input: PathBuf) -> BatchArgs {
        BatchArgs {
            input,
            tenant: "acme".to_string(),
            scale: None,
            matrix: None,
            output: None,
            errors: None,
            json: false,
        }
    }

    #[test]
    fn numeric_cells_become_text() {
        let sheet = sheet_from_json(json!([header(), ["E1", null, "Eng", 6, 5.0, 60000, true]]))
            .unwrap();
        let row = &sheet.rows()[1];
        assert_eq!(row[1], None);
        assert_eq!(row[3].as_deref(), Some("6"));
        assert_eq!(row[4].as_deref(), Some("5.0"));
        assert_eq!(row[6].as_deref(), Some("true"));
    }

    #[test]
    fn nested_cells_rejected() {
        assert!(sheet_from_json(json!([[{"a": 1}]])).is_err());
        assert!(sheet_from_json(json!({"rows": []})).is_err());
    }

    #[test]
    fn partial_batch_writes_exports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("upload.json");
        let sheet = json!([
            header(),
            ["E1", "Ada", "Eng", 6, 5, 60000, 100000],
            ["", "Bob", "Ops", 2, 1, 120000, 100000],
        ]);
        std::fs::write(&input, sheet.to_string()).unwrap();

        let mut args = args(input);
        args.output = Some(dir.path().join("results.json"));
        args.errors = Some(dir.path().join("errors.json"));

        assert_eq!(run_batch(&args, &CompaConfig::default()).unwrap(), 2);

        let results = read_sheet(args.output.as_ref().unwrap()).unwrap();
        assert_eq!(results.data_rows().len(), 2);
        let errors = read_sheet(args.errors.as_ref().unwrap()).unwrap();
        assert_eq!(errors.data_rows().len(), 1);
        assert_eq!(errors.data_rows()[0][1].as_deref(), Some("Bob"));
    }

    #[test]
    fn bad_header_rejects_batch() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("upload.json");
        std::fs::write(&input, json!([["Name"], ["x"]]).to_string()).unwrap();
        let err = run_batch(&args(input), &CompaConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid header at column 1"));
    }
}
