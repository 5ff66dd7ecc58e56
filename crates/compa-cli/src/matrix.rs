//! # Matrix Subcommand
//!
//! Inspect adjustment matrices.
//!
//! ## Subcommands
//!
//! - `defaults`: Print the default 18-row table for a tenant.
//! - `validate`: Check a matrix file; exits 1 when it has errors.
//! - `lookup`: Resolve the band for a bucket and compa-ratio. The bucket is
//!   shown with its representative rating on the chosen scale.
//!
//! A matrix file is a YAML (or JSON) list of rows with `bucket`,
//! `compa_from`, `compa_to`, `pct_below_tenure`, `pct_at_or_above_tenure`
//! and an optional `active` flag. The output of `defaults` is itself a
//! valid matrix file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;

use compa_core::{PerformanceBucket, PerformanceRatingScale, RatingScaleConverter, TenantId};
use compa_matrix::{
    AdjustmentMatrixRow, AdjustmentMatrixStore, MatrixRowDraft, MatrixValidationService,
};

/// Arguments for the `compa matrix` subcommand.
#[derive(Args, Debug)]
pub struct MatrixArgs {
    #[command(subcommand)]
    pub command: MatrixCommand,
}

/// Matrix subcommands.
#[derive(Subcommand, Debug)]
pub enum MatrixCommand {
    /// Print the default table as seeded for a tenant.
    Defaults {
        #[arg(long, default_value = "default")]
        tenant: String,
        #[arg(long, value_enum, default_value = "yaml")]
        format: MatrixFormat,
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate a matrix file.
    Validate {
        /// Matrix file to check.
        file: PathBuf,
    },

    /// Find the band that applies to a bucket and compa-ratio.
    Lookup {
        #[arg(long, default_value = "default")]
        tenant: String,
        /// Matrix file; the default table when omitted.
        #[arg(long)]
        matrix: Option<PathBuf>,
        /// Performance bucket (1 = low, 3 = high).
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        bucket: u8,
        /// Compa-ratio, e.g. 0.95.
        #[arg(long)]
        ratio: Decimal,
        /// Scale used to display the bucket's rating.
        #[arg(long)]
        scale: Option<PerformanceRatingScale>,
    },
}

/// Serialization format for printed matrices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MatrixFormat {
    Yaml,
    Json,
}

/// Execute the matrix subcommand.
pub fn run_matrix(args: &MatrixArgs) -> Result<u8> {
    match &args.command {
        MatrixCommand::Defaults {
            tenant,
            format,
            out,
        } => cmd_defaults(tenant, *format, out.as_deref()),
        MatrixCommand::Validate { file } => cmd_validate(file),
        MatrixCommand::Lookup {
            tenant,
            matrix,
            bucket,
            ratio,
            scale,
        } => cmd_lookup(
            tenant,
            matrix.as_deref(),
            *bucket,
            *ratio,
            scale.unwrap_or_default(),
        ),
    }
}

// ─── Matrix files ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MatrixFileRow {
    #[serde(flatten)]
    draft: MatrixRowDraft,
    #[serde(default = "active_by_default")]
    active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Read the active rows of a matrix file.
pub fn read_matrix_file(path: &Path) -> Result<Vec<MatrixRowDraft>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read matrix file: {}", path.display()))?;
    let rows: Vec<MatrixFileRow> = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse matrix file: {}", path.display()))?;
    Ok(rows
        .into_iter()
        .filter(|row| row.active)
        .map(|row| row.draft)
        .collect())
}

/// An in-process store holding the tenant's matrix: the file's rows when
/// given, otherwise the default table.
pub fn load_store(path: Option<&Path>, tenant: &TenantId) -> Result<Arc<AdjustmentMatrixStore>> {
    let store = AdjustmentMatrixStore::in_memory();
    match path {
        Some(path) => {
            let drafts = read_matrix_file(path)?;
            store
                .replace_all(tenant, drafts)
                .with_context(|| format!("matrix file rejected: {}", path.display()))?;
        }
        None => {
            store.seed_defaults(tenant)?;
        }
    }
    Ok(Arc::new(store))
}

// ─── Commands ────────────────────────────────────────────────────────

fn cmd_defaults(tenant: &str, format: MatrixFormat, out: Option<&Path>) -> Result<u8> {
    let tenant = TenantId::new(tenant).context("invalid tenant")?;
    let store = load_store(None, &tenant)?;
    let rows = store.list_active(&tenant)?;
    let text = match format {
        MatrixFormat::Yaml => serde_yaml::to_string(&rows)?,
        MatrixFormat::Json => serde_json::to_string_pretty(&rows)?,
    };
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote {} rows to {}", rows.len(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(0)
}

fn cmd_validate(file: &Path) -> Result<u8> {
    let drafts = read_matrix_file(file)?;
    let report = MatrixValidationService::new().validate(&drafts);
    for issue in &report.errors {
        println!("ERROR: {}", issue.message);
    }
    for issue in &report.warnings {
        println!("WARN: {}", issue.message);
    }
    println!("{}", report.summary);
    Ok(if report.is_valid { 0 } else { 1 })
}

fn cmd_lookup(
    tenant: &str,
    matrix: Option<&Path>,
    bucket: u8,
    ratio: Decimal,
    scale: PerformanceRatingScale,
) -> Result<u8> {
    let tenant = TenantId::new(tenant).context("invalid tenant")?;
    let bucket = PerformanceBucket::try_from(bucket).map_err(anyhow::Error::msg)?;
    let store = load_store(matrix, &tenant)?;
    let row = store.lookup(&tenant, bucket, ratio)?;
    println!("{}", describe_lookup(&row, scale));
    Ok(0)
}

fn describe_lookup(row: &AdjustmentMatrixRow, scale: PerformanceRatingScale) -> String {
    format!(
        "bucket {} (rating {} on the {}), band {}: {}% below {} years, {}% at or above",
        row.bucket,
        RatingScaleConverter::representative_rating(row.bucket, scale),
        scale.display_name(),
        row.label(),
        row.pct_below_tenure.normalize(),
        compa_matrix::TENURE_THRESHOLD_YEARS,
        row.pct_at_or_above_tenure.normalize()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("matrix.yaml");
        let code = cmd_defaults("acme", MatrixFormat::Yaml, Some(&out)).unwrap();
        assert_eq!(code, 0);
        let drafts = read_matrix_file(&out).unwrap();
        assert_eq!(drafts.len(), compa_matrix::DEFAULT_ROW_COUNT);
        assert_eq!(cmd_validate(&out).unwrap(), 0);
    }

    #[test]
    fn inactive_rows_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "m.yaml",
            r#"
- bucket: 3
  compa_from: "0.00"
  compa_to: "1.00"
  pct_below_tenure: "10"
  pct_at_or_above_tenure: "12"
- bucket: 3
  compa_from: "0.50"
  compa_to: "0.90"
  pct_below_tenure: "5"
  pct_at_or_above_tenure: "6"
  active: false
"#,
        );
        assert_eq!(read_matrix_file(&path).unwrap().len(), 1);
    }

    #[test]
    fn overlapping_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "bad.yaml",
            r#"
- { bucket: 1, compa_from: "0.00", compa_to: "1.00", pct_below_tenure: "1", pct_at_or_above_tenure: "1" }
- { bucket: 1, compa_from: "0.80", compa_to: "1.20", pct_below_tenure: "1", pct_at_or_above_tenure: "1" }
- { bucket: 2, compa_from: "0.00", compa_to: "9.99", pct_below_tenure: "1", pct_at_or_above_tenure: "1" }
- { bucket: 3, compa_from: "0.00", compa_to: "9.99", pct_below_tenure: "1", pct_at_or_above_tenure: "1" }
"#,
        );
        assert_eq!(cmd_validate(&path).unwrap(), 1);
        let tenant = TenantId::new("acme").unwrap();
        assert!(load_store(Some(&path), &tenant).is_err());
    }

    #[test]
    fn lookup_against_defaults() {
        let five = PerformanceRatingScale::FivePoint;
        let code = cmd_lookup("acme", None, 3, Decimal::from_str("0.60").unwrap(), five).unwrap();
        assert_eq!(code, 0);
        assert!(cmd_lookup("acme", None, 3, Decimal::from_str("0.705").unwrap(), five).is_err());
    }

    #[test]
    fn lookup_shows_representative_rating() {
        let tenant = TenantId::new("acme").unwrap();
        let store = load_store(None, &tenant).unwrap();
        let row = store
            .lookup(&tenant, PerformanceBucket::High, Decimal::from_str("0.60").unwrap())
            .unwrap();

        let five = describe_lookup(&row, PerformanceRatingScale::FivePoint);
        assert!(five.starts_with("bucket 3 (rating 4 on the 5-Point Rating Scale)"));
        assert!(five.contains("21% below 5 years, 25% at or above"));
        let three = describe_lookup(&row, PerformanceRatingScale::ThreePoint);
        assert!(three.contains("(rating 3 on the 3-Point Rating Scale)"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = read_matrix_file(Path::new("/nonexistent/m.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read matrix file"));
    }

    #[test]
    fn run_matrix_dispatches() {
        let args = MatrixArgs {
            command: MatrixCommand::Lookup {
                tenant: "acme".to_string(),
                matrix: None,
                bucket: 2,
                ratio: Decimal::from_str("1.20").unwrap(),
                scale: None,
            },
        };
        assert_eq!(run_matrix(&args).unwrap(), 0);
    }
}
