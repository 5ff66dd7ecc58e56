//! # Batch Processor
//!
//! Runs an upload through the batch lifecycle.
//!
//! ## Per row
//!
//! 1. Parse the required cells. A missing or unparsable cell fails the row
//!    with a message naming the field and the 1-based row number.
//! 2. On a three-point tenant, clamp ratings 4 and 5 to 3 and warn.
//! 3. Compute with the single-record law, except that a missing matrix band
//!    yields a zero increase and a warning.
//!
//! Rows are independent and computed on a bounded rayon pool. Results are
//! collected in source order.
//!
//! ## Persistence
//!
//! One call replaces every stored result of the tenant with the computed
//! rows of this run, under the tenant's lock. Different tenants never
//! contend. A failed call leaves the previous results untouched and
//! rejects the run.

use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use compa_core::{InputField, RatingScaleConverter, TenantContext, TenantLocks};
use compa_matrix::AdjustmentMatrixStore;

use crate::batch::record::{BatchRecord, PendingRow, RawRow, RowError, RowOutcome, RowWarning};
use crate::batch::run::BatchRun;
use crate::calculator::{evaluate, CalculationInput, CalculationResult, MissingCellPolicy};
use crate::config::EngineConfig;
use crate::error::{BatchError, CalculationError};
use crate::results::{ResultRepository, StoredResult};
use crate::upload::{decode_sheet, Sheet};

/// Processes uploads for any tenant.
pub struct BatchProcessor {
    matrix: Arc<AdjustmentMatrixStore>,
    results: Arc<dyn ResultRepository>,
    locks: TenantLocks,
    pool: rayon::ThreadPool,
    config: EngineConfig,
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl BatchProcessor {
    /// Build a processor with its own worker pool.
    pub fn new(
        matrix: Arc<AdjustmentMatrixStore>,
        results: Arc<dyn ResultRepository>,
        config: EngineConfig,
    ) -> Result<Self, BatchError> {
        config
            .validate()
            .map_err(|e| BatchError::WorkerPool(e.to_string()))?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("compa-worker-{i}"))
            .build()
            .map_err(|e| BatchError::WorkerPool(e.to_string()))?;
        Ok(Self {
            matrix,
            results,
            locks: TenantLocks::new(),
            pool,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn results(&self) -> &dyn ResultRepository {
        self.results.as_ref()
    }

    /// Decode and process an uploaded sheet.
    ///
    /// # Errors
    ///
    /// - [`BatchError::MalformedUpload`] before any row is computed.
    /// - [`BatchError::TooManyRows`] before any row is computed.
    /// - [`BatchError::Persistence`] if the replace failed; prior results stand.
    pub fn process_sheet(&self, ctx: &TenantContext, sheet: &Sheet) -> Result<BatchRun, BatchError> {
        let mut run = BatchRun::accept(ctx);
        run.begin_validation()?;
        match decode_sheet(sheet) {
            Ok(rows) => self.run_rows(ctx, run, rows),
            Err(e) => {
                run.reject(&e.to_string())?;
                tracing::warn!(tenant = %ctx.tenant_id, batch = %run.batch_id, error = %e, "rejected upload");
                Err(e)
            }
        }
    }

    /// Process rows that were decoded elsewhere.
    pub fn process_rows(
        &self,
        ctx: &TenantContext,
        rows: Vec<PendingRow>,
    ) -> Result<BatchRun, BatchError> {
        let mut run = BatchRun::accept(ctx);
        run.begin_validation()?;
        self.run_rows(ctx, run, rows)
    }

    fn run_rows(
        &self,
        ctx: &TenantContext,
        mut run: BatchRun,
        rows: Vec<PendingRow>,
    ) -> Result<BatchRun, BatchError> {
        if rows.len() > self.config.max_rows {
            let err = BatchError::TooManyRows {
                count: rows.len(),
                max: self.config.max_rows,
            };
            run.reject(&err.to_string())?;
            tracing::warn!(tenant = %ctx.tenant_id, batch = %run.batch_id, error = %err, "rejected upload");
            return Err(err);
        }

        run.begin_computing(rows.len())?;
        tracing::info!(tenant = %ctx.tenant_id, batch = %run.batch_id, rows = rows.len(), "computing batch");

        let records: Vec<BatchRecord> = self.pool.install(|| {
            rows.into_par_iter()
                .map(|row| self.process_row(ctx, row))
                .collect()
        });
        run.record(records);

        let stored = stored_results(&run);
        let mut persisted = run.clone();
        persisted.mark_persisted()?;

        let outcome = self.locks.with_lock(&ctx.tenant_id, || {
            self.results
                .replace_for_tenant(&ctx.tenant_id, stored, persisted.clone())
        });

        match outcome {
            Ok(()) => {
                tracing::info!(
                    tenant = %ctx.tenant_id,
                    batch = %persisted.batch_id,
                    total = persisted.total,
                    succeeded = persisted.success_count,
                    failed = persisted.error_count,
                    "batch persisted"
                );
                Ok(persisted)
            }
            Err(e) => {
                run.reject(&e.to_string())?;
                tracing::warn!(tenant = %ctx.tenant_id, batch = %run.batch_id, error = %e, "batch persistence failed");
                Err(BatchError::Persistence(e))
            }
        }
    }

    fn process_row(&self, ctx: &TenantContext, row: PendingRow) -> BatchRecord {
        let outcome = match self.compute_row(ctx, &row) {
            Ok((input, result, warnings)) => RowOutcome::Computed {
                input,
                result,
                warnings,
            },
            Err(error) => {
                tracing::debug!(tenant = %ctx.tenant_id, row = row.row_index, reason = %error, "row failed");
                RowOutcome::Failed { error }
            }
        };
        BatchRecord {
            row_index: row.row_index,
            raw: row.raw,
            outcome,
        }
    }

    fn compute_row(
        &self,
        ctx: &TenantContext,
        row: &PendingRow,
    ) -> Result<(CalculationInput, CalculationResult, Vec<RowWarning>), RowError> {
        let index = row.row_index;
        let raw = &row.raw;

        let text_fields = [
            InputField::EmployeeCode,
            InputField::EmployeeName,
            InputField::JobTitle,
        ];
        for field in text_fields {
            if raw.get(field).is_none() {
                return Err(RowError::missing(index, field));
            }
        }
        let tenure_years = parse_whole(raw, InputField::YearsOfExperience, index)?;
        let rating = parse_whole(raw, InputField::PerformanceRating, index)?;
        let current_salary = parse_amount(raw, InputField::CurrentSalary, index)?;
        let mid_of_scale = parse_amount(raw, InputField::MidOfScale, index)?;

        let mut warnings = Vec::new();
        let (effective, coerced) = RatingScaleConverter::coerce_for_scale(rating, ctx.scale);
        if coerced {
            tracing::debug!(tenant = %ctx.tenant_id, row = index, original = rating, effective, "coerced rating");
            warnings.push(RowWarning::RatingCoerced {
                original: rating,
                effective,
            });
        }

        let input = CalculationInput {
            current_salary,
            mid_of_scale,
            performance_rating: effective,
            tenure_years,
        };
        let evaluation = evaluate(&self.matrix, ctx, &input, MissingCellPolicy::ZeroIncrease)
            .map_err(|e| row_error_from(index, e))?;
        if evaluation.missing_cell {
            warnings.push(RowWarning::NoMatrixCell {
                bucket: evaluation.result.bucket,
                compa_ratio: evaluation.result.compa_ratio,
            });
        }
        Ok((input, evaluation.result, warnings))
    }
}

fn row_error_from(index: usize, err: CalculationError) -> RowError {
    match err {
        CalculationError::Validation(v) => {
            RowError::new(index, Some(v.field), format!("{} at row {index}", v.message))
        }
        CalculationError::Matrix(m) => RowError::new(index, None, format!("{m} at row {index}")),
    }
}

fn required<'a>(raw: &'a RawRow, field: InputField, index: usize) -> Result<&'a str, RowError> {
    raw.get(field).ok_or_else(|| RowError::missing(index, field))
}

/// Parse a decimal cell, tolerating thousands separators.
fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(&text.replace(',', "")).ok()
}

fn parse_amount(raw: &RawRow, field: InputField, index: usize) -> Result<Decimal, RowError> {
    let text = required(raw, field, index)?;
    parse_decimal(text).ok_or_else(|| RowError::unparsable(index, field, "a number"))
}

/// Parse a whole-number cell. `"5.0"` is accepted as 5.
fn parse_whole(raw: &RawRow, field: InputField, index: usize) -> Result<i64, RowError> {
    let text = required(raw, field, index)?;
    let value = parse_decimal(text).ok_or_else(|| RowError::unparsable(index, field, "a number"))?;
    if !value.fract().is_zero() {
        return Err(RowError::unparsable(index, field, "a whole number"));
    }
    value
        .to_i64()
        .ok_or_else(|| RowError::unparsable(index, field, "a whole number"))
}

fn stored_results(run: &BatchRun) -> Vec<StoredResult> {
    run.records
        .iter()
        .filter_map(|record| match &record.outcome {
            RowOutcome::Computed { input, result, .. } => Some(StoredResult {
                batch_id: run.batch_id,
                tenant_id: run.tenant_id.clone(),
                row_index: record.row_index,
                employee_code: record.raw.employee_code.clone().unwrap_or_default(),
                employee_name: record.raw.employee_name.clone(),
                job_title: record.raw.job_title.clone(),
                input: input.clone(),
                result: result.clone(),
            }),
            RowOutcome::Failed { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::InMemoryResultRepository;
    use compa_core::{PerformanceRatingScale, TenantId};

    fn row(index: usize, cells: [&str; 7]) -> PendingRow {
        let cells: Vec<Option<String>> = cells.iter().map(|c| Some(c.to_string())).collect();
        PendingRow::new(index, RawRow::from_cells(&cells))
    }

    fn processor(ctx: &TenantContext) -> BatchProcessor {
        let matrix = AdjustmentMatrixStore::in_memory();
        matrix.seed_defaults(&ctx.tenant_id).unwrap();
        BatchProcessor::new(
            Arc::new(matrix),
            Arc::new(InMemoryResultRepository::new()),
            EngineConfig {
                worker_threads: 2,
                max_rows: 100,
            },
        )
        .unwrap()
    }

    fn ctx(scale: PerformanceRatingScale) -> TenantContext {
        TenantContext::new(TenantId::new("acme").unwrap(), scale)
    }

    #[test]
    fn test_parse_whole_accepts_integral_decimal() {
        let raw = RawRow::from_cells(&[
            Some("E1".into()),
            None,
            None,
            Some("5.0".into()),
            Some("4.5".into()),
        ]);
        assert_eq!(parse_whole(&raw, InputField::YearsOfExperience, 1).unwrap(), 5);
        let err = parse_whole(&raw, InputField::PerformanceRating, 1).unwrap_err();
        assert_eq!(err.reason, "Performance Rating must be a whole number at row 1");
    }

    #[test]
    fn test_parse_amount_strips_separators() {
        let raw = RawRow::from_cells(&[
            Some("E1".into()),
            None,
            None,
            None,
            None,
            Some("60,000.50".into()),
            Some("abc".into()),
        ]);
        assert_eq!(
            parse_amount(&raw, InputField::CurrentSalary, 2).unwrap(),
            Decimal::from_str("60000.50").unwrap()
        );
        let err = parse_amount(&raw, InputField::MidOfScale, 2).unwrap_err();
        assert_eq!(err.field, Some(InputField::MidOfScale));
    }

    #[test]
    fn test_rating_coercion_warns_on_three_point() {
        let ctx = ctx(PerformanceRatingScale::ThreePoint);
        let run = processor(&ctx)
            .process_rows(
                &ctx,
                vec![row(1, ["E1", "Ada", "Eng", "6", "5", "60000", "100000"])],
            )
            .unwrap();
        let record = &run.records[0];
        assert!(record.is_computed());
        assert_eq!(
            record.warnings(),
            &[RowWarning::RatingCoerced {
                original: 5,
                effective: 3
            }]
        );
        assert_eq!(record.result().unwrap().increase_percent, Decimal::from(25));
    }

    #[test]
    fn test_no_matrix_cell_gives_zero_increase_with_warning() {
        let ctx = ctx(PerformanceRatingScale::FivePoint);
        let run = processor(&ctx)
            .process_rows(
                &ctx,
                vec![row(1, ["E1", "Ada", "Eng", "1", "3", "70500", "100000"])],
            )
            .unwrap();
        let record = &run.records[0];
        let result = record.result().unwrap();
        assert_eq!(result.increase_percent, Decimal::ZERO);
        assert_eq!(result.new_salary, Decimal::from(70500));
        assert_eq!(result.band_label, None);
        assert!(matches!(record.warnings()[0], RowWarning::NoMatrixCell { .. }));
    }

    #[test]
    fn test_out_of_scale_rating_fails_row() {
        let ctx = ctx(PerformanceRatingScale::FivePoint);
        let run = processor(&ctx)
            .process_rows(
                &ctx,
                vec![row(4, ["E1", "Ada", "Eng", "1", "9", "50000", "100000"])],
            )
            .unwrap();
        let error = run.records[0].error().unwrap();
        assert_eq!(error.field, Some(InputField::PerformanceRating));
        assert!(error.reason.ends_with("at row 4"));
    }

    #[test]
    fn test_too_many_rows_rejected_before_compute() {
        let ctx = ctx(PerformanceRatingScale::FivePoint);
        let matrix = AdjustmentMatrixStore::in_memory();
        matrix.seed_defaults(&ctx.tenant_id).unwrap();
        let results = Arc::new(InMemoryResultRepository::new());
        let processor = BatchProcessor::new(
            Arc::new(matrix),
            results.clone(),
            EngineConfig {
                worker_threads: 1,
                max_rows: 2,
            },
        )
        .unwrap();
        let rows = (1..=3)
            .map(|i| row(i, ["E", "N", "T", "1", "3", "50000", "100000"]))
            .collect();
        let err = processor.process_rows(&ctx, rows).unwrap_err();
        assert!(matches!(err, BatchError::TooManyRows { count: 3, max: 2 }));
        assert!(results.latest_run(&ctx.tenant_id).unwrap().is_none());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = BatchProcessor::new(
            Arc::new(AdjustmentMatrixStore::in_memory()),
            Arc::new(InMemoryResultRepository::new()),
            EngineConfig {
                worker_threads: 0,
                max_rows: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::WorkerPool(_)));
    }
}
