//! # Compensation Calculator
//!
//! The single-record law:
//!
//! 1. Validate salary > 0, midpoint > 0, rating within the tenant's scale,
//!    tenure ≥ 0.
//! 2. `compa_ratio = round6(salary / midpoint)`.
//! 3. Resolve the bucket from the rating.
//! 4. Look up the matrix band containing the ratio.
//! 5. Pick the below-tenure or at-or-above-tenure percentage.
//! 6. `new_salary = round2(salary × (1 + pct / 100))`.
//!
//! The batch path shares [`evaluate`] with [`MissingCellPolicy::ZeroIncrease`]
//! so both paths compute identically wherever a band exists.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use compa_core::{
    round_currency, round_ratio, InputField, PerformanceBucket, PerformanceRatingScale,
    RatingScaleConverter, TenantContext, ValidationError,
};
use compa_matrix::{AdjustmentMatrixStore, CompaRange, MatrixError};

use crate::error::CalculationError;

/// Salaries above this multiple of the midpoint are logged.
const HIGH_COMPA_MULTIPLE: i64 = 3;

/// One employee's inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub current_salary: Decimal,
    pub mid_of_scale: Decimal,
    pub performance_rating: i64,
    pub tenure_years: i64,
}

impl CalculationInput {
    /// Check every field against the tenant's scale.
    pub fn validate(&self, scale: PerformanceRatingScale) -> Result<(), ValidationError> {
        if self.current_salary <= Decimal::ZERO {
            return Err(ValidationError::new(
                InputField::CurrentSalary,
                "Current salary must be positive",
            ));
        }
        if self.mid_of_scale <= Decimal::ZERO {
            return Err(ValidationError::new(
                InputField::MidOfScale,
                "Mid of scale must be positive",
            ));
        }
        RatingScaleConverter::bucket_of(self.performance_rating, scale)?;
        if self.tenure_years < 0 {
            return Err(ValidationError::new(
                InputField::YearsOfExperience,
                "Years of experience cannot be negative",
            ));
        }
        Ok(())
    }
}

/// The computed adjustment for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// `salary / midpoint`, 6 places.
    pub compa_ratio: Decimal,
    pub bucket: PerformanceBucket,
    /// Matched band, absent when no band covered the ratio.
    pub band: Option<CompaRange>,
    pub band_label: Option<String>,
    pub increase_percent: Decimal,
    /// 2 places.
    pub new_salary: Decimal,
    /// `new_salary - current_salary`, 2 places.
    pub increase_amount: Decimal,
}

/// What to do when no matrix band contains the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCellPolicy {
    /// Return `NoMatrixCell`.
    Fail,
    /// Apply a zero increase.
    ZeroIncrease,
}

/// A computed result plus whether the zero-increase fallback was used.
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
    pub result: CalculationResult,
    pub missing_cell: bool,
}

/// Shared computation behind both the single-record and batch paths.
pub(crate) fn evaluate(
    matrix: &AdjustmentMatrixStore,
    ctx: &TenantContext,
    input: &CalculationInput,
    policy: MissingCellPolicy,
) -> Result<Evaluation, CalculationError> {
    input.validate(ctx.scale)?;

    let compa_ratio = input
        .current_salary
        .checked_div(input.mid_of_scale)
        .map(round_ratio)
        .ok_or_else(|| {
            ValidationError::new(
                InputField::CurrentSalary,
                "Current salary is too large relative to mid of scale",
            )
        })?;
    let bucket = RatingScaleConverter::bucket_of(input.performance_rating, ctx.scale)
        .map_err(ValidationError::from)?;

    let (band, percent, missing_cell) =
        match matrix.lookup(&ctx.tenant_id, bucket, compa_ratio) {
            Ok(row) => (Some(row.range()), row.percent_for_tenure(input.tenure_years), false),
            Err(MatrixError::NoMatrixCell { .. }) if policy == MissingCellPolicy::ZeroIncrease => {
                (None, Decimal::ZERO, true)
            }
            Err(e) => return Err(e.into()),
        };

    let too_large = || {
        ValidationError::new(
            InputField::CurrentSalary,
            "Current salary is too large to apply the increase",
        )
    };
    let new_salary = (percent / Decimal::ONE_HUNDRED)
        .checked_add(Decimal::ONE)
        .and_then(|factor| input.current_salary.checked_mul(factor))
        .map(round_currency)
        .ok_or_else(too_large)?;
    let increase_amount = new_salary
        .checked_sub(input.current_salary)
        .map(round_currency)
        .ok_or_else(too_large)?;

    Ok(Evaluation {
        result: CalculationResult {
            compa_ratio,
            bucket,
            band_label: band.map(|b| b.label()),
            band,
            increase_percent: percent,
            new_salary,
            increase_amount,
        },
        missing_cell,
    })
}

/// Single-record calculator.
#[derive(Debug, Clone)]
pub struct CompensationCalculator {
    matrix: Arc<AdjustmentMatrixStore>,
}

impl CompensationCalculator {
    pub fn new(matrix: Arc<AdjustmentMatrixStore>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &AdjustmentMatrixStore {
        &self.matrix
    }

    /// Compute one employee's adjustment.
    ///
    /// # Errors
    ///
    /// - [`CalculationError::Validation`] naming the bad field. No lookup is made.
    /// - [`CalculationError::Matrix`] with `NoMatrixCell` when no band covers
    ///   the ratio.
    pub fn calculate(
        &self,
        ctx: &TenantContext,
        input: &CalculationInput,
    ) -> Result<CalculationResult, CalculationError> {
        let high_compa = input.mid_of_scale > Decimal::ZERO
            && input
                .mid_of_scale
                .checked_mul(Decimal::from(HIGH_COMPA_MULTIPLE))
                .map_or(false, |limit| input.current_salary > limit);
        if high_compa {
            tracing::warn!(
                tenant = %ctx.tenant_id,
                salary = %input.current_salary,
                midpoint = %input.mid_of_scale,
                "current salary exceeds three times the midpoint"
            );
        }

        let evaluation = evaluate(&self.matrix, ctx, input, MissingCellPolicy::Fail)?;
        let result = evaluation.result;
        tracing::debug!(
            tenant = %ctx.tenant_id,
            compa_ratio = %result.compa_ratio,
            bucket = %result.bucket,
            percent = %result.increase_percent,
            "calculated adjustment"
        );
        Ok(result)
    }
}
