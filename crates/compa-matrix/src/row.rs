//! # Matrix Rows
//!
//! A row maps (bucket, compa-ratio range) to two increase percentages, one
//! for employees under the tenure threshold and one for those at or above it.
//!
//! ## Range semantics
//!
//! Ranges are closed on both ends: `from <= ratio <= to`. Two ranges overlap
//! iff `f1 < t2 && f2 < t1`, so bands that share an endpoint (`0.86–1.01` and
//! `1.01–1.15`) may coexist. An upper bound of 9.99 or more marks the open
//! top band and is labelled `"X%+"`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use compa_core::decimal::ratio_as_percent;
use compa_core::{MatrixRowId, PerformanceBucket, TenantId};

use crate::error::MatrixError;

/// Years of experience at which the "at or above tenure" column applies.
pub const TENURE_THRESHOLD_YEARS: i64 = 5;

/// Upper bounds at or above this mark the open top band.
fn open_top_threshold() -> Decimal {
    Decimal::new(999, 2)
}

/// Largest upper bound an admin may enter.
fn max_compa_to() -> Decimal {
    Decimal::new(10, 0)
}

// ─── Compa Range ─────────────────────────────────────────────────────

/// A closed compa-ratio interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompaRange {
    pub from: Decimal,
    pub to: Decimal,
}

impl CompaRange {
    pub fn new(from: Decimal, to: Decimal) -> Self {
        Self { from, to }
    }

    /// Whether `ratio` lies within `[from, to]`.
    pub fn contains(&self, ratio: Decimal) -> bool {
        self.from <= ratio && ratio <= self.to
    }

    /// Whether the two ranges share more than an endpoint.
    pub fn overlaps(&self, other: &CompaRange) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// Whether this is the open-ended top band.
    pub fn is_open_top(&self) -> bool {
        self.to >= open_top_threshold()
    }

    /// Display label: `"130%+"` for the open top band, else `"86%–101%"`.
    pub fn label(&self) -> String {
        if self.is_open_top() {
            format!("{}%+", ratio_as_percent(self.from))
        } else {
            format!(
                "{}%\u{2013}{}%",
                ratio_as_percent(self.from),
                ratio_as_percent(self.to)
            )
        }
    }
}

impl std::fmt::Display for CompaRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Find the first pair of same-bucket ranges that overlap.
///
/// Returns `(bucket, later, earlier)` in input order.
pub fn first_overlap(
    ranges: &[(PerformanceBucket, CompaRange)],
) -> Option<(PerformanceBucket, CompaRange, CompaRange)> {
    ranges.iter().enumerate().find_map(|(i, (bucket, range))| {
        ranges[..i]
            .iter()
            .find(|(b, earlier)| b == bucket && earlier.overlaps(range))
            .map(|(_, earlier)| (*bucket, *range, *earlier))
    })
}

// ─── Draft ───────────────────────────────────────────────────────────

/// The editable content of a matrix row, without identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRowDraft {
    pub bucket: PerformanceBucket,
    pub compa_from: Decimal,
    pub compa_to: Decimal,
    pub pct_below_tenure: Decimal,
    pub pct_at_or_above_tenure: Decimal,
}

impl MatrixRowDraft {
    pub fn range(&self) -> CompaRange {
        CompaRange::new(self.compa_from, self.compa_to)
    }

    /// Check the row's own values.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidRow`] naming the first offending field.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.compa_from < Decimal::ZERO {
            return Err(invalid("compa_from", "must be non-negative"));
        }
        if self.compa_from >= self.compa_to {
            return Err(invalid("compa_from", "must be less than compa_to"));
        }
        if self.compa_to > max_compa_to() {
            return Err(invalid("compa_to", "must not exceed 10"));
        }
        check_percent("pct_below_tenure", self.pct_below_tenure)?;
        check_percent("pct_at_or_above_tenure", self.pct_at_or_above_tenure)?;
        Ok(())
    }

    /// Materialize as an active row with a fresh id.
    pub fn into_row(self, tenant_id: TenantId) -> AdjustmentMatrixRow {
        self.into_row_with_id(tenant_id, MatrixRowId::new())
    }

    pub(crate) fn into_row_with_id(
        self,
        tenant_id: TenantId,
        id: MatrixRowId,
    ) -> AdjustmentMatrixRow {
        AdjustmentMatrixRow {
            id,
            tenant_id,
            bucket: self.bucket,
            compa_from: self.compa_from,
            compa_to: self.compa_to,
            pct_below_tenure: self.pct_below_tenure,
            pct_at_or_above_tenure: self.pct_at_or_above_tenure,
            active: true,
        }
    }
}

fn invalid(field: &'static str, message: &str) -> MatrixError {
    MatrixError::InvalidRow {
        field,
        message: message.to_string(),
    }
}

fn check_percent(field: &'static str, value: Decimal) -> Result<(), MatrixError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(invalid(field, "must be between 0 and 100"));
    }
    Ok(())
}

// ─── Row ─────────────────────────────────────────────────────────────

/// A stored adjustment matrix row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentMatrixRow {
    pub id: MatrixRowId,
    pub tenant_id: TenantId,
    pub bucket: PerformanceBucket,
    /// Inclusive lower bound.
    pub compa_from: Decimal,
    /// Inclusive upper bound; 9.99 or more is the open top band.
    pub compa_to: Decimal,
    /// Increase percentage for tenure below the threshold.
    pub pct_below_tenure: Decimal,
    /// Increase percentage for tenure at or above the threshold.
    pub pct_at_or_above_tenure: Decimal,
    pub active: bool,
}

impl AdjustmentMatrixRow {
    pub fn range(&self) -> CompaRange {
        CompaRange::new(self.compa_from, self.compa_to)
    }

    pub fn label(&self) -> String {
        self.range().label()
    }

    /// The percentage that applies to an employee with `tenure_years`.
    pub fn percent_for_tenure(&self, tenure_years: i64) -> Decimal {
        if tenure_years < TENURE_THRESHOLD_YEARS {
            self.pct_below_tenure
        } else {
            self.pct_at_or_above_tenure
        }
    }

    pub fn to_draft(&self) -> MatrixRowDraft {
        MatrixRowDraft {
            bucket: self.bucket,
            compa_from: self.compa_from,
            compa_to: self.compa_to,
            pct_below_tenure: self.pct_below_tenure,
            pct_at_or_above_tenure: self.pct_at_or_above_tenure,
        }
    }
}
