//! Batch rows: raw cells, outcomes, warnings, and row errors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use compa_core::{InputField, PerformanceBucket};

use crate::batch::state::RowState;
use crate::calculator::{CalculationInput, CalculationResult};

/// The seven input cells of one uploaded row, trimmed, blanks as `None`.
///
/// Kept verbatim on every record so failed rows can be exported for
/// correction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub employee_code: Option<String>,
    pub employee_name: Option<String>,
    pub job_title: Option<String>,
    pub years_of_experience: Option<String>,
    pub performance_rating: Option<String>,
    pub current_salary: Option<String>,
    pub mid_of_scale: Option<String>,
}

impl RawRow {
    /// Build from cells in column order. Missing trailing cells are blank.
    pub fn from_cells(cells: &[Option<String>]) -> Self {
        let cell = |field: InputField| {
            cells
                .get(field.column())
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            employee_code: cell(InputField::EmployeeCode),
            employee_name: cell(InputField::EmployeeName),
            job_title: cell(InputField::JobTitle),
            years_of_experience: cell(InputField::YearsOfExperience),
            performance_rating: cell(InputField::PerformanceRating),
            current_salary: cell(InputField::CurrentSalary),
            mid_of_scale: cell(InputField::MidOfScale),
        }
    }

    pub fn get(&self, field: InputField) -> Option<&str> {
        let value = match field {
            InputField::EmployeeCode => &self.employee_code,
            InputField::EmployeeName => &self.employee_name,
            InputField::JobTitle => &self.job_title,
            InputField::YearsOfExperience => &self.years_of_experience,
            InputField::PerformanceRating => &self.performance_rating,
            InputField::CurrentSalary => &self.current_salary,
            InputField::MidOfScale => &self.mid_of_scale,
        };
        value.as_deref()
    }

    /// Cells in column order, blanks as empty strings.
    pub fn to_cells(&self) -> Vec<String> {
        InputField::ALL
            .iter()
            .map(|f| self.get(*f).unwrap_or_default().to_string())
            .collect()
    }

    /// A row whose first three cells are empty carries no record.
    pub fn is_blank(&self) -> bool {
        self.employee_code.is_none() && self.employee_name.is_none() && self.job_title.is_none()
    }
}

/// A decoded row waiting to be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRow {
    /// 1-based position among the upload's data rows.
    pub row_index: usize,
    pub raw: RawRow,
}

impl PendingRow {
    pub fn new(row_index: usize, raw: RawRow) -> Self {
        Self { row_index, raw }
    }

    pub fn state(&self) -> RowState {
        RowState::Pending
    }
}

/// Non-fatal notes attached to a computed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowWarning {
    /// A 4 or 5 on a three-point tenant was treated as 3.
    RatingCoerced { original: i64, effective: i64 },
    /// No band covered the ratio; no increase was applied.
    NoMatrixCell {
        bucket: PerformanceBucket,
        compa_ratio: Decimal,
    },
}

impl std::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RatingCoerced {
                original,
                effective,
            } => write!(
                f,
                "rating {original} is above the 3-point scale and was treated as {effective}"
            ),
            Self::NoMatrixCell {
                bucket,
                compa_ratio,
            } => write!(
                f,
                "no adjustment band covers compa-ratio {compa_ratio} in performance bucket {bucket}; no increase applied"
            ),
        }
    }
}

/// Why a row could not be computed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{reason}")]
pub struct RowError {
    pub row_index: usize,
    /// The offending field, when one field is to blame.
    pub field: Option<InputField>,
    pub reason: String,
}

impl RowError {
    pub fn new(row_index: usize, field: Option<InputField>, reason: impl Into<String>) -> Self {
        Self {
            row_index,
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(row_index: usize, field: InputField) -> Self {
        Self::new(
            row_index,
            Some(field),
            format!("{} is required at row {row_index}", field.label()),
        )
    }

    pub(crate) fn unparsable(row_index: usize, field: InputField, expected: &str) -> Self {
        Self::new(
            row_index,
            Some(field),
            format!("{} must be {expected} at row {row_index}", field.label()),
        )
    }
}

/// What happened to a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Computed {
        /// The effective input after parsing and coercion.
        input: CalculationInput,
        result: CalculationResult,
        warnings: Vec<RowWarning>,
    },
    Failed {
        error: RowError,
    },
}

/// One row of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub row_index: usize,
    pub raw: RawRow,
    pub outcome: RowOutcome,
}

impl BatchRecord {
    pub fn state(&self) -> RowState {
        match self.outcome {
            RowOutcome::Computed { .. } => RowState::Computed,
            RowOutcome::Failed { .. } => RowState::Failed,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.state() == RowState::Computed
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        match &self.outcome {
            RowOutcome::Computed { result, .. } => Some(result),
            RowOutcome::Failed { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[RowWarning] {
        match &self.outcome {
            RowOutcome::Computed { warnings, .. } => warnings.as_slice(),
            RowOutcome::Failed { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&RowError> {
        match &self.outcome {
            RowOutcome::Failed { error } => Some(error),
            RowOutcome::Computed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_from_cells_trims_and_blanks() {
        let raw = RawRow::from_cells(&cells(&[" E001 ", "Ada", "  ", "6", "5", "60000", "100000"]));
        assert_eq!(raw.employee_code.as_deref(), Some("E001"));
        assert_eq!(raw.job_title, None);
        assert_eq!(raw.get(InputField::MidOfScale), Some("100000"));
    }

    #[test]
    fn test_short_rows_pad_with_blanks() {
        let raw = RawRow::from_cells(&cells(&["E001", "Ada"]));
        assert_eq!(raw.current_salary, None);
        assert_eq!(raw.to_cells().len(), 7);
        assert!(!raw.is_blank());
    }

    #[test]
    fn test_blank_row_detection() {
        let raw = RawRow::from_cells(&[None, Some(" ".into()), None, Some("3".into())]);
        assert!(raw.is_blank());
    }

    #[test]
    fn test_row_error_messages() {
        let err = RowError::missing(3, InputField::EmployeeCode);
        assert_eq!(err.to_string(), "Employee Code is required at row 3");
        assert_eq!(err.field, Some(InputField::EmployeeCode));
        let err = RowError::unparsable(7, InputField::CurrentSalary, "a number");
        assert_eq!(err.to_string(), "Current Salary must be a number at row 7");
    }

    #[test]
    fn test_pending_state() {
        assert_eq!(PendingRow::new(1, RawRow::default()).state(), RowState::Pending);
    }

    #[test]
    fn test_warning_display() {
        let w = RowWarning::RatingCoerced {
            original: 5,
            effective: 3,
        };
        assert!(w.to_string().contains("treated as 3"));
    }
}
