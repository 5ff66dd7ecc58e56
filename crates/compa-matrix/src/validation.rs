//! # Matrix Validation Service
//!
//! Whole-matrix checks run before an admin saves an edited matrix.
//!
//! Errors block the save:
//! - a bucket with no active rows,
//! - two active rows of one bucket with overlapping ranges.
//!
//! Warnings are advisory:
//! - gaps between consecutive bands of a bucket,
//! - a bucket that starts above 0.00 or ends below 2.00,
//! - a percentage column that rises and falls as compa-ratio increases,
//! - a higher bucket averaging less than the bucket below it,
//! - any percentage above 50.
//!
//! A matrix with warnings can still be saved, and lookups against it may
//! still return `NoMatrixCell` for ratios that fall in a gap.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use compa_core::{round_half_up, PerformanceBucket};

use crate::row::{AdjustmentMatrixRow, MatrixRowDraft};

fn coverage_floor() -> Decimal {
    Decimal::ZERO
}

fn coverage_ceiling() -> Decimal {
    Decimal::new(2, 0)
}

fn extreme_percent() -> Decimal {
    Decimal::new(50, 0)
}

// ─── Report ──────────────────────────────────────────────────────────

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    EmptyBucket,
    OverlappingRange,
    CoverageGap,
    CoverageBounds,
    NonMonotonicTrend,
    CrossBucketInversion,
    ExtremePercentage,
}

impl IssueKind {
    /// Whether findings of this kind block a save.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::EmptyBucket | Self::OverlappingRange)
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixIssue {
    pub kind: IssueKind,
    pub bucket: Option<PerformanceBucket>,
    pub message: String,
}

/// Result of validating a proposed matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixValidationReport {
    pub is_valid: bool,
    pub total_rows: usize,
    pub errors: Vec<MatrixIssue>,
    pub warnings: Vec<MatrixIssue>,
    pub summary: String,
}

impl MatrixValidationReport {
    fn from_issues(total_rows: usize, issues: Vec<MatrixIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(|issue| issue.kind.is_error());
        let summary = if !errors.is_empty() {
            format!(
                "\u{2717} Matrix configuration has {} error(s) and {} warning(s)",
                errors.len(),
                warnings.len()
            )
        } else if !warnings.is_empty() {
            format!(
                "\u{26a0} Matrix configuration is valid with {} warning(s)",
                warnings.len()
            )
        } else {
            "\u{2713} Matrix configuration is valid".to_string()
        };
        Self {
            is_valid: errors.is_empty(),
            total_rows,
            errors,
            warnings,
            summary,
        }
    }

    pub fn warnings_of(&self, kind: IssueKind) -> impl Iterator<Item = &MatrixIssue> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

// ─── Service ─────────────────────────────────────────────────────────

/// Stateless checker over a full matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixValidationService;

impl MatrixValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Validate the active rows of a stored matrix.
    pub fn validate_rows(&self, rows: &[AdjustmentMatrixRow]) -> MatrixValidationReport {
        let drafts: Vec<_> = rows
            .iter()
            .filter(|row| row.active)
            .map(AdjustmentMatrixRow::to_draft)
            .collect();
        self.validate(&drafts)
    }

    /// Validate a proposed set of rows.
    pub fn validate(&self, drafts: &[MatrixRowDraft]) -> MatrixValidationReport {
        let mut issues = Vec::new();
        let mut averages = Vec::new();

        for bucket in PerformanceBucket::ALL {
            let mut rows: Vec<&MatrixRowDraft> =
                drafts.iter().filter(|d| d.bucket == bucket).collect();
            rows.sort_by(|a, b| a.compa_from.cmp(&b.compa_from));

            if rows.is_empty() {
                issues.push(issue(
                    IssueKind::EmptyBucket,
                    Some(bucket),
                    format!("Performance bucket {bucket} has no matrices"),
                ));
                continue;
            }

            check_overlaps(bucket, &rows, &mut issues);
            check_gaps(bucket, &rows, &mut issues);
            check_coverage(bucket, &rows, &mut issues);
            check_trend(bucket, &rows, &mut issues);
            if let Some(avg) = column_averages(&rows) {
                averages.push((bucket, avg));
            }
        }

        check_cross_bucket(&averages, &mut issues);
        check_extremes(drafts, &mut issues);

        let report = MatrixValidationReport::from_issues(drafts.len(), issues);
        tracing::debug!(
            rows = report.total_rows,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated adjustment matrix"
        );
        report
    }
}

fn issue(kind: IssueKind, bucket: Option<PerformanceBucket>, message: String) -> MatrixIssue {
    MatrixIssue {
        kind,
        bucket,
        message,
    }
}

fn check_overlaps(bucket: PerformanceBucket, rows: &[&MatrixRowDraft], issues: &mut Vec<MatrixIssue>) {
    for (i, a) in rows.iter().enumerate() {
        for b in &rows[i + 1..] {
            if a.range().overlaps(&b.range()) {
                issues.push(issue(
                    IssueKind::OverlappingRange,
                    Some(bucket),
                    format!(
                        "Performance bucket {bucket}: range {} overlaps {}",
                        a.range(),
                        b.range()
                    ),
                ));
            }
        }
    }
}

fn check_gaps(bucket: PerformanceBucket, rows: &[&MatrixRowDraft], issues: &mut Vec<MatrixIssue>) {
    for pair in rows.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.compa_to < next.compa_from {
            issues.push(issue(
                IssueKind::CoverageGap,
                Some(bucket),
                format!(
                    "Performance bucket {bucket}: gap between {} and {}",
                    current.compa_to, next.compa_from
                ),
            ));
        }
    }
}

fn check_coverage(bucket: PerformanceBucket, rows: &[&MatrixRowDraft], issues: &mut Vec<MatrixIssue>) {
    let start = rows.iter().map(|r| r.compa_from).min();
    let end = rows.iter().map(|r| r.compa_to).max();
    if let Some(start) = start.filter(|s| *s > coverage_floor()) {
        issues.push(issue(
            IssueKind::CoverageBounds,
            Some(bucket),
            format!("Performance bucket {bucket}: coverage starts at {start}, not 0.00"),
        ));
    }
    if let Some(end) = end.filter(|e| *e < coverage_ceiling()) {
        issues.push(issue(
            IssueKind::CoverageBounds,
            Some(bucket),
            format!("Performance bucket {bucket}: coverage ends at {end}, below 2.00"),
        ));
    }
}

/// Whether a sequence both rises and falls. Flat steps are ignored.
fn changes_direction(values: &[Decimal]) -> bool {
    let mut direction: Option<Ordering> = None;
    for pair in values.windows(2) {
        let step = pair[1].cmp(&pair[0]);
        if step == Ordering::Equal {
            continue;
        }
        match direction {
            None => direction = Some(step),
            Some(d) if d != step => return true,
            Some(_) => {}
        }
    }
    false
}

fn check_trend(bucket: PerformanceBucket, rows: &[&MatrixRowDraft], issues: &mut Vec<MatrixIssue>) {
    let below: Vec<_> = rows.iter().map(|r| r.pct_below_tenure).collect();
    let at_or_above: Vec<_> = rows.iter().map(|r| r.pct_at_or_above_tenure).collect();
    for (column, values) in [("below-tenure", below), ("at-or-above-tenure", at_or_above)] {
        if changes_direction(&values) {
            issues.push(issue(
                IssueKind::NonMonotonicTrend,
                Some(bucket),
                format!(
                    "Performance bucket {bucket}: {column} percentages do not move in one direction as compa-ratio increases"
                ),
            ));
        }
    }
}

/// Mean of each percentage column. `None` if a column sum overflows.
fn column_averages(rows: &[&MatrixRowDraft]) -> Option<(Decimal, Decimal)> {
    let n = Decimal::from(rows.len());
    let sum = |pick: fn(&MatrixRowDraft) -> Decimal| {
        rows.iter()
            .try_fold(Decimal::ZERO, |acc, row| acc.checked_add(pick(row)))
    };
    let below = sum(|r| r.pct_below_tenure)?;
    let at_or_above = sum(|r| r.pct_at_or_above_tenure)?;
    Some((below.checked_div(n)?, at_or_above.checked_div(n)?))
}

fn check_cross_bucket(
    averages: &[(PerformanceBucket, (Decimal, Decimal))],
    issues: &mut Vec<MatrixIssue>,
) {
    for (bucket, (below, at_or_above)) in averages {
        let Some(higher) = bucket.next() else {
            continue;
        };
        let Some((_, (h_below, h_at_or_above))) = averages.iter().find(|(b, _)| *b == higher)
        else {
            continue;
        };
        for (column, lower_avg, higher_avg) in [
            ("below-tenure", below, h_below),
            ("at-or-above-tenure", at_or_above, h_at_or_above),
        ] {
            if higher_avg < lower_avg {
                issues.push(issue(
                    IssueKind::CrossBucketInversion,
                    Some(higher),
                    format!(
                        "Performance bucket {higher} averages {}% {column}, less than bucket {bucket} at {}%",
                        round_half_up(*higher_avg, 2),
                        round_half_up(*lower_avg, 2)
                    ),
                ));
            }
        }
    }
}

fn check_extremes(drafts: &[MatrixRowDraft], issues: &mut Vec<MatrixIssue>) {
    for draft in drafts {
        let highest = draft.pct_below_tenure.max(draft.pct_at_or_above_tenure);
        if highest > extreme_percent() {
            issues.push(issue(
                IssueKind::ExtremePercentage,
                Some(draft.bucket),
                format!(
                    "Performance bucket {}: range {} grants {highest}%, above 50%",
                    draft.bucket,
                    draft.range()
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_drafts;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn draft(bucket: u8, from: &str, to: &str, lt5: &str, gte5: &str) -> MatrixRowDraft {
        MatrixRowDraft {
            bucket: PerformanceBucket::try_from(bucket).unwrap(),
            compa_from: d(from),
            compa_to: d(to),
            pct_below_tenure: d(lt5),
            pct_at_or_above_tenure: d(gte5),
        }
    }

    fn full(bucket: u8, lt5: &str, gte5: &str) -> MatrixRowDraft {
        draft(bucket, "0.00", "9.99", lt5, gte5)
    }

    #[test]
    fn test_defaults_are_valid_with_only_gap_warnings() {
        let report = MatrixValidationService::new().validate(&default_drafts());
        assert!(report.is_valid);
        assert_eq!(report.total_rows, 18);
        assert!(report.errors.is_empty());
        assert!(report
            .warnings
            .iter()
            .all(|w| w.kind == IssueKind::CoverageGap));
        // 0.70→0.71, 0.85→0.86, 1.15→1.16 in each bucket.
        assert_eq!(report.warnings.len(), 9);
        assert!(report.summary.starts_with('\u{26a0}'));
    }

    #[test]
    fn test_clean_matrix_summary() {
        let report = MatrixValidationService::new().validate(&[
            full(1, "2", "3"),
            full(2, "4", "5"),
            full(3, "6", "7"),
        ]);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
        assert_eq!(report.summary, "\u{2713} Matrix configuration is valid");
    }

    #[test]
    fn test_empty_bucket_is_error() {
        let report = MatrixValidationService::new().validate(&[full(1, "2", "3"), full(3, "6", "7")]);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, IssueKind::EmptyBucket);
        assert_eq!(report.errors[0].message, "Performance bucket 2 has no matrices");
        assert!(report.summary.starts_with('\u{2717}'));
    }

    #[test]
    fn test_overlap_is_error() {
        let report = MatrixValidationService::new().validate(&[
            full(1, "2", "3"),
            draft(2, "0.00", "0.90", "4", "5"),
            draft(2, "0.80", "9.99", "3", "4"),
            full(3, "6", "7"),
        ]);
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == IssueKind::OverlappingRange
                && e.bucket == Some(PerformanceBucket::Middle)));
    }

    #[test]
    fn test_coverage_bounds_warned() {
        let report = MatrixValidationService::new().validate(&[
            draft(1, "0.50", "1.50", "2", "3"),
            full(2, "4", "5"),
            full(3, "6", "7"),
        ]);
        assert!(report.is_valid);
        assert_eq!(report.warnings_of(IssueKind::CoverageBounds).count(), 2);
    }

    #[test]
    fn test_non_monotonic_trend_warned() {
        let report = MatrixValidationService::new().validate(&[
            draft(1, "0.00", "1.00", "2", "3"),
            draft(1, "1.00", "1.50", "5", "3"),
            draft(1, "1.50", "9.99", "1", "3"),
            full(2, "4", "5"),
            full(3, "6", "7"),
        ]);
        let trend: Vec<_> = report.warnings_of(IssueKind::NonMonotonicTrend).collect();
        assert_eq!(trend.len(), 1);
        assert!(trend[0].message.contains("below-tenure"));
    }

    #[test]
    fn test_cross_bucket_inversion_warned() {
        let report = MatrixValidationService::new().validate(&[
            full(1, "10", "12"),
            full(2, "4", "5"),
            full(3, "6", "7"),
        ]);
        let inversions: Vec<_> = report.warnings_of(IssueKind::CrossBucketInversion).collect();
        assert_eq!(inversions.len(), 2);
        assert!(inversions
            .iter()
            .all(|w| w.bucket == Some(PerformanceBucket::Middle)));
    }

    #[test]
    fn test_extreme_percentage_warned() {
        let report = MatrixValidationService::new().validate(&[
            full(1, "2", "3"),
            full(2, "4", "5"),
            full(3, "6", "55"),
        ]);
        assert_eq!(report.warnings_of(IssueKind::ExtremePercentage).count(), 1);
        assert!(report.is_valid);
    }

    #[test]
    fn test_huge_percentages_do_not_overflow_averages() {
        let huge = "50000000000000000000000000000";
        let report = MatrixValidationService::new().validate(&[
            draft(1, "0.00", "0.50", huge, "1"),
            draft(1, "0.51", "9.99", huge, "1"),
            full(2, "4", "5"),
            full(3, "6", "7"),
        ]);
        assert_eq!(report.warnings_of(IssueKind::ExtremePercentage).count(), 2);
        assert!(report.is_valid);
    }

    #[test]
    fn test_inactive_rows_ignored() {
        let tenant = compa_core::TenantId::new("acme").unwrap();
        let mut rows: Vec<_> = default_drafts()
            .into_iter()
            .map(|d| d.into_row(tenant.clone()))
            .collect();
        for row in rows.iter_mut().filter(|r| r.bucket == PerformanceBucket::Low) {
            row.active = false;
        }
        let report = MatrixValidationService::new().validate_rows(&rows);
        assert_eq!(report.total_rows, 12);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_changes_direction() {
        assert!(!changes_direction(&[d("21"), d("17"), d("17"), d("0")]));
        assert!(!changes_direction(&[d("1"), d("2"), d("3")]));
        assert!(changes_direction(&[d("1"), d("3"), d("2")]));
    }
}
