//! # Default Matrix
//!
//! The table every tenant starts from: 3 buckets × 6 compa-ratio bands.
//!
//! ```text
//! Bucket   0.00–0.70  0.71–0.85  0.86–1.01  1.01–1.15  1.16–1.30  1.30–9.99
//!   3       21 / 25    17 / 21    12 / 17     8 / 12     6 / 8      0 / 0
//!   2       15 / 17    12 / 17     8 / 12     6 / 8      4 / 6      0 / 0
//!   1        8 / 12     6 / 8      4 / 6      0 / 4      0 / 0      0 / 0
//! ```
//!
//! Cells read `<5 years / ≥5 years` percentages.

use rust_decimal::Decimal;

use compa_core::PerformanceBucket;

use crate::row::MatrixRowDraft;

/// Number of rows in the default table.
pub const DEFAULT_ROW_COUNT: usize = 18;

/// `(bucket, from×100, to×100, pct below tenure, pct at or above tenure)`.
const DEFAULT_TABLE: [(u8, i64, i64, i64, i64); DEFAULT_ROW_COUNT] = [
    (3, 0, 70, 21, 25),
    (3, 71, 85, 17, 21),
    (3, 86, 101, 12, 17),
    (3, 101, 115, 8, 12),
    (3, 116, 130, 6, 8),
    (3, 130, 999, 0, 0),
    (2, 0, 70, 15, 17),
    (2, 71, 85, 12, 17),
    (2, 86, 101, 8, 12),
    (2, 101, 115, 6, 8),
    (2, 116, 130, 4, 6),
    (2, 130, 999, 0, 0),
    (1, 0, 70, 8, 12),
    (1, 71, 85, 6, 8),
    (1, 86, 101, 4, 6),
    (1, 101, 115, 0, 4),
    (1, 116, 130, 0, 0),
    (1, 130, 999, 0, 0),
];

/// The default table as drafts, in seeding order.
pub fn default_drafts() -> Vec<MatrixRowDraft> {
    DEFAULT_TABLE
        .iter()
        .filter_map(|&(bucket, from, to, below, at_or_above)| {
            Some(MatrixRowDraft {
                bucket: PerformanceBucket::try_from(bucket).ok()?,
                compa_from: Decimal::new(from, 2),
                compa_to: Decimal::new(to, 2),
                pct_below_tenure: Decimal::from(below),
                pct_at_or_above_tenure: Decimal::from(at_or_above),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::first_overlap;

    #[test]
    fn test_default_has_eighteen_rows() {
        assert_eq!(default_drafts().len(), DEFAULT_ROW_COUNT);
    }

    #[test]
    fn test_six_rows_per_bucket() {
        let drafts = default_drafts();
        for bucket in PerformanceBucket::ALL {
            assert_eq!(drafts.iter().filter(|d| d.bucket == bucket).count(), 6);
        }
    }

    #[test]
    fn test_defaults_are_valid_and_non_overlapping() {
        let drafts = default_drafts();
        for draft in &drafts {
            draft.validate().unwrap();
        }
        let ranges: Vec<_> = drafts.iter().map(|d| (d.bucket, d.range())).collect();
        assert!(first_overlap(&ranges).is_none());
    }

    #[test]
    fn test_top_band_is_open() {
        let drafts = default_drafts();
        let open: Vec<_> = drafts.iter().filter(|d| d.range().is_open_top()).collect();
        assert_eq!(open.len(), 3);
        assert!(open.iter().all(|d| d.range().label() == "130%+"));
    }

    #[test]
    fn test_first_band_of_top_bucket() {
        let first = &default_drafts()[0];
        assert_eq!(first.bucket, PerformanceBucket::High);
        assert_eq!(first.compa_from.to_string(), "0.00");
        assert_eq!(first.compa_to.to_string(), "0.70");
        assert_eq!(first.pct_at_or_above_tenure, Decimal::from(25));
    }
}
