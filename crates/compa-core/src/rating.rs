//! # Rating Scale Converter
//!
//! Maps raw performance ratings onto the three canonical buckets and back.
//!
//! ## Invariant
//!
//! Both directions read the same per-scale table. The representative rating
//! of a bucket is the lowest rating that maps into it, so
//! `bucket_of(representative_rating(b, s), s) == b` holds for every bucket
//! and scale.
//!
//! ```text
//! THREE_POINT   1 → 1   2 → 2   3 → 3
//! FIVE_POINT    1 → 1   2,3 → 2   4,5 → 3
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::bucket::PerformanceBucket;
use crate::error::RatingError;
use crate::scale::PerformanceRatingScale;

const THREE_POINT_TABLE: [PerformanceBucket; 3] = [
    PerformanceBucket::Low,
    PerformanceBucket::Middle,
    PerformanceBucket::High,
];

const FIVE_POINT_TABLE: [PerformanceBucket; 5] = [
    PerformanceBucket::Low,
    PerformanceBucket::Middle,
    PerformanceBucket::Middle,
    PerformanceBucket::High,
    PerformanceBucket::High,
];

/// Converts between raw ratings and canonical buckets.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingScaleConverter;

impl RatingScaleConverter {
    /// Bucket table for a scale. Index `r - 1` holds the bucket of rating `r`.
    fn table(scale: PerformanceRatingScale) -> &'static [PerformanceBucket] {
        match scale {
            PerformanceRatingScale::ThreePoint => &THREE_POINT_TABLE,
            PerformanceRatingScale::FivePoint => &FIVE_POINT_TABLE,
        }
    }

    fn invalid(rating: i64, scale: PerformanceRatingScale) -> RatingError {
        RatingError::InvalidRating {
            rating,
            scale,
            max: scale.max_rating(),
        }
    }

    /// Map a raw rating to its bucket.
    ///
    /// # Errors
    ///
    /// [`RatingError::InvalidRating`] if the rating is outside `1..=scale.max_rating()`.
    pub fn bucket_of(
        rating: i64,
        scale: PerformanceRatingScale,
    ) -> Result<PerformanceBucket, RatingError> {
        if !scale.is_valid_rating(rating) {
            return Err(Self::invalid(rating, scale));
        }
        let index = usize::try_from(rating - 1).map_err(|_| Self::invalid(rating, scale))?;
        Self::table(scale)
            .get(index)
            .copied()
            .ok_or_else(|| Self::invalid(rating, scale))
    }

    /// The canonical display rating for a bucket on a scale.
    pub fn representative_rating(bucket: PerformanceBucket, scale: PerformanceRatingScale) -> u8 {
        Self::table(scale)
            .iter()
            .position(|b| *b == bucket)
            .and_then(|i| u8::try_from(i + 1).ok())
            .unwrap_or(bucket.as_u8())
    }

    /// Upload-time shim for tenants on the three-point scale.
    ///
    /// Sheets prepared with five-point ratings are common. Ratings 4 and 5
    /// are clamped to 3 under `THREE_POINT`. Returns the effective rating and
    /// whether it was changed. Every other input passes through untouched.
    pub fn coerce_for_scale(rating: i64, scale: PerformanceRatingScale) -> (i64, bool) {
        match scale {
            PerformanceRatingScale::ThreePoint if (4..=5).contains(&rating) => (3, true),
            _ => (rating, false),
        }
    }

    /// Proportionally convert a rating from one scale to another.
    ///
    /// `max(1, round(rating / from.max * to.max))`, rounding half-up.
    /// Identity when the scales match.
    pub fn convert_rating(
        rating: i64,
        from: PerformanceRatingScale,
        to: PerformanceRatingScale,
    ) -> Result<u8, RatingError> {
        if !from.is_valid_rating(rating) {
            return Err(Self::invalid(rating, from));
        }
        let as_u8 = |r: i64| u8::try_from(r).map_err(|_| Self::invalid(r, from));
        if from == to {
            return as_u8(rating);
        }
        let scaled = Decimal::from(rating) * Decimal::from(to.max_rating())
            / Decimal::from(from.max_rating());
        let rounded = scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(1);
        as_u8(rounded.clamp(1, i64::from(to.max_rating())))
    }
}
