//! # Error Types
//!
//! Errors shared across the workspace. All use `thiserror`.
//!
//! ## Design
//!
//! - Validation errors name the offending [`InputField`] so callers can point
//!   a user at the exact column or form field.
//! - Rating errors carry the scale and its valid range.
//! - Storage errors are opaque to the engine: they are reported, never retried.

use thiserror::Error;

use crate::field::InputField;
use crate::scale::PerformanceRatingScale;

/// A single input value failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// The input field that failed.
    pub field: InputField,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Build a validation error for `field`.
    pub fn new(field: InputField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Rating conversion failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The rating is outside `1..=scale.max_rating()`.
    #[error("performance rating {rating} is invalid for {scale} scale; valid range: 1-{max}")]
    InvalidRating {
        /// The rejected rating.
        rating: i64,
        /// The scale the rating was interpreted under.
        scale: PerformanceRatingScale,
        /// Maximum rating on that scale.
        max: u8,
    },
}

impl From<RatingError> for ValidationError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::InvalidRating { scale, max, .. } => ValidationError::new(
                InputField::PerformanceRating,
                format!(
                    "Performance rating must be between 1 and {max} for {}",
                    scale.display_name()
                ),
            ),
        }
    }
}

/// Identifier construction failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Tenant identifiers must contain at least one non-whitespace character.
    #[error("tenant id must not be empty")]
    EmptyTenantId,
}

/// Errors raised by a persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend detected a conflicting concurrent write.
    #[error("storage conflict: {0}")]
    Conflict(String),
}
