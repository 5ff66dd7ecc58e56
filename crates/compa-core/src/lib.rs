//! # compa-core: Foundational Types for the Adjustment Engine
//!
//! This crate defines the primitives every other `compa-*` crate builds on:
//! tenant identity, performance rating scales and their canonical buckets,
//! the decimal rounding rules for ratios and money, the fixed set of input
//! fields, and per-tenant mutual exclusion.
//!
//! ## Key Design Principles
//!
//! 1. **Explicit tenancy.** Every operation that touches tenant data takes a
//!    [`TenantId`] (usually inside a [`TenantContext`]). There is no ambient
//!    "current tenant".
//!
//! 2. **One rating table.** [`RatingScaleConverter`] derives both the
//!    rating → bucket mapping and the bucket → representative rating mapping
//!    from a single table per scale, so the two directions cannot drift.
//!
//! 3. **Decimal arithmetic only.** Ratios, percentages, and salaries are
//!    `rust_decimal::Decimal`. Rounding is half-up, 6 places for ratios and
//!    2 places for currency.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] is truncated to seconds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `compa-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod bucket;
pub mod decimal;
pub mod error;
pub mod field;
pub mod identity;
pub mod lock;
pub mod rating;
pub mod scale;
pub mod temporal;
pub mod tenant;

// Re-export primary types for ergonomic imports.
pub use bucket::PerformanceBucket;
pub use decimal::{round_currency, round_half_up, round_ratio, CURRENCY_SCALE, RATIO_SCALE};
pub use error::{IdentityError, RatingError, StorageError, ValidationError};
pub use field::InputField;
pub use identity::{BatchId, MatrixRowId, TenantId};
pub use lock::TenantLocks;
pub use rating::RatingScaleConverter;
pub use scale::PerformanceRatingScale;
pub use temporal::Timestamp;
pub use tenant::TenantContext;
