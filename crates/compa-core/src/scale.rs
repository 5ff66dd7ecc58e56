//! # Performance Rating Scales
//!
//! A tenant rates employees on exactly one scale. Tenants with no recorded
//! preference use the five-point scale.

use serde::{Deserialize, Serialize};

/// The rating scale a tenant uses for performance reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceRatingScale {
    /// Ratings 1 through 3.
    ThreePoint,
    /// Ratings 1 through 5.
    #[default]
    FivePoint,
}

impl PerformanceRatingScale {
    /// All scales.
    pub const ALL: [PerformanceRatingScale; 2] = [Self::ThreePoint, Self::FivePoint];

    /// Highest valid rating on this scale.
    pub fn max_rating(&self) -> u8 {
        match self {
            Self::ThreePoint => 3,
            Self::FivePoint => 5,
        }
    }

    /// Human-readable scale name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ThreePoint => "3-Point Rating Scale",
            Self::FivePoint => "5-Point Rating Scale",
        }
    }

    /// Stable string form used in configuration and serialized data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreePoint => "THREE_POINT",
            Self::FivePoint => "FIVE_POINT",
        }
    }

    /// Whether `rating` lies within `1..=max_rating()`.
    pub fn is_valid_rating(&self, rating: i64) -> bool {
        (1..=i64::from(self.max_rating())).contains(&rating)
    }
}

impl std::fmt::Display for PerformanceRatingScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PerformanceRatingScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "THREE_POINT" | "3" => Ok(Self::ThreePoint),
            "FIVE_POINT" | "5" => Ok(Self::FivePoint),
            other => Err(format!(
                "unknown rating scale {other:?}; expected THREE_POINT or FIVE_POINT"
            )),
        }
    }
}
