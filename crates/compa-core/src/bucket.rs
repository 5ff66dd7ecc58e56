//! # Performance Buckets
//!
//! Every rating scale collapses onto three canonical tiers. Matrix rows are
//! keyed by bucket, never by raw rating.

use serde::{Deserialize, Serialize};

/// One of the three canonical performance tiers.
///
/// Serialized as its numeric value (1, 2, or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PerformanceBucket {
    /// Bucket 1: lowest tier.
    Low,
    /// Bucket 2: middle tier.
    Middle,
    /// Bucket 3: highest tier.
    High,
}

impl PerformanceBucket {
    /// All buckets in ascending order.
    pub const ALL: [PerformanceBucket; 3] = [Self::Low, Self::Middle, Self::High];

    /// Numeric bucket value.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Middle => 2,
            Self::High => 3,
        }
    }

    /// The next bucket up, if any.
    pub fn next(&self) -> Option<PerformanceBucket> {
        match self {
            Self::Low => Some(Self::Middle),
            Self::Middle => Some(Self::High),
            Self::High => None,
        }
    }
}

impl TryFrom<u8> for PerformanceBucket {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Middle),
            3 => Ok(Self::High),
            other => Err(format!("performance bucket must be 1, 2, or 3; got {other}")),
        }
    }
}

impl From<PerformanceBucket> for u8 {
    fn from(bucket: PerformanceBucket) -> Self {
        bucket.as_u8()
    }
}

impl std::fmt::Display for PerformanceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
