//! Listing verification levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tiered trust label attached to a listing.
///
/// Visibility and search priority are a monotone function of the level:
/// `Unverified < Pending < Basic < Verified < Premium`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    /// No proofs submitted.
    #[default]
    Unverified,
    /// Proofs uploaded, review outstanding.
    Pending,
    /// Minimum proof set accepted.
    Basic,
    /// Full proof set accepted.
    Verified,
    /// Full proof set plus platform confirmation accepted.
    Premium,
}

impl VerificationLevel {
    /// Ordinal rank used for visibility sorting.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Unverified => 0,
            Self::Pending => 1,
            Self::Basic => 2,
            Self::Verified => 3,
            Self::Premium => 4,
        }
    }

    /// True once a reviewer has approved the listing at any tier.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Basic | Self::Verified | Self::Premium)
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified => write!(f, "unverified"),
            Self::Pending => write!(f, "pending"),
            Self::Basic => write!(f, "basic"),
            Self::Verified => write!(f, "verified"),
            Self::Premium => write!(f, "premium"),
        }
    }
}
