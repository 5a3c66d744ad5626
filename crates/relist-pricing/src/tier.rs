//! Seller trust tiers and asking-price ceilings.
//!
//! Trust scores are computed by an external reputation service; this module
//! only consumes the resulting tier as a read-only input and maps it to the
//! price ceiling enforced at listing creation and purchase.

use relist_core::Money;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Trust tier assigned to a seller by the reputation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SellerTier {
    /// Fresh account, no resale history.
    #[default]
    New,
    /// Established account with completed sales.
    Trusted,
    /// High-volume seller with verified identity.
    Pro,
}

/// Per-tier asking-price ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCeilings {
    /// Ceiling for [`SellerTier::New`].
    pub new: Money,
    /// Ceiling for [`SellerTier::Trusted`].
    pub trusted: Money,
    /// Ceiling for [`SellerTier::Pro`].
    pub pro: Money,
}

impl Default for TierCeilings {
    fn default() -> Self {
        Self {
            new: Money::from_pounds(150),
            trusted: Money::from_pounds(500),
            pro: Money::from_pounds(2_000),
        }
    }
}

impl TierCeilings {
    /// Returns the ceiling for the given tier.
    #[must_use]
    pub const fn for_tier(&self, tier: SellerTier) -> Money {
        match tier {
            SellerTier::New => self.new,
            SellerTier::Trusted => self.trusted,
            SellerTier::Pro => self.pro,
        }
    }

    /// Rejects asking prices above the seller's ceiling.
    pub fn check(&self, tier: SellerTier, asking: Money) -> Result<(), PricingError> {
        let ceiling = self.for_tier(tier);
        if asking > ceiling {
            return Err(PricingError::AboveTierCeiling { asking, ceiling });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_lookup_per_tier() {
        let ceilings = TierCeilings::default();
        assert!(ceilings.for_tier(SellerTier::New) < ceilings.for_tier(SellerTier::Trusted));
        assert!(ceilings.for_tier(SellerTier::Trusted) < ceilings.for_tier(SellerTier::Pro));
    }

    #[test]
    fn check_rejects_above_ceiling() {
        let ceilings = TierCeilings::default();
        assert!(ceilings.check(SellerTier::New, Money::from_pounds(150)).is_ok());
        let err = ceilings
            .check(SellerTier::New, Money::from_pence(15_001))
            .unwrap_err();
        assert!(matches!(err, PricingError::AboveTierCeiling { .. }));
        // Same price is fine one tier up
        assert!(ceilings.check(SellerTier::Trusted, Money::from_pence(15_001)).is_ok());
    }
}
