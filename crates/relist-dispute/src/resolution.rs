//! Reviewer resolutions and split arithmetic.
//!
//! A resolution allocates the escrowed pool between a buyer refund and a
//! seller payout. The platform fee stays retained unless the reviewer
//! explicitly voids it, so the invariant checked here is
//! `refund + payout ≤ order.total − retained_platform_fee`.

use relist_core::Money;
use serde::{Deserialize, Serialize};

use crate::error::DisputeError;

/// The frozen financial fields of the order under dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFinancials {
    /// Total the buyer paid (subtotal + fees).
    pub total: Money,
    /// What the seller would receive on a clean completion.
    pub seller_payout: Money,
    /// Platform fee withheld from the subtotal.
    pub platform_fee: Money,
}

/// Binding outcome of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Fully allocate to the buyer: total refunded, no payout.
    BuyerFavor,
    /// Fully allocate to the seller: full payout, no refund.
    SellerFavor,
    /// Explicit split of refund and payout.
    Partial,
}

/// A reviewer's resolution of a dispute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// The outcome.
    pub outcome: ResolutionOutcome,
    /// Reviewer's notes, shown to both parties.
    pub notes: String,
    /// Refund to the buyer; required for `Partial`.
    pub refund_amount: Option<Money>,
    /// Payout to the seller; required for `Partial`.
    pub seller_payout_amount: Option<Money>,
    /// Returns the platform fee to the split pool. Reviewer-explicit.
    pub void_platform_fee: bool,
}

impl Resolution {
    /// Shorthand for a full buyer refund.
    #[must_use]
    pub fn buyer_favor(notes: impl Into<String>) -> Self {
        Self {
            outcome: ResolutionOutcome::BuyerFavor,
            notes: notes.into(),
            refund_amount: None,
            seller_payout_amount: None,
            void_platform_fee: false,
        }
    }

    /// Shorthand for a full seller payout.
    #[must_use]
    pub fn seller_favor(notes: impl Into<String>) -> Self {
        Self {
            outcome: ResolutionOutcome::SellerFavor,
            notes: notes.into(),
            refund_amount: None,
            seller_payout_amount: None,
            void_platform_fee: false,
        }
    }

    /// A partial split.
    #[must_use]
    pub fn partial(refund: Money, payout: Money, notes: impl Into<String>) -> Self {
        Self {
            outcome: ResolutionOutcome::Partial,
            notes: notes.into(),
            refund_amount: Some(refund),
            seller_payout_amount: Some(payout),
            void_platform_fee: false,
        }
    }

    /// Validates the resolution against the order's frozen financials and
    /// returns the concrete split to execute.
    pub fn split(&self, financials: &OrderFinancials) -> Result<Split, DisputeError> {
        match self.outcome {
            ResolutionOutcome::BuyerFavor => Ok(Split {
                refund: financials.total,
                seller_payout: Money::ZERO,
            }),
            ResolutionOutcome::SellerFavor => Ok(Split {
                refund: Money::ZERO,
                seller_payout: financials.seller_payout,
            }),
            ResolutionOutcome::Partial => {
                let (Some(refund), Some(payout)) = (self.refund_amount, self.seller_payout_amount)
                else {
                    return Err(DisputeError::PartialRequiresBothAmounts);
                };
                if refund > financials.total {
                    return Err(DisputeError::SideExceedsBound {
                        side: "refund",
                        amount: refund,
                        bound: financials.total,
                    });
                }
                if payout > financials.seller_payout {
                    return Err(DisputeError::SideExceedsBound {
                        side: "seller_payout",
                        amount: payout,
                        bound: financials.seller_payout,
                    });
                }
                let allocated = refund.saturating_add(payout);
                if allocated >= financials.total {
                    return Err(DisputeError::PartialNotPartial);
                }
                let pool = if self.void_platform_fee {
                    financials.total
                } else {
                    financials.total.saturating_sub(financials.platform_fee)
                };
                if allocated > pool {
                    return Err(DisputeError::SplitExceedsPool {
                        refund,
                        payout,
                        pool,
                    });
                }
                Ok(Split { refund, seller_payout: payout })
            }
        }
    }
}

/// The concrete amounts a resolution moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Refund to the buyer.
    pub refund: Money,
    /// Payout to the seller.
    pub seller_payout: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario D financials: £28.00 subtotal, £2.80 platform fee,
    /// £0.70 protection fee, £31.50 total, £25.20 payout.
    fn financials() -> OrderFinancials {
        OrderFinancials {
            total: Money::from_pence(3150),
            seller_payout: Money::from_pence(2520),
            platform_fee: Money::from_pence(280),
        }
    }

    #[test]
    fn buyer_favor_refunds_total() {
        let split = Resolution::buyer_favor("no ticket").split(&financials()).unwrap();
        assert_eq!(split.refund, Money::from_pence(3150));
        assert_eq!(split.seller_payout, Money::ZERO);
    }

    #[test]
    fn seller_favor_pays_full_payout() {
        let split = Resolution::seller_favor("ticket was valid").split(&financials()).unwrap();
        assert_eq!(split.refund, Money::ZERO);
        assert_eq!(split.seller_payout, Money::from_pence(2520));
    }

    #[test]
    fn scenario_d_partial_split() {
        // refund £15.00, payout £10.25
        let resolution = Resolution::partial(
            Money::from_pence(1500),
            Money::from_pence(1025),
            "both at fault",
        );
        let split = resolution.split(&financials()).unwrap();
        assert_eq!(split.refund, Money::from_pence(1500));
        assert_eq!(split.seller_payout, Money::from_pence(1025));
    }

    #[test]
    fn partial_requires_both_amounts() {
        let resolution = Resolution {
            outcome: ResolutionOutcome::Partial,
            notes: String::new(),
            refund_amount: Some(Money::from_pence(100)),
            seller_payout_amount: None,
            void_platform_fee: false,
        };
        assert!(matches!(
            resolution.split(&financials()).unwrap_err(),
            DisputeError::PartialRequiresBothAmounts
        ));
    }

    #[test]
    fn partial_cannot_exceed_retained_pool() {
        // Pool = 3150 − 280 = 2870. Refund 2500 + payout 500 = 3000 > pool
        // (and still below total so the partial check passes first).
        let resolution = Resolution::partial(
            Money::from_pence(2500),
            Money::from_pence(500),
            "too generous",
        );
        assert!(matches!(
            resolution.split(&financials()).unwrap_err(),
            DisputeError::SplitExceedsPool { .. }
        ));
    }

    #[test]
    fn voiding_platform_fee_widens_pool() {
        let mut resolution = Resolution::partial(
            Money::from_pence(2500),
            Money::from_pence(500),
            "fee voided",
        );
        resolution.void_platform_fee = true;
        let split = resolution.split(&financials()).unwrap();
        assert_eq!(split.refund.saturating_add(split.seller_payout), Money::from_pence(3000));
    }

    #[test]
    fn partial_must_be_partial() {
        let resolution = Resolution::partial(
            Money::from_pence(3000),
            Money::from_pence(150),
            "everything",
        );
        assert!(matches!(
            resolution.split(&financials()).unwrap_err(),
            DisputeError::PartialNotPartial
        ));
    }

    #[test]
    fn sides_bounded_individually() {
        let too_much_refund =
            Resolution::partial(Money::from_pence(3200), Money::ZERO, "over");
        assert!(matches!(
            too_much_refund.split(&financials()).unwrap_err(),
            DisputeError::SideExceedsBound { side: "refund", .. }
        ));

        let too_much_payout =
            Resolution::partial(Money::ZERO, Money::from_pence(2600), "over");
        assert!(matches!(
            too_much_payout.split(&financials()).unwrap_err(),
            DisputeError::SideExceedsBound { side: "seller_payout", .. }
        ));
    }
}
