//! Error types for relist-dispute.

use relist_core::{DisputeId, Money, OrderId};
use thiserror::Error;

/// Errors that can occur in dispute operations.
#[derive(Debug, Error)]
pub enum DisputeError {
    /// Dispute not found.
    #[error("dispute not found: {0}")]
    NotFound(DisputeId),

    /// The order already has a dispute.
    #[error("order already has a dispute: {0}")]
    AlreadyOpen(OrderId),

    /// Attempted transition not legal from the current status.
    #[error("invalid dispute transition: {from} -> {to}")]
    StateConflict {
        /// The current status.
        from: String,
        /// The attempted target status.
        to: String,
    },

    /// The acting party is not part of this dispute.
    #[error("actor is not a party to this dispute")]
    NotParty,

    /// It is not this party's turn to respond.
    #[error("dispute is not awaiting this party")]
    NotAwaited,

    /// A party may submit only one initial statement.
    #[error("statement already submitted; only evidence may be appended")]
    StatementAlreadySubmitted,

    /// Statements and evidence must be non-empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Partial resolutions must set both amounts.
    #[error("partial resolution requires both refund and seller payout amounts")]
    PartialRequiresBothAmounts,

    /// Partial resolutions must allocate strictly less than the order value.
    #[error("partial split must sum to less than the order total")]
    PartialNotPartial,

    /// The split would move more money than the escrow pool allows.
    #[error("split exceeds escrow pool: refund {refund} + payout {payout} > pool {pool}")]
    SplitExceedsPool {
        /// Proposed refund to the buyer.
        refund: Money,
        /// Proposed payout to the seller.
        payout: Money,
        /// Amount actually available.
        pool: Money,
    },

    /// A single side exceeds its own bound.
    #[error("{side} amount {amount} exceeds bound {bound}")]
    SideExceedsBound {
        /// Which side ("refund" or "seller_payout").
        side: &'static str,
        /// Proposed amount.
        amount: Money,
        /// Maximum allowed.
        bound: Money,
    },
}
