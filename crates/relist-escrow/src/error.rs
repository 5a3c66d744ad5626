//! Error types for relist-escrow.

use relist_core::OrderId;
use relist_dispute::DisputeError;
use relist_listings::ListingError;
use relist_payment::RailError;
use relist_pricing::PricingError;
use thiserror::Error;

/// Errors that can occur in escrow operations.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// Order not found.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// Listing registry rejected the operation.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// Pricing validation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The payment rail failed; no state was changed.
    #[error(transparent)]
    Rail(#[from] RailError),

    /// Dispute engine rejected the operation.
    #[error(transparent)]
    Dispute(#[from] DisputeError),

    /// Attempted transition not legal from the current status.
    #[error("state conflict: order is {current}, cannot move to {attempted}")]
    StateConflict {
        /// Current order status.
        current: String,
        /// Attempted target status.
        attempted: String,
    },

    /// Transfer sub-workflow rejected the operation.
    #[error("transfer is {current}, cannot {attempted}")]
    TransferConflict {
        /// Current transfer status.
        current: String,
        /// Attempted action.
        attempted: String,
    },

    /// The actor lacks the role or identity required for this transition.
    #[error("forbidden: {action}")]
    Forbidden {
        /// The refused action.
        action: &'static str,
    },

    /// Sellers cannot buy their own listings.
    #[error("cannot purchase own listing")]
    SelfPurchase,

    /// Transfer proof requires at least one URL.
    #[error("at least one proof url is required")]
    NoProofUrls,

    /// Message body failed validation.
    #[error("message body {0}")]
    InvalidMessage(&'static str),

    /// No transfer exists for this order yet.
    #[error("order has no transfer workflow: {0}")]
    NoTransfer(OrderId),

    /// Order record has no payment hold attached (broken invariant).
    #[error("order has no payment hold: {0}")]
    MissingHold(OrderId),
}
