//! Error types for relist-payment.

use relist_core::Money;
use thiserror::Error;

use crate::rail::HoldId;

/// Errors surfaced by a payment rail.
#[derive(Debug, Error)]
pub enum RailError {
    /// The provider declined the charge.
    #[error("payment declined")]
    Declined,

    /// The provider could not be reached; the operation did not happen.
    #[error("payment provider unavailable: {0}")]
    Unavailable(String),

    /// No hold with this id.
    #[error("unknown hold: {0}")]
    UnknownHold(HoldId),

    /// The requested movement exceeds what remains on the hold.
    #[error("insufficient hold balance: requested {requested}, remaining {remaining}")]
    InsufficientHold {
        /// Amount requested.
        requested: Money,
        /// Amount still on the hold.
        remaining: Money,
    },

    /// The hold is not in a state that permits this operation.
    #[error("hold {hold} is {state}, cannot {op}")]
    InvalidHoldState {
        /// The hold.
        hold: HoldId,
        /// Its current state.
        state: String,
        /// The rejected operation.
        op: &'static str,
    },
}
