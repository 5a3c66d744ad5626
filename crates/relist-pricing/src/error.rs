//! Error types for relist-pricing.

use relist_core::Money;
use thiserror::Error;

/// Errors that can occur when pricing a listing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Asking price exceeds the markup limit over the original price.
    #[error("asking price {asking} exceeds markup limit; maximum allowed is {max_allowed}")]
    OverMarkupLimit {
        /// The rejected asking price.
        asking: Money,
        /// Highest admissible asking price for the original price.
        max_allowed: Money,
    },

    /// Asking price exceeds the seller's trust-tier ceiling.
    #[error("asking price {asking} exceeds tier ceiling {ceiling}")]
    AboveTierCeiling {
        /// The rejected asking price.
        asking: Money,
        /// The seller's ceiling.
        ceiling: Money,
    },

    /// Prices must be positive.
    #[error("price must be greater than zero")]
    ZeroPrice,

    /// Quantity must be positive.
    #[error("quantity must be greater than zero")]
    ZeroQuantity,

    /// Arithmetic overflow in fee computation.
    #[error("amount overflow")]
    Overflow,
}
