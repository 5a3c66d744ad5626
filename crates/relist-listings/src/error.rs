//! Error types for relist-listings.

use relist_core::ListingId;
use relist_pricing::PricingError;
use thiserror::Error;

/// Errors that can occur in listing registry operations.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Listing not found.
    #[error("listing not found: {0}")]
    NotFound(ListingId),

    /// Pricing validation failed (markup limit or tier ceiling).
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Seller already has the maximum number of active listings.
    #[error("seller has reached the active listing quota of {limit}")]
    QuotaExceeded {
        /// Maximum active listings per seller.
        limit: u32,
    },

    /// Quantity outside the allowed range.
    #[error("quantity must be between 1 and {max}")]
    InvalidQuantity {
        /// Maximum tickets per listing.
        max: u32,
    },

    /// Not enough tickets remaining to satisfy a purchase.
    #[error("insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity {
        /// Quantity requested by the buyer.
        requested: u32,
        /// Quantity still available.
        available: u32,
    },

    /// Listing is withdrawn or sold out.
    #[error("listing is not active: {0}")]
    Inactive(ListingId),

    /// Only the owning seller may perform this mutation.
    #[error("actor does not own this listing")]
    NotOwner,

    /// Event date must be in the future at creation time.
    #[error("event date is in the past")]
    EventInPast,

    /// A required text field was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A text field exceeded its length bound.
    #[error("{field} exceeds maximum length of {max}")]
    FieldTooLong {
        /// Offending field name.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}
