//! The resale listing entity.

use chrono::{DateTime, Utc};
use relist_core::{ActorId, ListingId, Money, VerificationLevel};
use relist_pricing::SellerTier;
use serde::{Deserialize, Serialize};

/// A secondary-market ticket listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Unique identifier.
    pub id: ListingId,
    /// Owning seller.
    pub seller: ActorId,
    /// Seller's trust tier at creation time (read-only input from the
    /// reputation service).
    pub seller_tier: SellerTier,
    /// Event name.
    pub event_name: String,
    /// Venue name.
    pub venue: String,
    /// Event start.
    pub event_date: DateTime<Utc>,
    /// Ticket type (e.g. "general admission", "VIP").
    pub ticket_type: String,
    /// Tickets still available.
    pub quantity: u32,
    /// Price the seller originally paid per ticket.
    pub original_price: Money,
    /// Per-ticket resale price.
    pub asking_price: Money,
    /// Current verification level.
    pub verification_level: VerificationLevel,
    /// Whether the listing accepts purchases.
    pub active: bool,
    /// When the seller withdrew the listing, if ever.
    pub withdrawn_at: Option<DateTime<Utc>>,
    /// Number of detail views.
    pub view_count: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// True when every ticket has been reserved.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.quantity == 0
    }

    /// True when the listing can currently be purchased from.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.active && self.quantity > 0 && self.withdrawn_at.is_none()
    }
}

/// Input for creating a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    /// Owning seller.
    pub seller: ActorId,
    /// Seller's trust tier from the reputation service.
    pub seller_tier: SellerTier,
    /// Event name.
    pub event_name: String,
    /// Venue name.
    pub venue: String,
    /// Event start.
    pub event_date: DateTime<Utc>,
    /// Ticket type.
    pub ticket_type: String,
    /// Tickets offered.
    pub quantity: u32,
    /// Price originally paid per ticket.
    pub original_price: Money,
    /// Per-ticket resale price.
    pub asking_price: Money,
}
