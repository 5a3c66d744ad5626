//! The escrow order entity and its state machine.

use chrono::{DateTime, Utc};
use relist_core::{ActorId, ListingId, Money, OrderId};
use relist_payment::HoldId;
use relist_pricing::PriceQuote;
use serde::{Deserialize, Serialize};

/// The status of an escrow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Purchase intent created, payment not yet captured.
    Pending,
    /// Payment captured into escrow; seller owes transfer proof.
    Confirmed,
    /// Seller submitted proof; buyer owes confirmation or an issue report.
    TransferPending,
    /// Buyer confirmed receipt; payout release outstanding.
    Transferred,
    /// Terminal: payout released to the seller.
    Completed,
    /// Buyer reported an issue; dispute engine owns the outcome.
    Disputed,
    /// Terminal: buyer refunded.
    Refunded,
    /// Terminal: cancelled before any ticket changed hands.
    Cancelled,
}

impl OrderStatus {
    /// Checks if a transition to the target status is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::{
            Cancelled, Completed, Confirmed, Disputed, Pending, Refunded, Transferred,
            TransferPending,
        };

        matches!(
            (self, target),
            (Pending, Confirmed | Cancelled)
                | (Confirmed, TransferPending | Cancelled)
                | (TransferPending, Transferred | Disputed)
                | (Transferred, Completed)
                | (Disputed, Refunded | Completed)
        )
    }

    /// True for statuses no transition may leave.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Refunded | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::TransferPending => write!(f, "transfer_pending"),
            Self::Transferred => write!(f, "transferred"),
            Self::Completed => write!(f, "completed"),
            Self::Disputed => write!(f, "disputed"),
            Self::Refunded => write!(f, "refunded"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One entry in an order's status timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// The status entered.
    pub status: OrderStatus,
    /// When it was entered.
    pub at: DateTime<Utc>,
    /// True when the deadline sweep, not a user, caused the change.
    pub by_system: bool,
}

/// An escrow order.
///
/// Financial fields are computed once from the pricing quote at purchase
/// time and never change afterwards — there is no retroactive repricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// The listing purchased from.
    pub listing_id: ListingId,
    /// The buyer.
    pub buyer: ActorId,
    /// The seller (denormalized from the listing at purchase time).
    pub seller: ActorId,
    /// Tickets purchased.
    pub quantity: u32,
    /// `asking_price × quantity`.
    pub subtotal: Money,
    /// Platform fee withheld from the seller.
    pub platform_fee: Money,
    /// Buyer-protection fee charged on top.
    pub buyer_protection_fee: Money,
    /// Total the buyer pays.
    pub total: Money,
    /// What the seller receives on clean completion.
    pub seller_payout: Money,
    /// Current status.
    pub status: OrderStatus,
    /// Payment hold backing this order.
    pub hold: Option<HoldId>,
    /// Status timeline, oldest first.
    pub history: Vec<StatusChange>,
    /// Monotone counter bumped on every transition.
    pub version: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order from a validated pricing quote.
    #[must_use]
    pub fn new(
        listing_id: ListingId,
        buyer: ActorId,
        seller: ActorId,
        quantity: u32,
        quote: &PriceQuote,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            listing_id,
            buyer,
            seller,
            quantity,
            subtotal: quote.subtotal,
            platform_fee: quote.platform_fee,
            buyer_protection_fee: quote.buyer_protection_fee,
            total: quote.buyer_total,
            seller_payout: quote.seller_receives,
            status: OrderStatus::Pending,
            hold: None,
            history: vec![StatusChange { status: OrderStatus::Pending, at: now, by_system: false }],
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the actor is a party to this order.
    #[must_use]
    pub fn involves(&self, actor: ActorId) -> bool {
        self.buyer == actor || self.seller == actor
    }
}
