//! In-memory listing registry.
//!
//! All mutations run under a single write lock so quantity reservation is
//! atomic relative to concurrent purchases: two buyers racing for the last
//! ticket see exactly one success and one `InsufficientQuantity`.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use relist_core::{ActorId, ListingId, Money, Page, PageRequest, VerificationLevel};
use relist_pricing::{FeeSchedule, TierCeilings, check_quote};
use tracing::{debug, info};

use crate::error::ListingError;
use crate::listing::{Listing, NewListing};
use crate::search::{SearchFilter, SortKey};

/// Maximum length for event and venue names.
const MAX_NAME_LENGTH: usize = 120;

/// Maximum length for the ticket type label.
const MAX_TICKET_TYPE_LENGTH: usize = 60;

/// Registry limits and pricing rules.
#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    /// Maximum simultaneously active listings per seller.
    pub max_active_per_seller: u32,
    /// Maximum tickets per listing.
    pub max_quantity: u32,
    /// Fee schedule used for markup validation.
    pub fees: FeeSchedule,
    /// Tier-derived asking-price ceilings.
    pub ceilings: TierCeilings,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_active_per_seller: 10,
            max_quantity: 10,
            fees: FeeSchedule::default(),
            ceilings: TierCeilings::default(),
        }
    }
}

/// The listing registry.
#[derive(Debug, Default)]
pub struct ListingStore {
    listings: RwLock<HashMap<ListingId, Listing>>,
    config: ListingConfig,
}

impl ListingStore {
    /// Creates an empty registry with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with custom limits.
    #[must_use]
    pub fn with_config(config: ListingConfig) -> Self {
        Self { listings: RwLock::new(HashMap::new()), config }
    }

    /// The registry's configured fee schedule.
    #[must_use]
    pub const fn fees(&self) -> &FeeSchedule {
        &self.config.fees
    }

    /// Creates a listing after validating pricing, quota, and fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error and writes nothing when the markup limit,
    /// tier ceiling, quota, quantity range, or field constraints are violated.
    pub fn create(&self, new: NewListing) -> Result<Listing, ListingError> {
        validate_text("event_name", &new.event_name, MAX_NAME_LENGTH)?;
        validate_text("venue", &new.venue, MAX_NAME_LENGTH)?;
        validate_text("ticket_type", &new.ticket_type, MAX_TICKET_TYPE_LENGTH)?;

        if new.quantity == 0 || new.quantity > self.config.max_quantity {
            return Err(ListingError::InvalidQuantity { max: self.config.max_quantity });
        }
        if new.event_date <= Utc::now() {
            return Err(ListingError::EventInPast);
        }

        // Markup limit, then the seller's tier ceiling.
        check_quote(new.original_price, new.asking_price, new.quantity, &self.config.fees)?;
        self.config.ceilings.check(new.seller_tier, new.asking_price)?;

        let mut listings = self.listings.write();
        let active_count = listings
            .values()
            .filter(|l| l.seller == new.seller && l.active)
            .count() as u32;
        if active_count >= self.config.max_active_per_seller {
            return Err(ListingError::QuotaExceeded {
                limit: self.config.max_active_per_seller,
            });
        }

        let listing = Listing {
            id: ListingId::new(),
            seller: new.seller,
            seller_tier: new.seller_tier,
            event_name: new.event_name,
            venue: new.venue,
            event_date: new.event_date,
            ticket_type: new.ticket_type,
            quantity: new.quantity,
            original_price: new.original_price,
            asking_price: new.asking_price,
            verification_level: VerificationLevel::Unverified,
            active: true,
            withdrawn_at: None,
            view_count: 0,
            created_at: Utc::now(),
        };
        info!(listing_id = %listing.id, seller = %listing.seller, "listing created");
        listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    /// Fetches a listing by id.
    pub fn get(&self, id: ListingId) -> Result<Listing, ListingError> {
        self.listings
            .read()
            .get(&id)
            .cloned()
            .ok_or(ListingError::NotFound(id))
    }

    /// All listings owned by a seller, newest first.
    #[must_use]
    pub fn seller_listings(&self, seller: ActorId, page: PageRequest) -> Page<Listing> {
        let mut items: Vec<Listing> = self
            .listings
            .read()
            .values()
            .filter(|l| l.seller == seller)
            .cloned()
            .collect();
        SortKey::Newest.sort(&mut items);
        Page::from_vec(items, page)
    }

    /// Searches active listings.
    #[must_use]
    pub fn search(&self, filter: &SearchFilter, sort: SortKey, page: PageRequest) -> Page<Listing> {
        let mut items: Vec<Listing> = self
            .listings
            .read()
            .values()
            .filter(|l| l.is_purchasable() && filter.matches(l))
            .cloned()
            .collect();
        sort.sort(&mut items);
        Page::from_vec(items, page)
    }

    /// Atomically reserves `quantity` tickets for a purchase.
    ///
    /// Deactivates the listing once the last ticket is reserved.
    ///
    /// # Errors
    ///
    /// Returns `Inactive` for withdrawn/sold-out listings and
    /// `InsufficientQuantity` when fewer tickets remain than requested.
    pub fn reserve(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingError> {
        let mut listings = self.listings.write();
        let listing = listings.get_mut(&id).ok_or(ListingError::NotFound(id))?;
        if !listing.is_purchasable() {
            return Err(ListingError::Inactive(id));
        }
        if listing.quantity < quantity {
            return Err(ListingError::InsufficientQuantity {
                requested: quantity,
                available: listing.quantity,
            });
        }
        listing.quantity -= quantity;
        if listing.is_sold_out() {
            listing.active = false;
            debug!(listing_id = %id, "listing sold out");
        }
        Ok(listing.clone())
    }

    /// Returns reserved tickets to the pool after a cancelled or refunded
    /// order whose tickets never changed hands.
    ///
    /// Reactivates a listing that was deactivated by selling out, but never
    /// one the seller withdrew.
    pub fn restore(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingError> {
        let mut listings = self.listings.write();
        let listing = listings.get_mut(&id).ok_or(ListingError::NotFound(id))?;
        listing.quantity = listing.quantity.saturating_add(quantity);
        if listing.withdrawn_at.is_none() {
            listing.active = true;
        }
        debug!(listing_id = %id, quantity, "listing quantity restored");
        Ok(listing.clone())
    }

    /// Records a detail view.
    pub fn record_view(&self, id: ListingId) -> Result<(), ListingError> {
        let mut listings = self.listings.write();
        let listing = listings.get_mut(&id).ok_or(ListingError::NotFound(id))?;
        listing.view_count = listing.view_count.saturating_add(1);
        Ok(())
    }

    /// Updates the verification level (verification pipeline only).
    pub fn set_verification_level(
        &self,
        id: ListingId,
        level: VerificationLevel,
    ) -> Result<(), ListingError> {
        let mut listings = self.listings.write();
        let listing = listings.get_mut(&id).ok_or(ListingError::NotFound(id))?;
        info!(listing_id = %id, level = %level, "verification level updated");
        listing.verification_level = level;
        Ok(())
    }

    /// Withdraws a listing. Only the owning seller may withdraw; existing
    /// orders continue unaffected, new purchases stop.
    pub fn withdraw(&self, id: ListingId, seller: ActorId) -> Result<(), ListingError> {
        let mut listings = self.listings.write();
        let listing = listings.get_mut(&id).ok_or(ListingError::NotFound(id))?;
        if listing.seller != seller {
            return Err(ListingError::NotOwner);
        }
        listing.active = false;
        listing.withdrawn_at = Some(Utc::now());
        info!(listing_id = %id, "listing withdrawn");
        Ok(())
    }

    /// Updates the asking price of an active listing. Re-validates the
    /// markup limit and tier ceiling against the stored original price.
    pub fn reprice(
        &self,
        id: ListingId,
        seller: ActorId,
        asking_price: Money,
    ) -> Result<Listing, ListingError> {
        let mut listings = self.listings.write();
        let listing = listings.get_mut(&id).ok_or(ListingError::NotFound(id))?;
        if listing.seller != seller {
            return Err(ListingError::NotOwner);
        }
        check_quote(listing.original_price, asking_price, 1, &self.config.fees)?;
        self.config.ceilings.check(listing.seller_tier, asking_price)?;
        listing.asking_price = asking_price;
        Ok(listing.clone())
    }
}

fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), ListingError> {
    if value.trim().is_empty() {
        return Err(ListingError::EmptyField(field));
    }
    if value.len() > max {
        return Err(ListingError::FieldTooLong { field, max });
    }
    Ok(())
}
