//! Public search over active listings.

use relist_core::Money;
use serde::{Deserialize, Serialize};

use crate::listing::Listing;

/// Filters for the public listing search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Case-insensitive substring match on the event name.
    pub event_contains: Option<String>,
    /// Maximum per-ticket asking price.
    pub max_price: Option<Money>,
    /// Only listings a reviewer has approved at any tier.
    pub verified_only: bool,
}

impl SearchFilter {
    /// Returns true when the listing passes every set filter.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(needle) = &self.event_contains {
            if !listing
                .event_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.asking_price > max {
                return false;
            }
        }
        if self.verified_only && !listing.verification_level.is_approved() {
            return false;
        }
        true
    }
}

/// Sort order for search results.
///
/// Whatever the primary key, ties break on verification level (higher first)
/// and then recency, so trust rises monotonically through every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Soonest event first.
    EventDate,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Most viewed first.
    Popularity,
    /// Most recently listed first.
    #[default]
    Newest,
}

impl SortKey {
    /// Sorts a result set in place.
    pub fn sort(self, listings: &mut [Listing]) {
        match self {
            Self::EventDate => listings.sort_by(|a, b| {
                a.event_date
                    .cmp(&b.event_date)
                    .then(b.verification_level.cmp(&a.verification_level))
                    .then(b.created_at.cmp(&a.created_at))
            }),
            Self::PriceAsc => listings.sort_by(|a, b| {
                a.asking_price
                    .cmp(&b.asking_price)
                    .then(b.verification_level.cmp(&a.verification_level))
                    .then(b.created_at.cmp(&a.created_at))
            }),
            Self::PriceDesc => listings.sort_by(|a, b| {
                b.asking_price
                    .cmp(&a.asking_price)
                    .then(b.verification_level.cmp(&a.verification_level))
                    .then(b.created_at.cmp(&a.created_at))
            }),
            Self::Popularity => listings.sort_by(|a, b| {
                b.view_count
                    .cmp(&a.view_count)
                    .then(b.verification_level.cmp(&a.verification_level))
                    .then(b.created_at.cmp(&a.created_at))
            }),
            Self::Newest => listings.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then(b.verification_level.cmp(&a.verification_level))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use relist_core::{ActorId, ListingId, VerificationLevel};
    use relist_pricing::SellerTier;

    fn listing(event: &str, price: u64, views: u64, level: VerificationLevel) -> Listing {
        Listing {
            id: ListingId::new(),
            seller: ActorId::new(),
            seller_tier: SellerTier::New,
            event_name: event.to_string(),
            venue: "somewhere".to_string(),
            event_date: Utc::now() + Duration::days(10),
            ticket_type: "ga".to_string(),
            quantity: 1,
            original_price: Money::from_pence(price),
            asking_price: Money::from_pence(price),
            verification_level: level,
            active: true,
            withdrawn_at: None,
            view_count: views,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn filter_by_event_substring_is_case_insensitive() {
        let filter = SearchFilter {
            event_contains: Some("warehouse".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&listing("Warehouse Project", 2000, 0, VerificationLevel::Unverified)));
        assert!(!filter.matches(&listing("Printworks", 2000, 0, VerificationLevel::Unverified)));
    }

    #[test]
    fn filter_by_max_price() {
        let filter = SearchFilter {
            max_price: Some(Money::from_pence(2500)),
            ..Default::default()
        };
        assert!(filter.matches(&listing("a", 2500, 0, VerificationLevel::Unverified)));
        assert!(!filter.matches(&listing("a", 2501, 0, VerificationLevel::Unverified)));
    }

    #[test]
    fn filter_verified_only() {
        let filter = SearchFilter { verified_only: true, ..Default::default() };
        assert!(filter.matches(&listing("a", 100, 0, VerificationLevel::Basic)));
        assert!(!filter.matches(&listing("a", 100, 0, VerificationLevel::Pending)));
    }

    #[test]
    fn sort_by_price_asc() {
        let mut items = vec![
            listing("a", 300, 0, VerificationLevel::Unverified),
            listing("b", 100, 0, VerificationLevel::Unverified),
            listing("c", 200, 0, VerificationLevel::Unverified),
        ];
        SortKey::PriceAsc.sort(&mut items);
        let prices: Vec<u64> = items.iter().map(|l| l.asking_price.pence()).collect();
        assert_eq!(prices, vec![100, 200, 300]);
    }

    #[test]
    fn sort_popularity_breaks_ties_on_level() {
        let mut items = vec![
            listing("a", 100, 5, VerificationLevel::Unverified),
            listing("b", 100, 5, VerificationLevel::Premium),
        ];
        SortKey::Popularity.sort(&mut items);
        assert_eq!(items[0].event_name, "b");
    }
}
