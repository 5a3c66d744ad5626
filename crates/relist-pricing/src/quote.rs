//! Fee computation for a resale price.

use relist_core::Money;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Fee rates and the markup limit applied to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Platform fee rate in permille of the subtotal (10% = 100).
    pub platform_permille: u32,
    /// Buyer-protection fee rate in permille of the subtotal (2.5% = 25).
    pub protection_permille: u32,
    /// Maximum markup over the original price, in percent of the original
    /// price added to it (50 means asking may reach 150% of original).
    pub max_markup_percent: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            platform_permille: 100,
            protection_permille: 25,
            max_markup_percent: 50,
        }
    }
}

impl FeeSchedule {
    /// Highest admissible asking price for a given original price.
    #[must_use]
    pub const fn max_allowed_price(&self, original: Money) -> Money {
        original.percent_floor(100 + self.max_markup_percent)
    }
}

/// The full fee breakdown for a candidate price and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Markup of asking over original, in basis points (400 bps = 4%... 10000 bps = 100%).
    pub markup_bps: u64,
    /// True when the asking price exceeds the markup limit.
    pub is_over_limit: bool,
    /// Highest admissible asking price for this original price.
    pub max_allowed_price: Money,
    /// `asking × quantity`.
    pub subtotal: Money,
    /// Platform fee withheld from the seller.
    pub platform_fee: Money,
    /// Buyer-protection fee charged on top of the subtotal.
    pub buyer_protection_fee: Money,
    /// Total the buyer pays: subtotal + both fees.
    pub buyer_total: Money,
    /// What the seller receives: subtotal − platform fee.
    pub seller_receives: Money,
}

/// Computes the fee breakdown for one listing price.
///
/// Pure function of its inputs; rejects non-positive prices and quantities
/// but deliberately does **not** reject over-limit prices — callers inspect
/// [`PriceQuote::is_over_limit`] so they can report the quote alongside the
/// rejection (see [`check_quote`] for the rejecting variant).
///
/// # Examples
/// ```
/// use relist_core::Money;
/// use relist_pricing::{FeeSchedule, quote};
///
/// let q = quote(
///     Money::from_pounds(20),
///     Money::from_pounds(28),
///     1,
///     &FeeSchedule::default(),
/// )
/// .unwrap();
/// assert_eq!(q.markup_bps, 4000);
/// assert!(!q.is_over_limit);
/// assert_eq!(q.buyer_total, Money::from_pence(3150));
/// assert_eq!(q.seller_receives, Money::from_pence(2520));
/// ```
pub fn quote(
    original: Money,
    asking: Money,
    quantity: u32,
    schedule: &FeeSchedule,
) -> Result<PriceQuote, PricingError> {
    if original.is_zero() || asking.is_zero() {
        return Err(PricingError::ZeroPrice);
    }
    if quantity == 0 {
        return Err(PricingError::ZeroQuantity);
    }

    let max_allowed_price = schedule.max_allowed_price(original);
    let is_over_limit = asking > max_allowed_price;

    // Markup in basis points; zero when asking is at or below original.
    let markup_bps = if asking > original {
        let diff = asking.pence() - original.pence();
        (diff as u128 * 10_000 / original.pence() as u128) as u64
    } else {
        0
    };

    let subtotal = asking
        .checked_mul(u64::from(quantity))
        .ok_or(PricingError::Overflow)?;
    let platform_fee = subtotal.permille_half_up(schedule.platform_permille);
    let buyer_protection_fee = subtotal.permille_half_up(schedule.protection_permille);
    let buyer_total = subtotal
        .checked_add(platform_fee)
        .and_then(|t| t.checked_add(buyer_protection_fee))
        .ok_or(PricingError::Overflow)?;
    // Derived by subtraction so conservation holds to the penny.
    let seller_receives = subtotal
        .checked_sub(platform_fee)
        .ok_or(PricingError::Overflow)?;

    Ok(PriceQuote {
        markup_bps,
        is_over_limit,
        max_allowed_price,
        subtotal,
        platform_fee,
        buyer_protection_fee,
        buyer_total,
        seller_receives,
    })
}

/// Computes a quote and rejects over-limit prices.
///
/// This is the variant listing creation and purchase use: an over-limit
/// asking price is an error, never a warning.
pub fn check_quote(
    original: Money,
    asking: Money,
    quantity: u32,
    schedule: &FeeSchedule,
) -> Result<PriceQuote, PricingError> {
    let q = quote(original, asking, quantity, schedule)?;
    if q.is_over_limit {
        return Err(PricingError::OverMarkupLimit {
            asking,
            max_allowed: q.max_allowed_price,
        });
    }
    Ok(q)
}
