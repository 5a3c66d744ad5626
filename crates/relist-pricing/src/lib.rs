//! # relist-pricing
//!
//! Pricing engine for the Relist resale marketplace.
//!
//! This crate provides:
//!
//! - [`quote()`] — pure fee computation for a listing price and quantity
//! - [`FeeSchedule`] — markup limit and fee rates
//! - [`TierCeilings`] — per-trust-tier asking-price ceilings
//!
//! # Precision Guarantees
//!
//! All monetary calculations use fixed-point arithmetic on integer pence:
//!
//! - **No floating-point**: fee rates are expressed in permille
//! - **Round-half-up**: fee amounts round half-up to the penny
//! - **Conservation**: `seller_receives + platform_fee == subtotal` exactly,
//!   because the payout is derived by subtraction rather than rounded
//!   independently

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod quote;
pub mod tier;

pub use error::PricingError;
pub use quote::{FeeSchedule, PriceQuote, check_quote, quote};
pub use tier::{SellerTier, TierCeilings};
