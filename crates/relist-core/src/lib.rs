//! # relist-core
//!
//! Shared primitives for the Relist ticket resale core.
//!
//! This crate provides:
//!
//! - [`Money`] — Fixed-point currency amount (integer pence, half-up rounding)
//! - Typed identifiers ([`ListingId`], [`OrderId`], [`DisputeId`], ...)
//! - [`Actor`] and [`Role`] — the authenticated principal model
//! - [`VerificationLevel`] — tiered trust label shared across crates
//! - [`Page`] / [`PageRequest`] — pagination for list surfaces

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actor;
pub mod error;
pub mod ids;
pub mod level;
pub mod money;
pub mod page;

pub use actor::{Actor, Role};
pub use error::CoreError;
pub use ids::{ActorId, DisputeId, ListingId, MessageId, OrderId, RequestId, TransferId};
pub use level::VerificationLevel;
pub use money::Money;
pub use page::{Page, PageRequest};
