//! # relist-payment
//!
//! Payment rail abstraction for the Relist escrow core.
//!
//! The payment provider is an opaque external capability: the core only
//! needs to **hold** a buyer's funds, **capture** the hold once the order is
//! confirmed, and later **release** to the seller and/or **refund** the
//! buyer. This crate provides:
//!
//! - [`PaymentRail`] — the trait the escrow state machine calls
//! - [`MemoryRail`] — in-process implementation with a movement ledger and
//!   scripted failures, used by tests and local runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod rail;

pub use error::RailError;
pub use memory::MemoryRail;
pub use rail::{HoldId, HoldState, PaymentRail, RailOp};
