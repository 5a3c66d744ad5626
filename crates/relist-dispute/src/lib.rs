//! # relist-dispute
//!
//! Dispute resolution engine for the Relist escrow core.
//!
//! A dispute is opened when a buyer reports a transfer issue. The two
//! parties exchange one statement each plus appended evidence under a
//! response deadline; a lapsed deadline escalates the dispute with reduced
//! weight for the silent party. A reviewer then computes a binding
//! resolution whose refund/payout split can never move more money than the
//! order escrowed.
//!
//! This crate provides:
//!
//! - [`Dispute`] — the dispute entity and its state machine
//! - [`DisputeStore`] — in-memory store with one-dispute-per-order
//! - [`Resolution`] / [`Split`] — reviewer decisions and conservation-checked
//!   split arithmetic

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispute;
pub mod error;
pub mod resolution;
pub mod store;

pub use dispute::{Dispute, DisputeReason, DisputeStatus, Party, PartyCase};
pub use error::DisputeError;
pub use resolution::{OrderFinancials, Resolution, ResolutionOutcome, Split};
pub use store::DisputeStore;
