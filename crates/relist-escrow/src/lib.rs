//! # relist-escrow
//!
//! The escrow order state machine and transfer protocol — the central
//! coordinator of the Relist resale core.
//!
//! An order moves `pending → confirmed → transfer_pending → transferred →
//! completed`, with branches into cancellation, dispute, and refund. Every
//! transition is an atomic read-modify-write guarded by the expected current
//! status, so two racing requests produce exactly one winner. External rail
//! calls run inside the transition: if the provider fails, the status never
//! changes.
//!
//! This crate provides:
//!
//! - [`Order`] / [`OrderStatus`] — the order entity and its legal transitions
//! - [`Transfer`] / [`TransferStatus`] — the per-order transfer sub-workflow
//! - [`OrderStore`] — optimistic-concurrency order/transfer store
//! - [`EscrowService`] — the operation surface (purchase, proof, receipt,
//!   issue, dispute resolution)
//! - [`DeadlineSweep`] — periodic, idempotent deadline enforcement
//! - [`MessageStore`] — per-order message threads
//! - [`Notifier`] — external notification seam

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod messages;
pub mod notify;
pub mod order;
pub mod service;
pub mod store;
pub mod sweep;
pub mod transfer;

pub use error::EscrowError;
pub use messages::{Message, MessageStore};
pub use notify::{Notification, Notifier, NoopNotifier, TracingNotifier};
pub use order::{Order, OrderStatus, StatusChange};
pub use service::{EscrowConfig, EscrowService};
pub use store::OrderStore;
pub use sweep::{BuyerInactionPolicy, DeadlineSweep, SweepReport};
pub use transfer::{Transfer, TransferStatus};
