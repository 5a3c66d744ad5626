//! # relist-verify
//!
//! Verification pipeline for Relist listings.
//!
//! Sellers upload typed proof artifacts (confirmation email, ticket
//! screenshot, QR code, purchase receipt), attach their purchase details,
//! and run an automated fraud check. A passing check admits the request to
//! the human review queue — it never auto-approves. Reviewers approve with
//! an explicit verification level, reject with a reason, or flag for deeper
//! review.
//!
//! This crate provides:
//!
//! - [`ProofKind`] / [`ProofArtifact`] — typed proof uploads
//! - [`VerificationRequest`] — one submission cycle per listing
//! - [`FraudOracle`] — the external scoring seam ([`RuleOracle`] default)
//! - [`VerificationStore`] — request store and reviewer queue

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod oracle;
pub mod proof;
pub mod request;
pub mod store;

pub use error::VerifyError;
pub use oracle::{FixedOracle, FraudOracle, RuleOracle};
pub use proof::{ProofArtifact, ProofKind};
pub use request::{
    ConfirmationDetails, FraudCheckResult, RejectReason, RequestStatus, VerificationRequest,
};
pub use store::VerificationStore;
