//! Error types for relist-verify.

use relist_core::{ListingId, RequestId};
use thiserror::Error;

use crate::proof::ProofKind;

/// Errors that can occur in the verification pipeline.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Request not found.
    #[error("verification request not found: {0}")]
    NotFound(RequestId),

    /// No request exists for this listing.
    #[error("no verification request for listing: {0}")]
    NoneForListing(ListingId),

    /// A required proof type is missing.
    #[error("missing required proof: {0}")]
    MissingRequiredProof(ProofKind),

    /// Proof URL failed format validation.
    #[error("invalid proof url: {0}")]
    InvalidProofUrl(String),

    /// Purchaser email failed format validation.
    #[error("invalid purchaser email: {0}")]
    InvalidEmail(String),

    /// Confirmation details have not been provided.
    #[error("confirmation details missing")]
    DetailsMissing,

    /// The automated fraud check has not been run.
    #[error("fraud check has not been run")]
    FraudCheckMissing,

    /// The automated fraud check did not pass.
    #[error("fraud check failed with risk score {risk_score}")]
    FraudCheckFailed {
        /// Risk score (0–100) from the oracle.
        risk_score: u8,
    },

    /// The request is already in the review queue.
    #[error("request already submitted for review")]
    AlreadySubmitted,

    /// The request is not in a state that permits this operation.
    #[error("request is {status}, cannot {op}")]
    InvalidRequestState {
        /// Current status.
        status: String,
        /// Rejected operation.
        op: &'static str,
    },

    /// Approvals must carry an approved-tier level.
    #[error("approval level must be basic, verified, or premium")]
    InvalidApprovalLevel,

    /// The external fraud oracle could not be reached.
    #[error("fraud oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// A required text field was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
