//! The verification request entity.

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use relist_core::{ActorId, ListingId, RequestId, VerificationLevel};
use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::proof::{ProofArtifact, ProofKind};

/// Regex for purchaser email addresses (format check only; deliverability
/// is the identity service's problem).
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|_| unreachable!())
});

/// Details of the seller's original purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationDetails {
    /// Order reference from the primary platform.
    pub order_reference: String,
    /// Email the tickets were purchased under.
    pub purchaser_email: String,
    /// Primary platform name (e.g. "Skiddle", "FIXR").
    pub platform: String,
    /// Transfer code, where the platform issues one.
    pub transfer_code: Option<String>,
}

impl ConfirmationDetails {
    /// Validates field formats.
    pub fn validate(&self) -> Result<(), VerifyError> {
        if self.order_reference.trim().is_empty() {
            return Err(VerifyError::EmptyField("order_reference"));
        }
        if self.platform.trim().is_empty() {
            return Err(VerifyError::EmptyField("platform"));
        }
        if !EMAIL_REGEX.is_match(&self.purchaser_email) {
            return Err(VerifyError::InvalidEmail(self.purchaser_email.clone()));
        }
        Ok(())
    }
}

/// Outcome of the automated fraud check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudCheckResult {
    /// Whether the request may proceed to human review.
    pub passed: bool,
    /// Risk score, 0 (clean) to 100.
    pub risk_score: u8,
    /// Human-readable warnings accumulated by the oracle.
    pub warnings: Vec<String>,
}

/// Review status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Assembling proofs or waiting in the review queue (see
    /// [`VerificationRequest::submitted_at`]).
    #[default]
    Pending,
    /// Approved at some verification level.
    Approved,
    /// Rejected with a reason; may be resubmitted with fresh proofs.
    Rejected,
    /// Flagged for deeper review.
    Flagged,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Flagged => write!(f, "flagged"),
        }
    }
}

/// Reason codes for rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Proofs do not demonstrate ownership.
    InsufficientProof,
    /// Details contradict the uploaded proofs.
    MismatchedDetails,
    /// Proofs appear altered or reused.
    SuspectedFraud,
    /// Anything else; see reviewer note.
    Other,
}

/// One verification submission cycle for a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// The listing being verified.
    pub listing_id: ListingId,
    /// The listing's seller.
    pub seller: ActorId,
    /// Uploaded proofs, one slot per kind.
    pub proofs: Vec<ProofArtifact>,
    /// Seller's purchase details.
    pub confirmation_details: Option<ConfirmationDetails>,
    /// Latest automated fraud-check outcome.
    pub fraud_check_result: Option<FraudCheckResult>,
    /// Review status.
    pub status: RequestStatus,
    /// Set when the request entered the review queue.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Reviewer who decided the request.
    pub reviewed_by: Option<ActorId>,
    /// Rejection reason, when rejected.
    pub reject_reason: Option<RejectReason>,
    /// Reviewer's note (rejections and flags).
    pub reviewer_note: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl VerificationRequest {
    /// Creates an empty request for a listing.
    #[must_use]
    pub fn new(listing_id: ListingId, seller: ActorId) -> Self {
        Self {
            id: RequestId::new(),
            listing_id,
            seller,
            proofs: Vec::new(),
            confirmation_details: None,
            fraud_check_result: None,
            status: RequestStatus::Pending,
            submitted_at: None,
            reviewed_by: None,
            reject_reason: None,
            reviewer_note: None,
            created_at: Utc::now(),
        }
    }

    /// True once the request is in the review queue.
    #[must_use]
    pub const fn is_queued(&self) -> bool {
        matches!(self.status, RequestStatus::Pending) && self.submitted_at.is_some()
    }

    /// Adds or replaces the proof of the given kind.
    ///
    /// Stale fraud-check results are discarded: changing the evidence
    /// invalidates the score.
    pub fn add_proof(&mut self, artifact: ProofArtifact) -> Result<(), VerifyError> {
        if self.submitted_at.is_some() {
            return Err(VerifyError::AlreadySubmitted);
        }
        if self.status != RequestStatus::Pending {
            return Err(VerifyError::InvalidRequestState {
                status: self.status.to_string(),
                op: "add_proof",
            });
        }
        self.proofs.retain(|p| p.kind != artifact.kind);
        self.proofs.push(artifact);
        self.fraud_check_result = None;
        Ok(())
    }

    /// Sets the confirmation details.
    pub fn set_details(&mut self, details: ConfirmationDetails) -> Result<(), VerifyError> {
        if self.submitted_at.is_some() {
            return Err(VerifyError::AlreadySubmitted);
        }
        details.validate()?;
        self.confirmation_details = Some(details);
        self.fraud_check_result = None;
        Ok(())
    }

    /// Returns the proof of a given kind, if uploaded.
    #[must_use]
    pub fn proof(&self, kind: ProofKind) -> Option<&ProofArtifact> {
        self.proofs.iter().find(|p| p.kind == kind)
    }

    /// Checks that every required proof kind is present.
    pub fn check_required_proofs(&self) -> Result<(), VerifyError> {
        for kind in ProofKind::REQUIRED {
            if self.proof(kind).is_none() {
                return Err(VerifyError::MissingRequiredProof(kind));
            }
        }
        Ok(())
    }

    /// Records an automated fraud-check result.
    pub fn record_fraud_check(&mut self, result: FraudCheckResult) -> Result<(), VerifyError> {
        if self.submitted_at.is_some() {
            return Err(VerifyError::AlreadySubmitted);
        }
        self.check_required_proofs()?;
        if self.confirmation_details.is_none() {
            return Err(VerifyError::DetailsMissing);
        }
        self.fraud_check_result = Some(result);
        Ok(())
    }

    /// Submits the request to the human review queue.
    ///
    /// Requires every required proof, confirmation details, and a passing
    /// fraud check. Passing the automated check never auto-approves.
    pub fn submit(&mut self) -> Result<(), VerifyError> {
        if self.submitted_at.is_some() {
            return Err(VerifyError::AlreadySubmitted);
        }
        if self.status != RequestStatus::Pending {
            return Err(VerifyError::InvalidRequestState {
                status: self.status.to_string(),
                op: "submit",
            });
        }
        self.check_required_proofs()?;
        if self.confirmation_details.is_none() {
            return Err(VerifyError::DetailsMissing);
        }
        match &self.fraud_check_result {
            None => return Err(VerifyError::FraudCheckMissing),
            Some(result) if !result.passed => {
                return Err(VerifyError::FraudCheckFailed { risk_score: result.risk_score });
            }
            Some(_) => {}
        }
        self.submitted_at = Some(Utc::now());
        Ok(())
    }

    /// Reviewer approval at an explicit level.
    pub fn approve(
        &mut self,
        reviewer: ActorId,
        level: VerificationLevel,
    ) -> Result<(), VerifyError> {
        self.require_queued("approve")?;
        if !level.is_approved() {
            return Err(VerifyError::InvalidApprovalLevel);
        }
        self.status = RequestStatus::Approved;
        self.reviewed_by = Some(reviewer);
        Ok(())
    }

    /// Reviewer rejection with a reason code.
    pub fn reject(
        &mut self,
        reviewer: ActorId,
        reason: RejectReason,
        note: Option<String>,
    ) -> Result<(), VerifyError> {
        self.require_queued("reject")?;
        self.status = RequestStatus::Rejected;
        self.reviewed_by = Some(reviewer);
        self.reject_reason = Some(reason);
        self.reviewer_note = note;
        Ok(())
    }

    /// Reviewer flag for deeper review.
    pub fn flag(&mut self, reviewer: ActorId, note: String) -> Result<(), VerifyError> {
        self.require_queued("flag")?;
        self.status = RequestStatus::Flagged;
        self.reviewed_by = Some(reviewer);
        self.reviewer_note = Some(note);
        Ok(())
    }

    /// Starts a fresh submission cycle after a rejection.
    ///
    /// Clears proofs, details stay, the stale fraud result is discarded.
    pub fn resubmit(&mut self) -> Result<(), VerifyError> {
        if self.status != RequestStatus::Rejected {
            return Err(VerifyError::InvalidRequestState {
                status: self.status.to_string(),
                op: "resubmit",
            });
        }
        self.status = RequestStatus::Pending;
        self.submitted_at = None;
        self.proofs.clear();
        self.fraud_check_result = None;
        self.reviewed_by = None;
        self.reject_reason = None;
        self.reviewer_note = None;
        Ok(())
    }

    fn require_queued(&self, op: &'static str) -> Result<(), VerifyError> {
        if !self.is_queued() {
            return Err(VerifyError::InvalidRequestState {
                status: self.status.to_string(),
                op,
            });
        }
        Ok(())
    }
}
