//! The per-order transfer sub-workflow.

use chrono::{DateTime, Utc};
use relist_core::{OrderId, TransferId};
use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// The status of a ticket transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Waiting for the seller's proof.
    AwaitingProof,
    /// Proof on the table; buyer owes confirmation or an issue report.
    ProofSubmitted,
    /// Buyer confirmed receipt.
    Confirmed,
    /// Buyer reported an issue; a dispute owns the outcome.
    IssueReported,
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingProof => write!(f, "awaiting_proof"),
            Self::ProofSubmitted => write!(f, "proof_submitted"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::IssueReported => write!(f, "issue_reported"),
        }
    }
}

/// The transfer workflow attached 1:1 to a confirmed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique identifier.
    pub id: TransferId,
    /// The order this transfer belongs to.
    pub order_id: OrderId,
    /// Seller-submitted proof URLs.
    pub seller_proof_urls: Vec<String>,
    /// Seller's notes to the buyer.
    pub seller_notes: Option<String>,
    /// Current status.
    pub status: TransferStatus,
    /// When the seller submitted proof.
    pub proof_submitted_at: Option<DateTime<Utc>>,
    /// When the buyer confirmed or reported an issue.
    pub buyer_action_at: Option<DateTime<Utc>>,
    /// Deadline for the party currently on the hook: first the seller's
    /// proof deadline, then the buyer's response deadline.
    pub response_deadline: DateTime<Utc>,
}

impl Transfer {
    /// Creates the workflow for a freshly confirmed order. The seller must
    /// submit proof before `proof_deadline`.
    #[must_use]
    pub fn new(order_id: OrderId, proof_deadline: DateTime<Utc>) -> Self {
        Self {
            id: TransferId::new(),
            order_id,
            seller_proof_urls: Vec::new(),
            seller_notes: None,
            status: TransferStatus::AwaitingProof,
            proof_submitted_at: None,
            buyer_action_at: None,
            response_deadline: proof_deadline,
        }
    }

    /// Records the seller's proof and starts the buyer's response window.
    pub fn submit_proof(
        &mut self,
        urls: Vec<String>,
        notes: Option<String>,
        buyer_deadline: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        if self.status != TransferStatus::AwaitingProof {
            return Err(EscrowError::TransferConflict {
                current: self.status.to_string(),
                attempted: "submit_proof".to_string(),
            });
        }
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(EscrowError::NoProofUrls);
        }
        self.seller_proof_urls = urls;
        self.seller_notes = notes;
        self.status = TransferStatus::ProofSubmitted;
        self.proof_submitted_at = Some(Utc::now());
        self.response_deadline = buyer_deadline;
        Ok(())
    }

    /// Records the buyer's receipt confirmation.
    pub fn confirm(&mut self) -> Result<(), EscrowError> {
        if self.status != TransferStatus::ProofSubmitted {
            return Err(EscrowError::TransferConflict {
                current: self.status.to_string(),
                attempted: "confirm_receipt".to_string(),
            });
        }
        self.status = TransferStatus::Confirmed;
        self.buyer_action_at = Some(Utc::now());
        Ok(())
    }

    /// Records the buyer's issue report.
    pub fn report_issue(&mut self) -> Result<(), EscrowError> {
        if self.status != TransferStatus::ProofSubmitted {
            return Err(EscrowError::TransferConflict {
                current: self.status.to_string(),
                attempted: "report_issue".to_string(),
            });
        }
        self.status = TransferStatus::IssueReported;
        self.buyer_action_at = Some(Utc::now());
        Ok(())
    }
}
