//! Typed proof artifacts.

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VerifyError;

/// Maximum length for proof URLs.
const MAX_URL_LENGTH: usize = 2048;

/// Regex for valid proof URLs (http/https only — storage is external).
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s]+$").unwrap_or_else(|_| unreachable!())
});

/// The proof types a seller can attach to a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    /// Screenshot or forward of the original purchase confirmation email.
    ConfirmationEmail,
    /// Screenshot of the ticket in the seller's account or wallet.
    TicketScreenshot,
    /// The ticket's QR or barcode image.
    QrCode,
    /// Receipt or bank statement line for the original purchase.
    PurchaseReceipt,
}

impl ProofKind {
    /// The two proof types every request must include.
    pub const REQUIRED: [Self; 2] = [Self::ConfirmationEmail, Self::TicketScreenshot];

    /// True for proof types that must be present before submission.
    #[must_use]
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfirmationEmail => write!(f, "confirmation_email"),
            Self::TicketScreenshot => write!(f, "ticket_screenshot"),
            Self::QrCode => write!(f, "qr_code"),
            Self::PurchaseReceipt => write!(f, "purchase_receipt"),
        }
    }
}

/// One uploaded proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    /// What kind of proof this is.
    pub kind: ProofKind,
    /// Where the file lives (storage is an external collaborator).
    pub url: String,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

impl ProofArtifact {
    /// Creates an artifact after validating the URL format.
    pub fn new(kind: ProofKind, url: String) -> Result<Self, VerifyError> {
        validate_proof_url(&url)?;
        Ok(Self { kind, url, uploaded_at: Utc::now() })
    }
}

/// Validates a proof URL.
pub fn validate_proof_url(url: &str) -> Result<(), VerifyError> {
    if url.len() > MAX_URL_LENGTH || !URL_REGEX.is_match(url) {
        return Err(VerifyError::InvalidProofUrl(url.to_string()));
    }
    Ok(())
}
