//! The fraud-check oracle seam.
//!
//! Scoring (image forensics, OCR, reuse detection) runs in an external
//! service. The state machine only sees the trait below, so the scoring
//! implementation can be swapped without touching the pipeline.

use crate::error::VerifyError;
use crate::proof::ProofKind;
use crate::request::{FraudCheckResult, VerificationRequest};

/// Risk score at or above which the automated check fails.
pub const FAIL_THRESHOLD: u8 = 60;

/// External fraud-scoring capability.
pub trait FraudOracle: Send + Sync {
    /// Scores a request. An `Err` means the oracle was unreachable and the
    /// request must be left untouched.
    fn score(&self, request: &VerificationRequest) -> Result<FraudCheckResult, VerifyError>;
}

/// Deterministic rule-based oracle used as the default scorer.
///
/// Scores from completeness signals only; a real deployment swaps this for
/// the hosted scoring service.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOracle;

impl RuleOracle {
    /// Creates the rule oracle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FraudOracle for RuleOracle {
    fn score(&self, request: &VerificationRequest) -> Result<FraudCheckResult, VerifyError> {
        let mut risk: u8 = 5;
        let mut warnings = Vec::new();

        if request.proof(ProofKind::QrCode).is_none() {
            risk = risk.saturating_add(15);
            warnings.push("no QR code provided".to_string());
        }
        if request.proof(ProofKind::PurchaseReceipt).is_none() {
            risk = risk.saturating_add(10);
            warnings.push("no purchase receipt provided".to_string());
        }
        if let Some(details) = &request.confirmation_details {
            if details.transfer_code.is_none() {
                risk = risk.saturating_add(10);
                warnings.push("no transfer code on record".to_string());
            }
        } else {
            risk = risk.saturating_add(30);
            warnings.push("confirmation details missing".to_string());
        }

        Ok(FraudCheckResult {
            passed: risk < FAIL_THRESHOLD,
            risk_score: risk.min(100),
            warnings,
        })
    }
}

/// Oracle returning a fixed result; for tests and drills.
#[derive(Debug, Clone)]
pub struct FixedOracle {
    result: Option<FraudCheckResult>,
}

impl FixedOracle {
    /// Always returns the given result.
    #[must_use]
    pub const fn returning(result: FraudCheckResult) -> Self {
        Self { result: Some(result) }
    }

    /// Always reports the oracle as unavailable.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { result: None }
    }
}

impl FraudOracle for FixedOracle {
    fn score(&self, _request: &VerificationRequest) -> Result<FraudCheckResult, VerifyError> {
        self.result
            .clone()
            .ok_or_else(|| VerifyError::OracleUnavailable("scripted outage".to_string()))
    }
}
