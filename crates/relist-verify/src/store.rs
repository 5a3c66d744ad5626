//! Verification request store and reviewer queue.

use std::collections::HashMap;

use parking_lot::RwLock;
use relist_core::{ActorId, ListingId, RequestId, VerificationLevel};
use tracing::info;

use crate::error::VerifyError;
use crate::oracle::FraudOracle;
use crate::proof::{ProofArtifact, ProofKind};
use crate::request::{ConfirmationDetails, RejectReason, VerificationRequest};

#[derive(Debug, Default)]
struct Inner {
    requests: HashMap<RequestId, VerificationRequest>,
    by_listing: HashMap<ListingId, RequestId>,
}

/// Store of verification requests, one live cycle per listing.
#[derive(Debug, Default)]
pub struct VerificationStore {
    inner: RwLock<Inner>,
}

impl VerificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches a request by id.
    pub fn get(&self, id: RequestId) -> Result<VerificationRequest, VerifyError> {
        self.inner
            .read()
            .requests
            .get(&id)
            .cloned()
            .ok_or(VerifyError::NotFound(id))
    }

    /// The request for a listing, if one exists.
    #[must_use]
    pub fn for_listing(&self, listing_id: ListingId) -> Option<VerificationRequest> {
        let inner = self.inner.read();
        inner
            .by_listing
            .get(&listing_id)
            .and_then(|id| inner.requests.get(id))
            .cloned()
    }

    /// Uploads a proof, creating the listing's request on first upload.
    ///
    /// Returns the updated request and whether this was the first proof of
    /// a fresh cycle (callers flip the listing to `pending` on `true`).
    pub fn upload_proof(
        &self,
        listing_id: ListingId,
        seller: ActorId,
        kind: ProofKind,
        url: String,
    ) -> Result<(VerificationRequest, bool), VerifyError> {
        let artifact = ProofArtifact::new(kind, url)?;
        let mut inner = self.inner.write();
        let (id, created) = match inner.by_listing.get(&listing_id) {
            Some(id) => (*id, false),
            None => {
                let request = VerificationRequest::new(listing_id, seller);
                let id = request.id;
                inner.by_listing.insert(listing_id, id);
                inner.requests.insert(id, request);
                info!(listing_id = %listing_id, request_id = %id, "verification cycle opened");
                (id, true)
            }
        };
        let request = inner
            .requests
            .get_mut(&id)
            .ok_or(VerifyError::NotFound(id))?;
        let first_of_cycle = created || request.proofs.is_empty();
        request.add_proof(artifact)?;
        Ok((request.clone(), first_of_cycle))
    }

    /// Sets confirmation details on a listing's request.
    pub fn set_details(
        &self,
        listing_id: ListingId,
        details: ConfirmationDetails,
    ) -> Result<VerificationRequest, VerifyError> {
        self.with_listing_request(listing_id, |request| request.set_details(details))
    }

    /// Runs the fraud oracle and records its result.
    ///
    /// An unreachable oracle leaves the request untouched.
    pub fn run_fraud_check(
        &self,
        listing_id: ListingId,
        oracle: &dyn FraudOracle,
    ) -> Result<VerificationRequest, VerifyError> {
        // Score outside the write lock; the oracle call may be slow.
        let snapshot = self
            .for_listing(listing_id)
            .ok_or(VerifyError::NoneForListing(listing_id))?;
        let result = oracle.score(&snapshot)?;
        self.with_listing_request(listing_id, |request| request.record_fraud_check(result))
    }

    /// Submits a listing's request into the review queue.
    pub fn submit(&self, listing_id: ListingId) -> Result<VerificationRequest, VerifyError> {
        self.with_listing_request(listing_id, VerificationRequest::submit)
    }

    /// Starts a fresh cycle after a rejection.
    pub fn resubmit(&self, listing_id: ListingId) -> Result<VerificationRequest, VerifyError> {
        self.with_listing_request(listing_id, VerificationRequest::resubmit)
    }

    /// The review queue: submitted requests, oldest first.
    #[must_use]
    pub fn queue(&self) -> Vec<VerificationRequest> {
        let mut queued: Vec<VerificationRequest> = self
            .inner
            .read()
            .requests
            .values()
            .filter(|r| r.is_queued())
            .cloned()
            .collect();
        queued.sort_by_key(|r| r.submitted_at);
        queued
    }

    /// Reviewer approval; returns the level to apply to the listing.
    pub fn approve(
        &self,
        id: RequestId,
        reviewer: ActorId,
        level: VerificationLevel,
    ) -> Result<VerificationRequest, VerifyError> {
        let mut inner = self.inner.write();
        let request = inner.requests.get_mut(&id).ok_or(VerifyError::NotFound(id))?;
        request.approve(reviewer, level)?;
        info!(request_id = %id, reviewer = %reviewer, level = %level, "verification approved");
        Ok(request.clone())
    }

    /// Reviewer rejection with a reason code.
    pub fn reject(
        &self,
        id: RequestId,
        reviewer: ActorId,
        reason: RejectReason,
        note: Option<String>,
    ) -> Result<VerificationRequest, VerifyError> {
        let mut inner = self.inner.write();
        let request = inner.requests.get_mut(&id).ok_or(VerifyError::NotFound(id))?;
        request.reject(reviewer, reason, note)?;
        info!(request_id = %id, reviewer = %reviewer, reason = ?reason, "verification rejected");
        Ok(request.clone())
    }

    /// Reviewer flag for deeper review.
    pub fn flag(
        &self,
        id: RequestId,
        reviewer: ActorId,
        note: String,
    ) -> Result<VerificationRequest, VerifyError> {
        let mut inner = self.inner.write();
        let request = inner.requests.get_mut(&id).ok_or(VerifyError::NotFound(id))?;
        request.flag(reviewer, note)?;
        info!(request_id = %id, reviewer = %reviewer, "verification flagged");
        Ok(request.clone())
    }

    fn with_listing_request<T>(
        &self,
        listing_id: ListingId,
        f: impl FnOnce(&mut VerificationRequest) -> Result<T, VerifyError>,
    ) -> Result<VerificationRequest, VerifyError> {
        let mut inner = self.inner.write();
        let id = *inner
            .by_listing
            .get(&listing_id)
            .ok_or(VerifyError::NoneForListing(listing_id))?;
        let request = inner.requests.get_mut(&id).ok_or(VerifyError::NotFound(id))?;
        f(request)?;
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FixedOracle, RuleOracle};
    use crate::request::{FraudCheckResult, RequestStatus};

    fn details() -> ConfirmationDetails {
        ConfirmationDetails {
            order_reference: "SKDL-1".to_string(),
            purchaser_email: "s@example.com".to_string(),
            platform: "Skiddle".to_string(),
            transfer_code: Some("TX".to_string()),
        }
    }

    fn upload_all(store: &VerificationStore, listing: ListingId, seller: ActorId) {
        for kind in [
            ProofKind::ConfirmationEmail,
            ProofKind::TicketScreenshot,
            ProofKind::QrCode,
            ProofKind::PurchaseReceipt,
        ] {
            store
                .upload_proof(listing, seller, kind, format!("https://cdn.x.example/{kind}.png"))
                .unwrap();
        }
    }

    #[test]
    fn first_upload_opens_cycle() {
        let store = VerificationStore::new();
        let listing = ListingId::new();
        let (request, first) = store
            .upload_proof(
                listing,
                ActorId::new(),
                ProofKind::ConfirmationEmail,
                "https://cdn.x.example/a.png".to_string(),
            )
            .unwrap();
        assert!(first);
        assert_eq!(request.proofs.len(), 1);

        let (_, first_again) = store
            .upload_proof(
                listing,
                request.seller,
                ProofKind::TicketScreenshot,
                "https://cdn.x.example/b.png".to_string(),
            )
            .unwrap();
        assert!(!first_again);
    }

    #[test]
    fn full_pipeline_to_approval() {
        let store = VerificationStore::new();
        let listing = ListingId::new();
        let seller = ActorId::new();
        upload_all(&store, listing, seller);
        store.set_details(listing, details()).unwrap();
        store.run_fraud_check(listing, &RuleOracle::new()).unwrap();
        let submitted = store.submit(listing).unwrap();
        assert!(submitted.is_queued());

        let queue = store.queue();
        assert_eq!(queue.len(), 1);

        let reviewer = ActorId::new();
        let approved = store
            .approve(submitted.id, reviewer, VerificationLevel::Verified)
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(store.queue().is_empty());
    }

    #[test]
    fn oracle_outage_leaves_request_untouched() {
        let store = VerificationStore::new();
        let listing = ListingId::new();
        let seller = ActorId::new();
        upload_all(&store, listing, seller);
        store.set_details(listing, details()).unwrap();

        let err = store
            .run_fraud_check(listing, &FixedOracle::unavailable())
            .unwrap_err();
        assert!(matches!(err, VerifyError::OracleUnavailable(_)));
        assert!(store.for_listing(listing).unwrap().fraud_check_result.is_none());
    }

    #[test]
    fn failing_check_blocks_submission() {
        let store = VerificationStore::new();
        let listing = ListingId::new();
        let seller = ActorId::new();
        upload_all(&store, listing, seller);
        store.set_details(listing, details()).unwrap();
        let oracle = FixedOracle::returning(FraudCheckResult {
            passed: false,
            risk_score: 90,
            warnings: vec!["reused asset".to_string()],
        });
        store.run_fraud_check(listing, &oracle).unwrap();
        assert!(matches!(
            store.submit(listing).unwrap_err(),
            VerifyError::FraudCheckFailed { risk_score: 90 }
        ));
    }

    #[test]
    fn reject_then_resubmit() {
        let store = VerificationStore::new();
        let listing = ListingId::new();
        let seller = ActorId::new();
        upload_all(&store, listing, seller);
        store.set_details(listing, details()).unwrap();
        store.run_fraud_check(listing, &RuleOracle::new()).unwrap();
        let submitted = store.submit(listing).unwrap();

        store
            .reject(submitted.id, ActorId::new(), RejectReason::MismatchedDetails, None)
            .unwrap();
        let fresh = store.resubmit(listing).unwrap();
        assert_eq!(fresh.status, RequestStatus::Pending);
        assert!(fresh.proofs.is_empty());

        // Same request id continues the listing's history.
        assert_eq!(fresh.id, submitted.id);
    }

    #[test]
    fn queue_is_fifo() {
        let store = VerificationStore::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let listing = ListingId::new();
            let seller = ActorId::new();
            upload_all(&store, listing, seller);
            store.set_details(listing, details()).unwrap();
            store.run_fraud_check(listing, &RuleOracle::new()).unwrap();
            ids.push(store.submit(listing).unwrap().id);
        }
        let queue: Vec<RequestId> = store.queue().into_iter().map(|r| r.id).collect();
        assert_eq!(queue, ids);
    }
}
