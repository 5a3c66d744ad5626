//! Request dispatch.
//!
//! The [`Gateway`] authenticates the bearer token, applies the per-actor
//! rate limit, and routes each operation to the owning store or service.
//! Verification decisions are wired back onto the listing's verification
//! level here, so the verify pipeline itself stays free of registry
//! dependencies.

use std::sync::Arc;

use relist_audit::{AuditEvent, AuditLogger};
use relist_core::{Actor, ListingId, Page, Role, VerificationLevel};
use relist_escrow::EscrowService;
use relist_listings::{ListingStore, NewListing};
use relist_pricing::SellerTier;
use relist_verify::{FraudOracle, VerificationStore};
use tracing::{debug, info};

use crate::api::{
    ApiError, ApiRequest, ApiResponse, CreateListingBody, DisputeAction, DisputeView, ListingView,
    MessageView, OrderView, TransferAction, VerificationView, VerifyDecision,
};
use crate::auth::{TokenRegistry, require_role};
use crate::rate_limit::RateLimiter;

/// Resolves a seller's trust tier. The real implementation calls the
/// reputation service; the default treats everyone as `Trusted`.
pub trait TierSource: Send + Sync {
    /// The seller's current tier.
    fn tier_of(&self, actor: &Actor) -> SellerTier;
}

/// Tier source that grants every seller the same tier.
#[derive(Debug, Clone, Copy)]
pub struct StaticTier(pub SellerTier);

impl TierSource for StaticTier {
    fn tier_of(&self, _actor: &Actor) -> SellerTier {
        self.0
    }
}

/// The authenticated, rate-limited dispatch layer.
pub struct Gateway {
    auth: TokenRegistry,
    limiter: Arc<dyn RateLimiter>,
    listings: Arc<ListingStore>,
    verify: Arc<VerificationStore>,
    oracle: Arc<dyn FraudOracle>,
    service: Arc<EscrowService>,
    tiers: Arc<dyn TierSource>,
    audit: Arc<dyn AuditLogger>,
}

impl Gateway {
    /// Wires the gateway over its collaborators.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        auth: TokenRegistry,
        limiter: Arc<dyn RateLimiter>,
        listings: Arc<ListingStore>,
        verify: Arc<VerificationStore>,
        oracle: Arc<dyn FraudOracle>,
        service: Arc<EscrowService>,
        tiers: Arc<dyn TierSource>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self { auth, limiter, listings, verify, oracle, service, tiers, audit }
    }

    /// The token registry, for issuing tokens at startup.
    #[must_use]
    pub const fn tokens(&self) -> &TokenRegistry {
        &self.auth
    }

    /// Authenticates, rate-limits, and dispatches one request.
    pub fn handle(&self, token: &str, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let actor = self.auth.authenticate(token).inspect_err(|e| {
            self.audit.log(&AuditEvent::auth_failure(e.message.clone()));
        })?;
        let action = request.action();
        self.limiter.check(actor.id, action).inspect_err(|_| {
            self.audit.log(&AuditEvent::rate_limit_exceeded(actor.id, action));
        })?;
        debug!(actor = %actor.id, action, "request accepted");
        self.dispatch(&actor, request)
    }

    #[allow(clippy::too_many_lines)]
    fn dispatch(&self, actor: &Actor, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        match request {
            ApiRequest::CreateListing(body) => self.create_listing(actor, body),
            ApiRequest::SearchListings { filter, sort, page } => {
                let results = self.listings.search(&filter, sort, page.resolve());
                Ok(ApiResponse::Listings(results.map(|l| ListingView::from(&l))))
            }
            ApiRequest::GetListing { listing_id } => {
                let _ = self.listings.record_view(listing_id);
                let listing = self.listings.get(listing_id)?;
                Ok(ApiResponse::Listing(ListingView::from(&listing)))
            }
            ApiRequest::MyListings { page } => {
                let results = self.listings.seller_listings(actor.id, page.resolve());
                Ok(ApiResponse::Listings(results.map(|l| ListingView::from(&l))))
            }
            ApiRequest::WithdrawListing { listing_id } => {
                self.listings.withdraw(listing_id, actor.id)?;
                Ok(ApiResponse::Ack)
            }
            ApiRequest::Purchase { listing_id, quantity } => {
                let order = self.service.purchase(actor, listing_id, quantity)?;
                Ok(ApiResponse::Order(OrderView::build(&order, None)))
            }
            ApiRequest::ConfirmPayment { order_id } => {
                // Stand-in for the payment-provider callback; the caller
                // must still be the order's buyer.
                let order = self.service.order_for(actor, order_id)?;
                if order.buyer != actor.id {
                    return Err(ApiError {
                        kind: crate::api::ApiErrorKind::Forbidden,
                        message: "only the buyer completes payment".to_string(),
                        field: None,
                        incident: None,
                    });
                }
                let order = self.service.confirm_payment(order_id)?;
                let transfer = self.service.transfer_for(actor, order_id).ok();
                Ok(ApiResponse::Order(OrderView::build(&order, transfer.as_ref())))
            }
            ApiRequest::CancelOrder { order_id } => {
                let order = self.service.cancel_pending(actor, order_id)?;
                Ok(ApiResponse::Order(OrderView::build(&order, None)))
            }
            ApiRequest::Transfer { order_id, action } => self.transfer(actor, order_id, action),
            ApiRequest::GetOrders { page } => {
                let orders = self.service.orders_for(actor, page.resolve());
                Ok(ApiResponse::Orders(self.order_views(orders, actor)))
            }
            ApiRequest::GetOrder { order_id } => {
                let order = self.service.order_for(actor, order_id)?;
                let transfer = self.service.transfer_for(actor, order_id).ok();
                Ok(ApiResponse::Order(OrderView::build(&order, transfer.as_ref())))
            }
            ApiRequest::Dispute { dispute_id, action } => match action {
                DisputeAction::Respond { statement, evidence } => {
                    let dispute =
                        self.service.respond_dispute(actor, dispute_id, statement, evidence)?;
                    Ok(ApiResponse::Dispute(DisputeView::from(&dispute)))
                }
                DisputeAction::AddEvidence { url } => {
                    let dispute = self.service.add_dispute_evidence(actor, dispute_id, url)?;
                    Ok(ApiResponse::Dispute(DisputeView::from(&dispute)))
                }
            },
            ApiRequest::GetDisputes { page } => {
                let disputes = self.service.disputes_for(actor, page.resolve());
                Ok(ApiResponse::Disputes(disputes.map(|d| DisputeView::from(&d))))
            }
            ApiRequest::GetDispute { dispute_id } => {
                let dispute = self.service.dispute_for(actor, dispute_id)?;
                Ok(ApiResponse::Dispute(DisputeView::from(&dispute)))
            }
            ApiRequest::PostMessage { order_id, body } => {
                let message = self.service.post_message(actor, order_id, body)?;
                Ok(ApiResponse::Message(MessageView::from(&message)))
            }
            ApiRequest::GetThread { order_id } => {
                let thread = self.service.thread_for(actor, order_id)?;
                Ok(ApiResponse::Thread {
                    messages: thread.iter().map(MessageView::from).collect(),
                })
            }
            ApiRequest::VerifyUpload { listing_id, kind, url } => {
                self.require_listing_owner(actor, listing_id)?;
                let (request, first) = self.verify.upload_proof(listing_id, actor.id, kind, url)?;
                if first {
                    // First proof of a cycle: the listing shows as pending.
                    self.listings
                        .set_verification_level(listing_id, VerificationLevel::Pending)?;
                }
                Ok(ApiResponse::Verification(VerificationView::from(&request)))
            }
            ApiRequest::VerifyDetails { listing_id, details } => {
                self.require_listing_owner(actor, listing_id)?;
                let request = self.verify.set_details(listing_id, details)?;
                Ok(ApiResponse::Verification(VerificationView::from(&request)))
            }
            ApiRequest::VerifyFraudCheck { listing_id } => {
                self.require_listing_owner(actor, listing_id)?;
                let request = self.verify.run_fraud_check(listing_id, self.oracle.as_ref())?;
                Ok(ApiResponse::Verification(VerificationView::from(&request)))
            }
            ApiRequest::VerifySubmit { listing_id } => {
                self.require_listing_owner(actor, listing_id)?;
                let request = self.verify.submit(listing_id)?;
                Ok(ApiResponse::Verification(VerificationView::from(&request)))
            }
            ApiRequest::VerifyResubmit { listing_id } => {
                self.require_listing_owner(actor, listing_id)?;
                let request = self.verify.resubmit(listing_id)?;
                self.listings
                    .set_verification_level(listing_id, VerificationLevel::Pending)?;
                Ok(ApiResponse::Verification(VerificationView::from(&request)))
            }
            ApiRequest::VerificationQueue => {
                require_role(actor, Role::Reviewer)?;
                let queue = self.verify.queue();
                Ok(ApiResponse::VerificationQueue {
                    requests: queue.iter().map(VerificationView::from).collect(),
                })
            }
            ApiRequest::AdminVerify { request_id, decision } => {
                require_role(actor, Role::Reviewer)?;
                self.admin_verify(actor, request_id, decision)
            }
            ApiRequest::EscalateDispute { dispute_id } => {
                let dispute = self.service.escalate_dispute(actor, dispute_id)?;
                Ok(ApiResponse::Dispute(DisputeView::from(&dispute)))
            }
            ApiRequest::ResolveDispute { dispute_id, resolution } => {
                let (order, dispute) =
                    self.service.resolve_dispute(actor, dispute_id, &resolution.into())?;
                info!(order_id = %order.id, dispute_id = %dispute.id, "dispute resolved via gateway");
                Ok(ApiResponse::Dispute(DisputeView::from(&dispute)))
            }
        }
    }

    fn create_listing(
        &self,
        actor: &Actor,
        body: CreateListingBody,
    ) -> Result<ApiResponse, ApiError> {
        require_role(actor, Role::Seller)?;
        let listing = self.listings.create(NewListing {
            seller: actor.id,
            seller_tier: self.tiers.tier_of(actor),
            event_name: body.event_name,
            venue: body.venue,
            event_date: body.event_date,
            ticket_type: body.ticket_type,
            quantity: body.quantity,
            original_price: body.original_price,
            asking_price: body.asking_price,
        })?;
        Ok(ApiResponse::Listing(ListingView::from(&listing)))
    }

    fn transfer(
        &self,
        actor: &Actor,
        order_id: relist_core::OrderId,
        action: TransferAction,
    ) -> Result<ApiResponse, ApiError> {
        match action {
            TransferAction::SubmitProof { proof_urls, notes } => {
                let order = self.service.submit_proof(actor, order_id, proof_urls, notes)?;
                let transfer = self.service.transfer_for(actor, order_id).ok();
                Ok(ApiResponse::Order(OrderView::build(&order, transfer.as_ref())))
            }
            TransferAction::ConfirmReceipt => {
                let order = self.service.confirm_receipt(actor, order_id)?;
                let transfer = self.service.transfer_for(actor, order_id).ok();
                Ok(ApiResponse::Order(OrderView::build(&order, transfer.as_ref())))
            }
            TransferAction::ReportIssue { reason, notes } => {
                let (order, _dispute) = self.service.report_issue(actor, order_id, reason, notes)?;
                let transfer = self.service.transfer_for(actor, order_id).ok();
                Ok(ApiResponse::Order(OrderView::build(&order, transfer.as_ref())))
            }
        }
    }

    fn admin_verify(
        &self,
        reviewer: &Actor,
        request_id: relist_core::RequestId,
        decision: VerifyDecision,
    ) -> Result<ApiResponse, ApiError> {
        let (request, decision_label, new_level) = match decision {
            VerifyDecision::Approve { level } => {
                let request = self.verify.approve(request_id, reviewer.id, level)?;
                (request, level.to_string(), Some(level))
            }
            VerifyDecision::Reject { reason, note } => {
                let request = self.verify.reject(request_id, reviewer.id, reason, note)?;
                // The listing drops back to unverified until a new cycle.
                (request, "rejected".to_string(), Some(VerificationLevel::Unverified))
            }
            VerifyDecision::Flag { note } => {
                let request = self.verify.flag(request_id, reviewer.id, note)?;
                (request, "flagged".to_string(), None)
            }
        };
        if let Some(level) = new_level {
            self.listings.set_verification_level(request.listing_id, level)?;
        }
        self.audit.log(&AuditEvent::verification_decision(
            reviewer.id,
            request.id,
            request.listing_id,
            decision_label,
        ));
        Ok(ApiResponse::Verification(VerificationView::from(&request)))
    }

    fn require_listing_owner(&self, actor: &Actor, listing_id: ListingId) -> Result<(), ApiError> {
        let listing = self.listings.get(listing_id)?;
        if listing.seller != actor.id {
            return Err(ApiError {
                kind: crate::api::ApiErrorKind::Forbidden,
                message: "only the owning seller may verify this listing".to_string(),
                field: None,
                incident: None,
            });
        }
        Ok(())
    }

    fn order_views(
        &self,
        orders: Page<relist_escrow::Order>,
        actor: &Actor,
    ) -> Page<OrderView> {
        // Transfers fetched per order; misses are normal for pending orders.
        let views: Vec<OrderView> = orders
            .items
            .iter()
            .map(|order| {
                let transfer = self.service.transfer_for(actor, order.id).ok();
                OrderView::build(order, transfer.as_ref())
            })
            .collect();
        Page {
            items: views,
            page: orders.page,
            limit: orders.limit,
            total: orders.total,
            total_pages: orders.total_pages,
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::rate_limit::{FixedWindowLimiter, UnlimitedLimiter};
    use chrono::{Duration, Utc};
    use relist_audit::NoopAuditLogger;
    use relist_core::Money;
    use relist_escrow::NoopNotifier;
    use relist_payment::{MemoryRail, PaymentRail};
    use relist_verify::RuleOracle;

    struct Harness {
        gateway: Gateway,
    }

    fn gateway_with_limiter(limiter: Arc<dyn RateLimiter>) -> Harness {
        let listings = Arc::new(ListingStore::new());
        let rail: Arc<dyn PaymentRail> = Arc::new(MemoryRail::new());
        let service = Arc::new(
            EscrowService::new(Arc::clone(&listings), rail)
                .with_audit(Arc::new(NoopAuditLogger::new()))
                .with_notifier(Arc::new(NoopNotifier::new())),
        );
        let gateway = Gateway::new(
            TokenRegistry::new(),
            limiter,
            listings,
            Arc::new(VerificationStore::new()),
            Arc::new(RuleOracle::new()),
            service,
            Arc::new(StaticTier(SellerTier::Trusted)),
            Arc::new(NoopAuditLogger::new()),
        );
        Harness { gateway }
    }

    fn harness() -> Harness {
        gateway_with_limiter(Arc::new(UnlimitedLimiter))
    }

    fn listing_body() -> CreateListingBody {
        CreateListingBody {
            event_name: "Warehouse Project".to_string(),
            venue: "Depot Mayfield".to_string(),
            event_date: Utc::now() + Duration::days(30),
            ticket_type: "ga".to_string(),
            quantity: 2,
            original_price: Money::from_pounds(20),
            asking_price: Money::from_pounds(28),
        }
    }

    fn create_listing(h: &Harness, token: &str) -> ListingView {
        match h.gateway.handle(token, ApiRequest::CreateListing(listing_body())).unwrap() {
            ApiResponse::Listing(view) => view,
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let h = harness();
        let err = h
            .gateway
            .handle("Bearer nobody", ApiRequest::VerificationQueue)
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    }

    #[test]
    fn listing_create_requires_seller_role() {
        let h = harness();
        h.gateway.tokens().issue_role("buyer-token-1", Role::Buyer).unwrap();
        let err = h
            .gateway
            .handle("buyer-token-1", ApiRequest::CreateListing(listing_body()))
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Forbidden);
    }

    #[test]
    fn markup_violation_is_a_400() {
        let h = harness();
        h.gateway.tokens().issue_role("seller-token-1", Role::Seller).unwrap();
        let mut body = listing_body();
        body.asking_price = Money::from_pounds(31);
        let err = h
            .gateway
            .handle("seller-token-1", ApiRequest::CreateListing(body))
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn full_purchase_flow_through_the_gateway() {
        let h = harness();
        h.gateway.tokens().issue_role("seller-token-1", Role::Seller).unwrap();
        h.gateway.tokens().issue_role("buyer-token-1", Role::Buyer).unwrap();

        let listing = create_listing(&h, "seller-token-1");

        let order = match h
            .gateway
            .handle("buyer-token-1", ApiRequest::Purchase { listing_id: listing.id, quantity: 1 })
            .unwrap()
        {
            ApiResponse::Order(view) => view,
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(order.status, "pending");
        assert_eq!(order.total, Money::from_pence(3150));

        h.gateway
            .handle("buyer-token-1", ApiRequest::ConfirmPayment { order_id: order.id })
            .unwrap();

        h.gateway
            .handle(
                "seller-token-1",
                ApiRequest::Transfer {
                    order_id: order.id,
                    action: TransferAction::SubmitProof {
                        proof_urls: vec!["https://cdn.x.example/p.png".to_string()],
                        notes: None,
                    },
                },
            )
            .unwrap();

        let done = match h
            .gateway
            .handle(
                "buyer-token-1",
                ApiRequest::Transfer { order_id: order.id, action: TransferAction::ConfirmReceipt },
            )
            .unwrap()
        {
            ApiResponse::Order(view) => view,
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(done.status, "completed");
        assert!(done.timeline.len() >= 4);
    }

    #[test]
    fn verification_pipeline_through_the_gateway() {
        let h = harness();
        h.gateway.tokens().issue_role("seller-token-1", Role::Seller).unwrap();
        h.gateway.tokens().issue_role("reviewer-tok-1", Role::Reviewer).unwrap();
        let listing = create_listing(&h, "seller-token-1");

        for kind in [
            relist_verify::ProofKind::ConfirmationEmail,
            relist_verify::ProofKind::TicketScreenshot,
        ] {
            h.gateway
                .handle(
                    "seller-token-1",
                    ApiRequest::VerifyUpload {
                        listing_id: listing.id,
                        kind,
                        url: format!("https://cdn.x.example/{kind}.png"),
                    },
                )
                .unwrap();
        }
        // First upload flipped the listing to pending.
        let pending = match h
            .gateway
            .handle("seller-token-1", ApiRequest::GetListing { listing_id: listing.id })
            .unwrap()
        {
            ApiResponse::Listing(view) => view,
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(pending.verification_level, VerificationLevel::Pending);

        h.gateway
            .handle(
                "seller-token-1",
                ApiRequest::VerifyDetails {
                    listing_id: listing.id,
                    details: relist_verify::ConfirmationDetails {
                        order_reference: "SKDL-1".to_string(),
                        purchaser_email: "s@example.com".to_string(),
                        platform: "Skiddle".to_string(),
                        transfer_code: Some("TX".to_string()),
                    },
                },
            )
            .unwrap();
        h.gateway
            .handle("seller-token-1", ApiRequest::VerifyFraudCheck { listing_id: listing.id })
            .unwrap();
        h.gateway
            .handle("seller-token-1", ApiRequest::VerifySubmit { listing_id: listing.id })
            .unwrap();

        // Sellers cannot see the queue.
        assert_eq!(
            h.gateway
                .handle("seller-token-1", ApiRequest::VerificationQueue)
                .unwrap_err()
                .kind,
            ApiErrorKind::Forbidden
        );

        let queue = match h.gateway.handle("reviewer-tok-1", ApiRequest::VerificationQueue).unwrap()
        {
            ApiResponse::VerificationQueue { requests } => requests,
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(queue.len(), 1);

        h.gateway
            .handle(
                "reviewer-tok-1",
                ApiRequest::AdminVerify {
                    request_id: queue[0].id,
                    decision: VerifyDecision::Approve { level: VerificationLevel::Verified },
                },
            )
            .unwrap();

        let verified = match h
            .gateway
            .handle("seller-token-1", ApiRequest::GetListing { listing_id: listing.id })
            .unwrap()
        {
            ApiResponse::Listing(view) => view,
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(verified.verification_level, VerificationLevel::Verified);
    }

    #[test]
    fn verify_upload_requires_listing_owner() {
        let h = harness();
        h.gateway.tokens().issue_role("seller-token-1", Role::Seller).unwrap();
        h.gateway.tokens().issue_role("seller-token-2", Role::Seller).unwrap();
        let listing = create_listing(&h, "seller-token-1");

        let err = h
            .gateway
            .handle(
                "seller-token-2",
                ApiRequest::VerifyUpload {
                    listing_id: listing.id,
                    kind: relist_verify::ProofKind::ConfirmationEmail,
                    url: "https://cdn.x.example/a.png".to_string(),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Forbidden);
    }

    #[test]
    fn rate_limit_surfaces_as_429() {
        let h = gateway_with_limiter(Arc::new(FixedWindowLimiter::new(
            1,
            std::time::Duration::from_secs(60),
        )));
        h.gateway.tokens().issue_role("buyer-token-1", Role::Buyer).unwrap();
        h.gateway
            .handle("buyer-token-1", ApiRequest::GetOrders { page: Default::default() })
            .unwrap();
        let err = h
            .gateway
            .handle("buyer-token-1", ApiRequest::GetOrders { page: Default::default() })
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::RateLimited);
        assert_eq!(err.status_code(), 429);
    }

    #[test]
    fn get_listing_bumps_view_count() {
        let h = harness();
        h.gateway.tokens().issue_role("seller-token-1", Role::Seller).unwrap();
        h.gateway.tokens().issue_role("buyer-token-1", Role::Buyer).unwrap();
        let listing = create_listing(&h, "seller-token-1");

        for _ in 0..3 {
            h.gateway
                .handle("buyer-token-1", ApiRequest::GetListing { listing_id: listing.id })
                .unwrap();
        }
        let viewed = match h
            .gateway
            .handle("buyer-token-1", ApiRequest::GetListing { listing_id: listing.id })
            .unwrap()
        {
            ApiResponse::Listing(view) => view,
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(viewed.view_count, 4);
    }
}
