//! Deadline-driven transitions: seller default, buyer inaction, dispute
//! escalation, and sweep idempotence (spec scenarios C and D).

use std::sync::Arc;

use chrono::{Duration, Utc};
use relist_audit::NoopAuditLogger;
use relist_core::{Actor, ActorId, Money, Role};
use relist_dispute::{DisputeReason, DisputeStatus, Resolution};
use relist_escrow::{
    DeadlineSweep, EscrowConfig, EscrowService, NoopNotifier, OrderStatus, TransferStatus,
};
use relist_listings::{ListingStore, NewListing};
use relist_payment::{MemoryRail, PaymentRail};
use relist_pricing::SellerTier;

struct World {
    service: Arc<EscrowService>,
    rail: Arc<MemoryRail>,
    buyer: Actor,
    seller: Actor,
    reviewer: Actor,
    listing_id: relist_core::ListingId,
}

/// Zero TTLs: every deadline has lapsed by `now + ε`.
fn world() -> World {
    let listings = Arc::new(ListingStore::new());
    let rail = Arc::new(MemoryRail::new());
    let seller = Actor::new(ActorId::new(), Role::Seller);
    let listing = listings
        .create(NewListing {
            seller: seller.id,
            seller_tier: SellerTier::Trusted,
            event_name: "Circoloco".to_string(),
            venue: "DC-10".to_string(),
            event_date: Utc::now() + Duration::days(14),
            ticket_type: "ga".to_string(),
            quantity: 4,
            original_price: Money::from_pounds(20),
            asking_price: Money::from_pounds(28),
        })
        .expect("listing");
    let service = Arc::new(
        EscrowService::new(listings, rail.clone() as Arc<dyn PaymentRail>)
            .with_config(EscrowConfig {
                seller_proof_ttl: Duration::zero(),
                buyer_response_ttl: Duration::zero(),
                dispute_response_ttl: Duration::zero(),
                ..Default::default()
            })
            .with_audit(Arc::new(NoopAuditLogger::new()))
            .with_notifier(Arc::new(NoopNotifier::new())),
    );
    World {
        service,
        rail,
        buyer: Actor::new(ActorId::new(), Role::Buyer),
        seller,
        reviewer: Actor::new(ActorId::new(), Role::Reviewer),
        listing_id: listing.id,
    }
}

fn later() -> chrono::DateTime<Utc> {
    Utc::now() + Duration::seconds(10)
}

// ============================================================================
// Scenario C: seller never submits proof
// ============================================================================

#[test]
fn scenario_c_seller_default_full_refund() {
    let w = world();
    let order = w.service.purchase(&w.buyer, w.listing_id, 1).expect("purchase");
    w.service.confirm_payment(order.id).expect("capture");

    let sweep = DeadlineSweep::new(Arc::clone(&w.service));
    let report = sweep.run_once(later());
    assert_eq!(report.seller_defaults, 1);

    let order = w.service.order_for(&w.buyer, order.id).expect("view");
    assert_eq!(order.status, OrderStatus::Cancelled);

    // Buyer fully refunded, fees included; seller got nothing.
    assert_eq!(w.rail.refunded_to(w.buyer.id), Money::from_pence(3150));
    assert_eq!(w.rail.paid_to(w.seller.id), Money::ZERO);

    // The transfer record stays at awaiting_proof.
    let transfer = w.service.transfer_for(&w.buyer, order.id).expect("transfer");
    assert_eq!(transfer.status, TransferStatus::AwaitingProof);

    // The cancellation is recorded as system-initiated.
    assert!(order.history.last().expect("history").by_system);
}

// ============================================================================
// Sweep idempotence
// ============================================================================

#[test]
fn sweep_replay_is_a_no_op() {
    let w = world();
    let order = w.service.purchase(&w.buyer, w.listing_id, 1).expect("purchase");
    w.service.confirm_payment(order.id).expect("capture");

    let sweep = DeadlineSweep::new(Arc::clone(&w.service));
    let first = sweep.run_once(later());
    assert_eq!(first.seller_defaults, 1);

    let before = w.service.order_for(&w.buyer, order.id).expect("view");

    // Replay twice; no counter moves, no state changes, no double refund.
    for _ in 0..2 {
        let replay = sweep.run_once(later());
        assert!(replay.is_empty());
    }
    let after = w.service.order_for(&w.buyer, order.id).expect("view");
    assert_eq!(after.version, before.version);
    assert_eq!(after.history.len(), before.history.len());
    assert_eq!(w.rail.refunded_to(w.buyer.id), Money::from_pence(3150));
}

// ============================================================================
// Scenario D: issue report → escalation → partial resolution
// ============================================================================

#[test]
fn scenario_d_partial_resolution_after_seller_silence() {
    let w = world();
    let order = w.service.purchase(&w.buyer, w.listing_id, 1).expect("purchase");
    w.service.confirm_payment(order.id).expect("capture");
    w.service
        .submit_proof(&w.seller, order.id, vec!["https://x/p".to_string()], None)
        .expect("proof");

    let (order, dispute) = w
        .service
        .report_issue(
            &w.buyer,
            order.id,
            DisputeReason::InvalidTicket,
            "the code had already been scanned".to_string(),
        )
        .expect("issue");
    assert_eq!(order.status, OrderStatus::Disputed);
    assert_eq!(dispute.status, DisputeStatus::AwaitingSeller);

    // Seller stays silent; the sweep escalates the dispute.
    let sweep = DeadlineSweep::new(Arc::clone(&w.service));
    let report = sweep.run_once(later());
    assert_eq!(report.disputes_escalated, 1);
    let dispute_now = w.service.dispute_for(&w.reviewer, dispute.id).expect("view");
    assert_eq!(dispute_now.status, DisputeStatus::Escalated);

    // Reviewer binds a partial split: refund £15.00, payout £10.25.
    let (order, closed) = w
        .service
        .resolve_dispute(
            &w.reviewer,
            dispute.id,
            &Resolution::partial(
                Money::from_pence(1500),
                Money::from_pence(1025),
                "seller silent; ticket partially usable",
            ),
        )
        .expect("resolution");

    assert_eq!(order.status, OrderStatus::Refunded);
    assert_eq!(closed.status, DisputeStatus::Closed);
    assert_eq!(closed.refund_amount, Some(Money::from_pence(1500)));
    assert_eq!(closed.seller_payout_amount, Some(Money::from_pence(1025)));
    assert_eq!(w.rail.refunded_to(w.buyer.id), Money::from_pence(1500));
    assert_eq!(w.rail.paid_to(w.seller.id), Money::from_pence(1025));

    // The split stayed inside the pool: total − platform fee.
    let moved = Money::from_pence(1500 + 1025);
    assert!(moved <= order.total.checked_sub(order.platform_fee).expect("pool"));
}

// ============================================================================
// Buyer inaction (auto-confirm default)
// ============================================================================

#[test]
fn buyer_inaction_releases_payout_and_is_marked_system() {
    let w = world();
    let order = w.service.purchase(&w.buyer, w.listing_id, 1).expect("purchase");
    w.service.confirm_payment(order.id).expect("capture");
    w.service
        .submit_proof(&w.seller, order.id, vec!["https://x/p".to_string()], None)
        .expect("proof");

    let sweep = DeadlineSweep::new(Arc::clone(&w.service));
    let report = sweep.run_once(later());
    assert_eq!(report.buyer_inaction, 1);

    let order = w.service.order_for(&w.buyer, order.id).expect("view");
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(w.rail.paid_to(w.seller.id), Money::from_pence(2520));

    // Both the auto-confirm and the payout release are system-initiated.
    let system_steps = order.history.iter().filter(|c| c.by_system).count();
    assert_eq!(system_steps, 2);

    assert!(sweep.run_once(later()).is_empty());
}

// ============================================================================
// Deadline transitions are reversible only through the dispute path
// ============================================================================

#[test]
fn cancelled_order_stays_cancelled() {
    let w = world();
    let order = w.service.purchase(&w.buyer, w.listing_id, 1).expect("purchase");
    w.service.confirm_payment(order.id).expect("capture");
    DeadlineSweep::new(Arc::clone(&w.service)).run_once(later());

    // The seller cannot resurrect the order with late proof.
    let err = w
        .service
        .submit_proof(&w.seller, order.id, vec!["https://x/late.png".to_string()], None)
        .expect_err("late proof");
    assert!(matches!(err, relist_escrow::EscrowError::StateConflict { .. }));
}
