//! End-to-end tests for the escrow order lifecycle.
//!
//! Covers the complete flow of a resale:
//! 1. Seller lists tickets (pricing gates applied)
//! 2. Buyer purchases into escrow
//! 3. Payment capture and transfer proof
//! 4. Receipt confirmation and payout release
//! 5. Money conservation at every step

use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use relist_audit::NoopAuditLogger;
use relist_core::{Actor, ActorId, Money, Role};
use relist_escrow::{EscrowService, NoopNotifier, OrderStatus, TransferStatus};
use relist_listings::{ListingError, ListingStore, NewListing};
use relist_payment::{MemoryRail, PaymentRail};
use relist_pricing::{FeeSchedule, PricingError, SellerTier, quote};

// ============================================================================
// Helpers
// ============================================================================

struct World {
    service: Arc<EscrowService>,
    listings: Arc<ListingStore>,
    rail: Arc<MemoryRail>,
    buyer: Actor,
    seller: Actor,
}

fn world() -> World {
    let listings = Arc::new(ListingStore::new());
    let rail = Arc::new(MemoryRail::new());
    let service = Arc::new(
        EscrowService::new(Arc::clone(&listings), rail.clone() as Arc<dyn PaymentRail>)
            .with_audit(Arc::new(NoopAuditLogger::new()))
            .with_notifier(Arc::new(NoopNotifier::new())),
    );
    World {
        service,
        listings,
        rail,
        buyer: Actor::new(ActorId::new(), Role::Buyer),
        seller: Actor::new(ActorId::new(), Role::Seller),
    }
}

fn list(world: &World, original_pence: u64, asking_pence: u64, quantity: u32) -> Result<relist_listings::Listing, ListingError> {
    world.listings.create(NewListing {
        seller: world.seller.id,
        seller_tier: SellerTier::Trusted,
        event_name: "Warehouse Project".to_string(),
        venue: "Depot Mayfield".to_string(),
        event_date: Utc::now() + Duration::days(21),
        ticket_type: "general admission".to_string(),
        quantity,
        original_price: Money::from_pence(original_pence),
        asking_price: Money::from_pence(asking_pence),
    })
}

// ============================================================================
// Scenario A: £20.00 original, £28.00 asking, qty 1
// ============================================================================

#[test]
fn scenario_a_exact_fee_breakdown() {
    let w = world();
    let listing = list(&w, 2000, 2800, 1).expect("listing");
    let order = w.service.purchase(&w.buyer, listing.id, 1).expect("purchase");

    assert_eq!(order.subtotal, Money::from_pence(2800));
    assert_eq!(order.platform_fee, Money::from_pence(280));
    assert_eq!(order.buyer_protection_fee, Money::from_pence(70));
    assert_eq!(order.total, Money::from_pence(3150));
    assert_eq!(order.seller_payout, Money::from_pence(2520));
}

// ============================================================================
// Scenario B: £20.00 original, £31.00 asking — 55% markup rejected
// ============================================================================

#[test]
fn scenario_b_over_markup_rejected_without_writes() {
    let w = world();
    let err = list(&w, 2000, 3100, 1).expect_err("should reject");
    match err {
        ListingError::Pricing(PricingError::OverMarkupLimit { max_allowed, .. }) => {
            assert_eq!(max_allowed, Money::from_pence(3000));
        }
        other => panic!("unexpected error: {other}"),
    }
    // No listing was created.
    assert_eq!(
        w.listings
            .search(&Default::default(), Default::default(), Default::default())
            .total,
        0
    );
}

// ============================================================================
// Full lifecycle
// ============================================================================

#[test]
fn full_lifecycle_pending_to_completed() {
    let w = world();
    let listing = list(&w, 2000, 2800, 2).expect("listing");

    let order = w.service.purchase(&w.buyer, listing.id, 1).expect("purchase");
    assert_eq!(order.status, OrderStatus::Pending);

    let order = w.service.confirm_payment(order.id).expect("capture");
    assert_eq!(order.status, OrderStatus::Confirmed);

    let order = w
        .service
        .submit_proof(
            &w.seller,
            order.id,
            vec!["https://cdn.relist.example/handover.png".to_string()],
            Some("transferred through the platform app".to_string()),
        )
        .expect("proof");
    assert_eq!(order.status, OrderStatus::TransferPending);

    let order = w.service.confirm_receipt(&w.buyer, order.id).expect("receipt");
    assert_eq!(order.status, OrderStatus::Completed);

    // The transfer record reflects the buyer's confirmation.
    let transfer = w.service.transfer_for(&w.buyer, order.id).expect("transfer");
    assert_eq!(transfer.status, TransferStatus::Confirmed);

    // Exactly the payout reached the seller; the fees stayed with the
    // platform; the buyer got nothing back.
    assert_eq!(w.rail.paid_to(w.seller.id), Money::from_pence(2520));
    assert_eq!(w.rail.refunded_to(w.buyer.id), Money::ZERO);

    // Timeline covers every status in order.
    let statuses: Vec<OrderStatus> = order.history.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::TransferPending,
            OrderStatus::Transferred,
            OrderStatus::Completed,
        ]
    );
    assert!(order.history.iter().all(|c| !c.by_system));
}

#[test]
fn no_completion_without_confirmation_and_transfer() {
    let w = world();
    let listing = list(&w, 2000, 2800, 1).expect("listing");
    let order = w.service.purchase(&w.buyer, listing.id, 1).expect("purchase");

    // Straight to receipt confirmation from pending: conflict.
    assert!(w.service.confirm_receipt(&w.buyer, order.id).is_err());

    // Proof before capture: conflict.
    assert!(
        w.service
            .submit_proof(&w.seller, order.id, vec!["https://x/p".to_string()], None)
            .is_err()
    );

    // The order never moved.
    let order = w.service.order_for(&w.buyer, order.id).expect("view");
    assert_eq!(order.status, OrderStatus::Pending);
}

#[test]
fn purchase_rejects_excess_quantity() {
    let w = world();
    let listing = list(&w, 2000, 2800, 2).expect("listing");
    let err = w.service.purchase(&w.buyer, listing.id, 3).expect_err("oversell");
    assert!(matches!(
        err,
        relist_escrow::EscrowError::Listing(ListingError::InsufficientQuantity { .. })
    ));
    // Nothing was reserved or held.
    assert_eq!(w.listings.get(listing.id).expect("listing").quantity, 2);
}

// ============================================================================
// Conservation properties
// ============================================================================

proptest! {
    #[test]
    fn fees_conserve_to_the_cent(
        original in 100u64..100_000,
        asking in 100u64..100_000,
        qty in 1u32..10,
    ) {
        let schedule = FeeSchedule::default();
        let q = quote(
            Money::from_pence(original),
            Money::from_pence(asking),
            qty,
            &schedule,
        ).expect("quote");

        prop_assert_eq!(
            q.seller_receives.checked_add(q.platform_fee).expect("no overflow"),
            q.subtotal
        );
        prop_assert_eq!(
            q.subtotal
                .checked_add(q.platform_fee)
                .and_then(|t| t.checked_add(q.buyer_protection_fee))
                .expect("no overflow"),
            q.buyer_total
        );
    }

    #[test]
    fn markup_over_150_percent_always_rejected(
        original in 100u64..50_000,
        over in 1u64..10_000,
    ) {
        let schedule = FeeSchedule::default();
        let max_allowed = schedule.max_allowed_price(Money::from_pence(original));
        let asking = Money::from_pence(max_allowed.pence() + over);
        let q = quote(Money::from_pence(original), asking, 1, &schedule).expect("quote");
        prop_assert!(q.is_over_limit);
    }
}
