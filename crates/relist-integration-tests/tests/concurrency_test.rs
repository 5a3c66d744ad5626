//! Concurrency properties: no oversell under racing purchases, and
//! exactly-one-winner semantics for racing transitions.

use std::sync::Arc;

use chrono::{Duration, Utc};
use relist_audit::NoopAuditLogger;
use relist_core::{Actor, ActorId, Money, Role};
use relist_escrow::{EscrowError, EscrowService, NoopNotifier, OrderStatus};
use relist_listings::{ListingStore, NewListing};
use relist_payment::{MemoryRail, PaymentRail};
use relist_pricing::SellerTier;

fn service_with_listing(quantity: u32) -> (Arc<EscrowService>, relist_core::ListingId, Actor) {
    let listings = Arc::new(ListingStore::new());
    let rail = Arc::new(MemoryRail::new());
    let seller = Actor::new(ActorId::new(), Role::Seller);
    let listing = listings
        .create(NewListing {
            seller: seller.id,
            seller_tier: SellerTier::Trusted,
            event_name: "Boiler Room".to_string(),
            venue: "somewhere secret".to_string(),
            event_date: Utc::now() + Duration::days(7),
            ticket_type: "ga".to_string(),
            quantity,
            original_price: Money::from_pounds(20),
            asking_price: Money::from_pounds(25),
        })
        .expect("listing");
    let service = Arc::new(
        EscrowService::new(listings, rail as Arc<dyn PaymentRail>)
            .with_audit(Arc::new(NoopAuditLogger::new()))
            .with_notifier(Arc::new(NoopNotifier::new())),
    );
    (service, listing.id, seller)
}

#[test]
fn two_buyers_one_ticket_exactly_one_wins() {
    let (service, listing_id, _) = service_with_listing(1);

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = Arc::clone(&service);
        let buyer = Actor::new(ActorId::new(), Role::Buyer);
        handles.push(std::thread::spawn(move || service.purchase(&buyer, listing_id, 1)));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one purchase must succeed");
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(EscrowError::Listing(_)))),
        "the loser must see a listing rejection"
    );
}

#[test]
fn many_buyers_never_oversell() {
    let (service, listing_id, _) = service_with_listing(3);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        let buyer = Actor::new(ActorId::new(), Role::Buyer);
        handles.push(std::thread::spawn(move || service.purchase(&buyer, listing_id, 1)));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 3, "wins must equal available inventory");
}

#[test]
fn racing_payment_confirmations_have_one_winner() {
    let (service, listing_id, _) = service_with_listing(1);
    let buyer = Actor::new(ActorId::new(), Role::Buyer);
    let order = service.purchase(&buyer, listing_id, 1).expect("purchase");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = Arc::clone(&service);
        let order_id = order.id;
        handles.push(std::thread::spawn(move || service.confirm_payment(order_id)));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(EscrowError::StateConflict { .. })))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 3);

    // Exactly one capture happened: version bumped once.
    let order = service.order_for(&buyer, order.id).expect("view");
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.version, 1);
}

#[test]
fn racing_receipt_and_issue_report_are_exclusive() {
    let (service, listing_id, seller) = service_with_listing(1);
    let seller = Actor::new(seller.id, Role::Seller);
    let buyer = Actor::new(ActorId::new(), Role::Buyer);

    let order = service.purchase(&buyer, listing_id, 1).expect("purchase");
    service.confirm_payment(order.id).expect("capture");
    service
        .submit_proof(&seller, order.id, vec!["https://x/p".to_string()], None)
        .expect("proof");

    let confirm = {
        let service = Arc::clone(&service);
        let buyer = buyer.clone();
        let order_id = order.id;
        std::thread::spawn(move || service.confirm_receipt(&buyer, order_id).map(|o| o.status))
    };
    let report = {
        let service = Arc::clone(&service);
        let buyer = buyer.clone();
        let order_id = order.id;
        std::thread::spawn(move || {
            service
                .report_issue(
                    &buyer,
                    order_id,
                    relist_dispute::DisputeReason::Other,
                    "changed my mind".to_string(),
                )
                .map(|(o, _)| o.status)
        })
    };

    let results = [confirm.join().expect("join"), report.join().expect("join")];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "receipt and issue report are mutually exclusive");

    let order = service.order_for(&buyer, order.id).expect("view");
    assert!(
        order.status == OrderStatus::Completed || order.status == OrderStatus::Disputed,
        "order must land in exactly one branch, found {}",
        order.status
    );
}
