//! The escrow operation surface.
//!
//! [`EscrowService`] coordinates the listing registry, payment rail,
//! dispute engine, audit log, and notifier. Every operation here is one
//! guarded transition: actor identity and role first, then the optimistic
//! status precondition, then external side effects inside the commit.

use std::sync::Arc;

use chrono::{Duration, Utc};
use relist_audit::{AuditEvent, AuditLogger, Initiator, Movement, TracingAuditLogger};
use relist_core::{Actor, DisputeId, ListingId, OrderId, Page, PageRequest, Role};
use relist_dispute::{
    Dispute, DisputeError, DisputeReason, DisputeStatus, DisputeStore, OrderFinancials,
    Resolution,
};
use relist_listings::ListingStore;
use relist_payment::PaymentRail;
use relist_pricing::{FeeSchedule, TierCeilings, check_quote};
use tracing::{info, warn};

use crate::error::EscrowError;
use crate::messages::{Message, MessageStore};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::order::{Order, OrderStatus};
use crate::store::OrderStore;
use crate::transfer::{Transfer, TransferStatus};

/// Deadlines and pricing rules for the escrow workflow.
#[derive(Debug, Clone, Copy)]
pub struct EscrowConfig {
    /// Fee schedule used to price orders.
    pub fees: FeeSchedule,
    /// Tier-derived asking-price ceilings, re-checked at purchase.
    pub ceilings: TierCeilings,
    /// How long a seller has to submit transfer proof after confirmation.
    pub seller_proof_ttl: Duration,
    /// How long a buyer has to confirm or report after proof lands.
    pub buyer_response_ttl: Duration,
    /// How long the awaited party has to respond in a dispute.
    pub dispute_response_ttl: Duration,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            ceilings: TierCeilings::default(),
            seller_proof_ttl: Duration::hours(24),
            buyer_response_ttl: Duration::hours(24),
            dispute_response_ttl: Duration::hours(48),
        }
    }
}

/// The escrow order coordinator.
pub struct EscrowService {
    listings: Arc<ListingStore>,
    disputes: Arc<DisputeStore>,
    orders: OrderStore,
    messages: MessageStore,
    rail: Arc<dyn PaymentRail>,
    audit: Arc<dyn AuditLogger>,
    notifier: Arc<dyn Notifier>,
    config: EscrowConfig,
}

impl EscrowService {
    /// Creates a service over a listing registry and payment rail.
    #[must_use]
    pub fn new(listings: Arc<ListingStore>, rail: Arc<dyn PaymentRail>) -> Self {
        Self {
            listings,
            disputes: Arc::new(DisputeStore::new()),
            orders: OrderStore::new(),
            messages: MessageStore::new(),
            rail,
            audit: Arc::new(TracingAuditLogger::new()),
            notifier: Arc::new(TracingNotifier::new()),
            config: EscrowConfig::default(),
        }
    }

    /// Overrides the workflow configuration.
    #[must_use]
    pub fn with_config(mut self, config: EscrowConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the audit backend.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Overrides the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// The dispute store (reviewer queue views).
    #[must_use]
    pub fn disputes(&self) -> &Arc<DisputeStore> {
        &self.disputes
    }

    /// The workflow configuration.
    #[must_use]
    pub const fn config(&self) -> &EscrowConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Purchase
    // ------------------------------------------------------------------

    /// Creates a pending order: validates pricing, reserves inventory
    /// atomically, and authorizes the buyer's payment hold.
    pub fn purchase(
        &self,
        buyer: &Actor,
        listing_id: ListingId,
        quantity: u32,
    ) -> Result<Order, EscrowError> {
        if !buyer.has_role(Role::Buyer) {
            return Err(EscrowError::Forbidden { action: "purchase requires the buyer role" });
        }
        let listing = self.listings.get(listing_id)?;
        if listing.seller == buyer.id {
            return Err(EscrowError::SelfPurchase);
        }

        // Purchase re-runs the same pricing gates as listing creation.
        let quote = check_quote(
            listing.original_price,
            listing.asking_price,
            quantity,
            &self.config.fees,
        )?;
        self.config.ceilings.check(listing.seller_tier, listing.asking_price)?;

        // No oversell: reservation is atomic under the registry lock.
        self.listings.reserve(listing_id, quantity)?;

        let mut order = Order::new(listing_id, buyer.id, listing.seller, quantity, &quote);
        match self.rail.hold(buyer.id, order.total, order.id) {
            Ok(hold) => order.hold = Some(hold),
            Err(e) => {
                // Hand the tickets back before surfacing the failure.
                let _ = self.listings.restore(listing_id, quantity);
                return Err(e.into());
            }
        }

        info!(order_id = %order.id, listing_id = %listing_id, buyer = %buyer.id, total = %order.total, "order created");
        self.audit.log(&AuditEvent::escrow_movement(
            Initiator::User(buyer.id),
            order.id,
            Movement::Hold,
            order.total,
        ));
        self.orders.insert(order.clone());
        self.notifier.notify(order.seller, Notification::OrderPlaced { order_id: order.id });
        Ok(order)
    }

    /// Marks payment captured (payment-provider callback): the order is
    /// confirmed and the seller's proof window opens.
    pub fn confirm_payment(&self, order_id: OrderId) -> Result<Order, EscrowError> {
        let deadline = Utc::now() + self.config.seller_proof_ttl;
        let rail = Arc::clone(&self.rail);
        let order = self.orders.transition(
            order_id,
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            false,
            |order, transfer| {
                let hold = order.hold.ok_or(EscrowError::MissingHold(order.id))?;
                rail.capture(hold)?;
                *transfer = Some(Transfer::new(order.id, deadline));
                Ok(())
            },
        )?;

        self.audit.log(&AuditEvent::escrow_movement(
            Initiator::User(order.buyer),
            order.id,
            Movement::Capture,
            order.total,
        ));
        self.log_transition(&order, OrderStatus::Pending, false, Initiator::User(order.buyer));
        self.notifier
            .notify(order.seller, Notification::PaymentCaptured { order_id: order.id });
        Ok(order)
    }

    /// Buyer abort of a not-yet-captured order. Voids the hold and returns
    /// the tickets to the listing.
    pub fn cancel_pending(&self, buyer: &Actor, order_id: OrderId) -> Result<Order, EscrowError> {
        let existing = self.orders.get(order_id)?;
        if existing.buyer != buyer.id {
            return Err(EscrowError::Forbidden { action: "only the buyer may abort the order" });
        }
        let rail = Arc::clone(&self.rail);
        let order = self.orders.transition(
            order_id,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            false,
            |order, _| {
                let hold = order.hold.ok_or(EscrowError::MissingHold(order.id))?;
                rail.void(hold)?;
                Ok(())
            },
        )?;
        let _ = self.listings.restore(order.listing_id, order.quantity);

        self.audit.log(&AuditEvent::escrow_movement(
            Initiator::User(buyer.id),
            order.id,
            Movement::Void,
            order.total,
        ));
        self.log_transition(&order, OrderStatus::Pending, false, Initiator::User(buyer.id));
        self.notifier
            .notify(order.seller, Notification::OrderCancelled { order_id: order.id });
        Ok(order)
    }

    // ------------------------------------------------------------------
    // Transfer protocol
    // ------------------------------------------------------------------

    /// Seller submits transfer proof; the buyer's response window opens.
    pub fn submit_proof(
        &self,
        seller: &Actor,
        order_id: OrderId,
        urls: Vec<String>,
        notes: Option<String>,
    ) -> Result<Order, EscrowError> {
        if !seller.has_role(Role::Seller) {
            return Err(EscrowError::Forbidden { action: "submit_proof requires the seller role" });
        }
        let existing = self.orders.get(order_id)?;
        if existing.seller != seller.id {
            return Err(EscrowError::Forbidden { action: "only the order's seller may submit proof" });
        }

        let deadline = Utc::now() + self.config.buyer_response_ttl;
        let order = self.orders.transition(
            order_id,
            OrderStatus::Confirmed,
            OrderStatus::TransferPending,
            false,
            |order, transfer| {
                transfer
                    .as_mut()
                    .ok_or(EscrowError::NoTransfer(order.id))?
                    .submit_proof(urls, notes, deadline)
            },
        )?;

        self.log_transition(&order, OrderStatus::Confirmed, false, Initiator::User(seller.id));
        self.notifier
            .notify(order.buyer, Notification::ProofSubmitted { order_id: order.id });
        Ok(order)
    }

    /// Buyer confirms receipt: the transfer completes and the payout is
    /// released. If the release rail call fails, the order stays in
    /// `transferred` and the sweep retries the payout.
    pub fn confirm_receipt(&self, buyer: &Actor, order_id: OrderId) -> Result<Order, EscrowError> {
        if !buyer.has_role(Role::Buyer) {
            return Err(EscrowError::Forbidden { action: "confirm_receipt requires the buyer role" });
        }
        let existing = self.orders.get(order_id)?;
        if existing.buyer != buyer.id {
            return Err(EscrowError::Forbidden { action: "only the order's buyer may confirm receipt" });
        }

        let order = self.orders.transition(
            order_id,
            OrderStatus::TransferPending,
            OrderStatus::Transferred,
            false,
            |order, transfer| {
                transfer
                    .as_mut()
                    .ok_or(EscrowError::NoTransfer(order.id))?
                    .confirm()
            },
        )?;
        self.log_transition(&order, OrderStatus::TransferPending, false, Initiator::User(buyer.id));

        self.release_payout(order_id, Initiator::User(buyer.id), false)
    }

    /// Buyer reports a transfer issue: the order moves to `disputed` and a
    /// dispute opens awaiting the seller's statement.
    pub fn report_issue(
        &self,
        buyer: &Actor,
        order_id: OrderId,
        reason: DisputeReason,
        notes: String,
    ) -> Result<(Order, Dispute), EscrowError> {
        if !buyer.has_role(Role::Buyer) {
            return Err(EscrowError::Forbidden { action: "report_issue requires the buyer role" });
        }
        let existing = self.orders.get(order_id)?;
        if existing.buyer != buyer.id {
            return Err(EscrowError::Forbidden { action: "only the order's buyer may report an issue" });
        }

        let deadline = Utc::now() + self.config.dispute_response_ttl;
        let disputes = Arc::clone(&self.disputes);
        let mut opened: Option<Dispute> = None;
        let order = self.orders.transition(
            order_id,
            OrderStatus::TransferPending,
            OrderStatus::Disputed,
            false,
            |order, transfer| {
                transfer
                    .as_mut()
                    .ok_or(EscrowError::NoTransfer(order.id))?
                    .report_issue()?;
                let dispute = disputes.open_from_issue(
                    order.id,
                    order.buyer,
                    order.seller,
                    reason,
                    notes.clone(),
                    deadline,
                )?;
                opened = Some(dispute);
                Ok(())
            },
        )?;
        let dispute = opened.ok_or(EscrowError::NotFound(order_id))?;

        self.log_transition(&order, OrderStatus::TransferPending, false, Initiator::User(buyer.id));
        self.audit.log(&AuditEvent::dispute_lifecycle(
            Initiator::User(buyer.id),
            dispute.id,
            order.id,
            dispute.status.to_string(),
        ));
        self.notifier.notify(
            order.seller,
            Notification::DisputeOpened { order_id: order.id, dispute_id: dispute.id },
        );
        Ok((order, dispute))
    }

    // ------------------------------------------------------------------
    // Disputes
    // ------------------------------------------------------------------

    /// A party responds with its one statement.
    pub fn respond_dispute(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        statement: String,
        evidence: Vec<String>,
    ) -> Result<Dispute, EscrowError> {
        let dispute = self.disputes.respond(dispute_id, actor.id, statement, evidence)?;
        self.audit.log(&AuditEvent::dispute_lifecycle(
            Initiator::User(actor.id),
            dispute.id,
            dispute.order_id,
            dispute.status.to_string(),
        ));
        let other = if dispute.buyer == actor.id { dispute.seller } else { dispute.buyer };
        self.notifier.notify(
            other,
            Notification::DisputeUpdated { order_id: dispute.order_id, dispute_id: dispute.id },
        );
        Ok(dispute)
    }

    /// A party appends evidence.
    pub fn add_dispute_evidence(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        url: String,
    ) -> Result<Dispute, EscrowError> {
        Ok(self.disputes.add_evidence(dispute_id, actor.id, url)?)
    }

    /// Reviewer moves a reviewed exchange to the binding-resolution stage.
    pub fn escalate_dispute(
        &self,
        reviewer: &Actor,
        dispute_id: DisputeId,
    ) -> Result<Dispute, EscrowError> {
        if !reviewer.has_role(Role::Reviewer) {
            return Err(EscrowError::Forbidden { action: "escalation requires the reviewer role" });
        }
        let dispute = self.disputes.escalate_for_resolution(dispute_id)?;
        self.audit.log(&AuditEvent::dispute_lifecycle(
            Initiator::User(reviewer.id),
            dispute.id,
            dispute.order_id,
            dispute.status.to_string(),
        ));
        Ok(dispute)
    }

    /// Reviewer resolves an escalated dispute: validates the split, moves
    /// the money, transitions the order, and closes the dispute.
    pub fn resolve_dispute(
        &self,
        reviewer: &Actor,
        dispute_id: DisputeId,
        resolution: &Resolution,
    ) -> Result<(Order, Dispute), EscrowError> {
        if !reviewer.has_role(Role::Reviewer) {
            return Err(EscrowError::Forbidden { action: "resolution requires the reviewer role" });
        }
        let dispute = self.disputes.get(dispute_id)?;
        if dispute.status != DisputeStatus::Escalated {
            return Err(DisputeError::StateConflict {
                from: dispute.status.to_string(),
                to: "resolved".to_string(),
            }
            .into());
        }
        let order = self.orders.get(dispute.order_id)?;
        let financials = OrderFinancials {
            total: order.total,
            seller_payout: order.seller_payout,
            platform_fee: order.platform_fee,
        };
        // Pure validation up front; the same split is bound to the dispute
        // after the money moves.
        let split = resolution.split(&financials)?;

        // Any refund ends the order refunded; a pure seller-favor outcome
        // completes it.
        let target = if split.refund.is_zero() {
            OrderStatus::Completed
        } else {
            OrderStatus::Refunded
        };

        let rail = Arc::clone(&self.rail);
        let order = self.orders.transition(
            dispute.order_id,
            OrderStatus::Disputed,
            target,
            false,
            |order, _| {
                let hold = order.hold.ok_or(EscrowError::MissingHold(order.id))?;
                if !split.refund.is_zero() {
                    rail.refund(hold, split.refund)?;
                }
                if !split.seller_payout.is_zero() {
                    rail.release(hold, order.seller, split.seller_payout)?;
                }
                Ok(())
            },
        )?;

        let (resolved, _) = self.disputes.resolve(dispute_id, resolution, &financials)?;
        let closed = self.disputes.close(dispute_id)?;

        if !split.refund.is_zero() {
            self.audit.log(&AuditEvent::escrow_movement(
                Initiator::User(reviewer.id),
                order.id,
                Movement::Refund,
                split.refund,
            ));
        }
        if !split.seller_payout.is_zero() {
            self.audit.log(&AuditEvent::escrow_movement(
                Initiator::User(reviewer.id),
                order.id,
                Movement::Release,
                split.seller_payout,
            ));
        }
        self.log_transition(&order, OrderStatus::Disputed, false, Initiator::User(reviewer.id));
        self.audit.log(&AuditEvent::dispute_lifecycle(
            Initiator::User(reviewer.id),
            resolved.id,
            order.id,
            closed.status.to_string(),
        ));
        for party in [order.buyer, order.seller] {
            self.notifier.notify(
                party,
                Notification::DisputeResolved { order_id: order.id, dispute_id },
            );
        }
        Ok((order, closed))
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Role-scoped order fetch: parties and reviewers only.
    pub fn order_for(&self, actor: &Actor, order_id: OrderId) -> Result<Order, EscrowError> {
        let order = self.orders.get(order_id)?;
        if order.involves(actor.id) || actor.has_role(Role::Reviewer) {
            Ok(order)
        } else {
            Err(EscrowError::Forbidden { action: "order is visible to its parties only" })
        }
    }

    /// Orders the actor is party to, newest first.
    #[must_use]
    pub fn orders_for(&self, actor: &Actor, page: PageRequest) -> Page<Order> {
        self.orders.for_actor(actor.id, page)
    }

    /// Role-scoped transfer fetch.
    pub fn transfer_for(&self, actor: &Actor, order_id: OrderId) -> Result<Transfer, EscrowError> {
        let order = self.order_for(actor, order_id)?;
        self.orders.transfer(order.id)
    }

    /// Role-scoped dispute fetch.
    pub fn dispute_for(&self, actor: &Actor, dispute_id: DisputeId) -> Result<Dispute, EscrowError> {
        let dispute = self.disputes.get(dispute_id)?;
        if dispute.buyer == actor.id || dispute.seller == actor.id || actor.has_role(Role::Reviewer)
        {
            Ok(dispute)
        } else {
            Err(EscrowError::Forbidden { action: "dispute is visible to its parties only" })
        }
    }

    /// Disputes the actor is party to, newest first.
    #[must_use]
    pub fn disputes_for(&self, actor: &Actor, page: PageRequest) -> Page<Dispute> {
        self.disputes.for_actor(actor.id, page)
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Posts to an order thread; parties only.
    pub fn post_message(
        &self,
        actor: &Actor,
        order_id: OrderId,
        body: String,
    ) -> Result<Message, EscrowError> {
        let order = self.orders.get(order_id)?;
        if !order.involves(actor.id) {
            return Err(EscrowError::Forbidden { action: "thread is open to the order's parties only" });
        }
        let message = self.messages.post(order_id, actor.id, body)?;
        let other = if order.buyer == actor.id { order.seller } else { order.buyer };
        self.notifier.notify(other, Notification::MessagePosted { order_id });
        Ok(message)
    }

    /// Reads an order thread; parties and reviewers.
    pub fn thread_for(&self, actor: &Actor, order_id: OrderId) -> Result<Vec<Message>, EscrowError> {
        let order = self.orders.get(order_id)?;
        if !order.involves(actor.id) && !actor.has_role(Role::Reviewer) {
            return Err(EscrowError::Forbidden { action: "thread is open to the order's parties only" });
        }
        Ok(self.messages.thread(order_id))
    }

    // ------------------------------------------------------------------
    // Sweep entry points (system-initiated transitions)
    // ------------------------------------------------------------------

    /// Seller missed the proof deadline: cancel and refund in full.
    pub(crate) fn sweep_cancel_seller_default(&self, order_id: OrderId) -> Result<Order, EscrowError> {
        let rail = Arc::clone(&self.rail);
        let order = self.orders.transition(
            order_id,
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
            true,
            |order, _| {
                let hold = order.hold.ok_or(EscrowError::MissingHold(order.id))?;
                rail.refund(hold, order.total)?;
                Ok(())
            },
        )?;
        let _ = self.listings.restore(order.listing_id, order.quantity);

        warn!(
            order_id = %order.id,
            seller = %order.seller,
            system_initiated = true,
            "seller missed proof deadline; order cancelled with full refund"
        );
        self.audit.log(&AuditEvent::escrow_movement(
            Initiator::System,
            order.id,
            Movement::Refund,
            order.total,
        ));
        self.log_transition(&order, OrderStatus::Confirmed, true, Initiator::System);
        self.notifier.notify(order.buyer, Notification::OrderRefunded { order_id: order.id });
        self.notifier.notify(order.seller, Notification::OrderCancelled { order_id: order.id });
        Ok(order)
    }

    /// Buyer missed the response deadline under the auto-confirm policy:
    /// receipt is deemed confirmed in the seller's favor.
    pub(crate) fn sweep_auto_confirm(&self, order_id: OrderId) -> Result<Order, EscrowError> {
        let order = self.orders.transition(
            order_id,
            OrderStatus::TransferPending,
            OrderStatus::Transferred,
            true,
            |order, transfer| {
                transfer
                    .as_mut()
                    .ok_or(EscrowError::NoTransfer(order.id))?
                    .confirm()
            },
        )?;
        warn!(
            order_id = %order.id,
            buyer = %order.buyer,
            system_initiated = true,
            "buyer inaction at response deadline; receipt auto-confirmed in seller's favor"
        );
        self.log_transition(&order, OrderStatus::TransferPending, true, Initiator::System);
        self.release_payout(order_id, Initiator::System, true)
    }

    /// Buyer missed the response deadline under the escalate policy: a
    /// dispute opens on the seller's behalf instead of auto-confirming.
    pub(crate) fn sweep_escalate_buyer_inaction(&self, order_id: OrderId) -> Result<Order, EscrowError> {
        let deadline = Utc::now() + self.config.dispute_response_ttl;
        let disputes = Arc::clone(&self.disputes);
        let order = self.orders.transition(
            order_id,
            OrderStatus::TransferPending,
            OrderStatus::Disputed,
            true,
            |order, _| {
                disputes.open(
                    order.id,
                    order.buyer,
                    order.seller,
                    relist_dispute::Party::Seller,
                    DisputeReason::Other,
                    "buyer unresponsive after transfer proof".to_string(),
                    "payout pending; buyer did not confirm or report by the deadline".to_string(),
                    deadline,
                )?;
                Ok(())
            },
        )?;
        warn!(
            order_id = %order.id,
            system_initiated = true,
            "buyer inaction at response deadline; escalated to dispute"
        );
        self.log_transition(&order, OrderStatus::TransferPending, true, Initiator::System);
        Ok(order)
    }

    /// Retries a payout that failed at confirmation time.
    pub(crate) fn sweep_retry_payout(&self, order_id: OrderId) -> Result<Order, EscrowError> {
        self.release_payout(order_id, Initiator::System, true)
    }

    fn release_payout(
        &self,
        order_id: OrderId,
        initiator: Initiator,
        by_system: bool,
    ) -> Result<Order, EscrowError> {
        let rail = Arc::clone(&self.rail);
        let order = self.orders.transition(
            order_id,
            OrderStatus::Transferred,
            OrderStatus::Completed,
            by_system,
            |order, _| {
                let hold = order.hold.ok_or(EscrowError::MissingHold(order.id))?;
                rail.release(hold, order.seller, order.seller_payout)?;
                Ok(())
            },
        )?;

        self.audit.log(&AuditEvent::escrow_movement(
            initiator,
            order.id,
            Movement::Release,
            order.seller_payout,
        ));
        self.log_transition(&order, OrderStatus::Transferred, by_system, initiator);
        self.notifier.notify(order.seller, Notification::OrderCompleted { order_id: order.id });
        self.notifier.notify(order.buyer, Notification::OrderCompleted { order_id: order.id });
        Ok(order)
    }

    fn log_transition(
        &self,
        order: &Order,
        from: OrderStatus,
        _by_system: bool,
        initiator: Initiator,
    ) {
        self.audit.log(&AuditEvent::order_transition(
            initiator,
            order.id,
            from.to_string(),
            order.status.to_string(),
        ));
    }

    /// Orders currently awaiting seller proof, with their deadlines.
    pub(crate) fn confirmed_awaiting_proof(&self) -> Vec<(Order, Transfer)> {
        self.orders
            .with_status(OrderStatus::Confirmed)
            .into_iter()
            .filter_map(|(o, t)| t.map(|t| (o, t)))
            .filter(|(_, t)| t.status == TransferStatus::AwaitingProof)
            .collect()
    }

    /// Orders currently awaiting the buyer's response, with deadlines.
    pub(crate) fn pending_buyer_response(&self) -> Vec<(Order, Transfer)> {
        self.orders
            .with_status(OrderStatus::TransferPending)
            .into_iter()
            .filter_map(|(o, t)| t.map(|t| (o, t)))
            .filter(|(_, t)| t.status == TransferStatus::ProofSubmitted)
            .collect()
    }

    /// Orders whose payout release is outstanding.
    pub(crate) fn payouts_outstanding(&self) -> Vec<Order> {
        self.orders
            .with_status(OrderStatus::Transferred)
            .into_iter()
            .map(|(o, _)| o)
            .collect()
    }
}

impl std::fmt::Debug for EscrowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
