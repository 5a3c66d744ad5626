//! In-memory dispute store.
//!
//! Enforces the one-dispute-per-order relationship and routes every
//! mutation through the entity's own state machine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use relist_core::{ActorId, DisputeId, OrderId, Page, PageRequest};
use tracing::{info, warn};

use crate::dispute::{Dispute, DisputeReason, DisputeStatus, Party};
use crate::error::DisputeError;
use crate::resolution::{OrderFinancials, Resolution, Split};

#[derive(Debug, Default)]
struct Inner {
    disputes: HashMap<DisputeId, Dispute>,
    by_order: HashMap<OrderId, DisputeId>,
}

/// The dispute store.
#[derive(Debug, Default)]
pub struct DisputeStore {
    inner: RwLock<Inner>,
}

impl DisputeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a dispute for an order. Fails if one already exists.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &self,
        order_id: OrderId,
        buyer: ActorId,
        seller: ActorId,
        opened_by: Party,
        reason: DisputeReason,
        description: String,
        statement: String,
        deadline: DateTime<Utc>,
    ) -> Result<Dispute, DisputeError> {
        let mut inner = self.inner.write();
        if inner.by_order.contains_key(&order_id) {
            return Err(DisputeError::AlreadyOpen(order_id));
        }
        let dispute = Dispute::open(
            order_id, buyer, seller, opened_by, reason, description, statement, deadline,
        );
        info!(dispute_id = %dispute.id, order_id = %order_id, "dispute opened");
        inner.by_order.insert(order_id, dispute.id);
        inner.disputes.insert(dispute.id, dispute.clone());
        Ok(dispute)
    }

    /// Fetches a dispute by id.
    pub fn get(&self, id: DisputeId) -> Result<Dispute, DisputeError> {
        self.inner
            .read()
            .disputes
            .get(&id)
            .cloned()
            .ok_or(DisputeError::NotFound(id))
    }

    /// Fetches the dispute attached to an order, if any.
    #[must_use]
    pub fn for_order(&self, order_id: OrderId) -> Option<Dispute> {
        let inner = self.inner.read();
        inner
            .by_order
            .get(&order_id)
            .and_then(|id| inner.disputes.get(id))
            .cloned()
    }

    /// Disputes an actor is party to, newest first.
    #[must_use]
    pub fn for_actor(&self, actor: ActorId, page: PageRequest) -> Page<Dispute> {
        let mut items: Vec<Dispute> = self
            .inner
            .read()
            .disputes
            .values()
            .filter(|d| d.buyer == actor || d.seller == actor)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        Page::from_vec(items, page)
    }

    /// Records an actor's statement response.
    pub fn respond(
        &self,
        id: DisputeId,
        actor: ActorId,
        statement: String,
        evidence: Vec<String>,
    ) -> Result<Dispute, DisputeError> {
        let mut inner = self.inner.write();
        let dispute = inner.disputes.get_mut(&id).ok_or(DisputeError::NotFound(id))?;
        let party = dispute.party_of(actor).ok_or(DisputeError::NotParty)?;
        dispute.respond(party, statement, evidence)?;
        Ok(dispute.clone())
    }

    /// Appends evidence to an actor's case.
    pub fn add_evidence(
        &self,
        id: DisputeId,
        actor: ActorId,
        url: String,
    ) -> Result<Dispute, DisputeError> {
        let mut inner = self.inner.write();
        let dispute = inner.disputes.get_mut(&id).ok_or(DisputeError::NotFound(id))?;
        let party = dispute.party_of(actor).ok_or(DisputeError::NotParty)?;
        dispute.add_evidence(party, url)?;
        Ok(dispute.clone())
    }

    /// Moves a reviewed exchange to the binding-resolution stage.
    pub fn escalate_for_resolution(&self, id: DisputeId) -> Result<Dispute, DisputeError> {
        let mut inner = self.inner.write();
        let dispute = inner.disputes.get_mut(&id).ok_or(DisputeError::NotFound(id))?;
        dispute.escalate_for_resolution()?;
        Ok(dispute.clone())
    }

    /// Escalates every dispute whose response deadline has lapsed.
    ///
    /// Idempotent: a second sweep after a timeout has fired finds the
    /// dispute already escalated and skips it.
    pub fn sweep_deadlines(&self, now: DateTime<Utc>) -> Vec<Dispute> {
        let mut inner = self.inner.write();
        let mut fired = Vec::new();
        for dispute in inner.disputes.values_mut() {
            if dispute.escalate_if_lapsed(now) {
                warn!(
                    dispute_id = %dispute.id,
                    order_id = %dispute.order_id,
                    silent_party = %dispute.reduced_weight.map_or_else(String::new, |p| p.to_string()),
                    system_initiated = true,
                    "dispute escalated on lapsed response deadline"
                );
                fired.push(dispute.clone());
            }
        }
        fired
    }

    /// Applies a reviewer resolution, returning the validated split.
    ///
    /// The caller (the escrow service) owns executing the split on the
    /// payment rail and transitioning the order; this method only binds the
    /// outcome to the dispute record.
    pub fn resolve(
        &self,
        id: DisputeId,
        resolution: &Resolution,
        financials: &OrderFinancials,
    ) -> Result<(Dispute, Split), DisputeError> {
        let split = resolution.split(financials)?;
        let mut inner = self.inner.write();
        let dispute = inner.disputes.get_mut(&id).ok_or(DisputeError::NotFound(id))?;
        dispute.record_resolution(resolution.outcome, resolution.notes.clone(), split)?;
        info!(
            dispute_id = %id,
            outcome = ?resolution.outcome,
            refund = %split.refund,
            seller_payout = %split.seller_payout,
            "dispute resolved"
        );
        Ok((dispute.clone(), split))
    }

    /// Closes a resolved dispute.
    pub fn close(&self, id: DisputeId) -> Result<Dispute, DisputeError> {
        let mut inner = self.inner.write();
        let dispute = inner.disputes.get_mut(&id).ok_or(DisputeError::NotFound(id))?;
        dispute.close()?;
        Ok(dispute.clone())
    }

    /// Disputes currently awaiting binding resolution.
    #[must_use]
    pub fn escalated(&self) -> Vec<Dispute> {
        let mut items: Vec<Dispute> = self
            .inner
            .read()
            .disputes
            .values()
            .filter(|d| d.status == DisputeStatus::Escalated)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.opened_at.cmp(&b.opened_at));
        items
    }
}

/// Convenience alias for opening from a transfer issue report.
impl DisputeStore {
    /// Opens a buyer-initiated dispute from a transfer issue report.
    pub fn open_from_issue(
        &self,
        order_id: OrderId,
        buyer: ActorId,
        seller: ActorId,
        reason: DisputeReason,
        notes: String,
        deadline: DateTime<Utc>,
    ) -> Result<Dispute, DisputeError> {
        self.open(
            order_id,
            buyer,
            seller,
            Party::Buyer,
            reason,
            notes.clone(),
            notes,
            deadline,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::ResolutionOutcome;
    use chrono::Duration;
    use relist_core::Money;

    fn financials() -> OrderFinancials {
        OrderFinancials {
            total: Money::from_pence(3150),
            seller_payout: Money::from_pence(2520),
            platform_fee: Money::from_pence(280),
        }
    }

    fn open(store: &DisputeStore) -> (Dispute, ActorId, ActorId) {
        let buyer = ActorId::new();
        let seller = ActorId::new();
        let dispute = store
            .open_from_issue(
                OrderId::new(),
                buyer,
                seller,
                DisputeReason::TicketNotReceived,
                "no ticket".to_string(),
                Utc::now() + Duration::hours(48),
            )
            .unwrap();
        (dispute, buyer, seller)
    }

    #[test]
    fn one_dispute_per_order() {
        let store = DisputeStore::new();
        let (dispute, buyer, seller) = open(&store);
        let err = store
            .open_from_issue(
                dispute.order_id,
                buyer,
                seller,
                DisputeReason::Other,
                "again".to_string(),
                Utc::now() + Duration::hours(48),
            )
            .unwrap_err();
        assert!(matches!(err, DisputeError::AlreadyOpen(_)));
        assert_eq!(store.for_order(dispute.order_id).unwrap().id, dispute.id);
    }

    #[test]
    fn respond_requires_party_membership() {
        let store = DisputeStore::new();
        let (dispute, _, seller) = open(&store);
        let outsider = ActorId::new();
        assert!(matches!(
            store
                .respond(dispute.id, outsider, "hi".to_string(), vec![])
                .unwrap_err(),
            DisputeError::NotParty
        ));
        let updated = store
            .respond(dispute.id, seller, "I transferred it".to_string(), vec![])
            .unwrap();
        assert_eq!(updated.status, DisputeStatus::UnderReview);
    }

    #[test]
    fn sweep_escalates_lapsed_only_once() {
        let store = DisputeStore::new();
        let (dispute, _, _) = open(&store);
        let later = Utc::now() + Duration::hours(72);

        let fired = store.sweep_deadlines(later);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, dispute.id);
        assert_eq!(fired[0].reduced_weight, Some(Party::Seller));

        // Replay: no additional state change.
        assert!(store.sweep_deadlines(later + Duration::hours(1)).is_empty());
    }

    #[test]
    fn resolve_binds_outcome_and_split() {
        let store = DisputeStore::new();
        let (dispute, _, _) = open(&store);
        store.sweep_deadlines(Utc::now() + Duration::hours(72));

        let resolution = Resolution::partial(
            Money::from_pence(1500),
            Money::from_pence(1025),
            "split",
        );
        let (resolved, split) = store.resolve(dispute.id, &resolution, &financials()).unwrap();
        assert_eq!(resolved.status, DisputeStatus::ResolvedPartial);
        assert_eq!(resolved.outcome, Some(ResolutionOutcome::Partial));
        assert_eq!(split.refund, Money::from_pence(1500));
        assert_eq!(split.seller_payout, Money::from_pence(1025));

        let closed = store.close(dispute.id).unwrap();
        assert_eq!(closed.status, DisputeStatus::Closed);
    }

    #[test]
    fn invalid_split_leaves_dispute_untouched() {
        let store = DisputeStore::new();
        let (dispute, _, _) = open(&store);
        store.sweep_deadlines(Utc::now() + Duration::hours(72));

        let resolution = Resolution::partial(
            Money::from_pence(3000),
            Money::from_pence(2500),
            "too much",
        );
        assert!(store.resolve(dispute.id, &resolution, &financials()).is_err());
        assert_eq!(store.get(dispute.id).unwrap().status, DisputeStatus::Escalated);
    }

    #[test]
    fn for_actor_lists_both_sides() {
        let store = DisputeStore::new();
        let (_, buyer, seller) = open(&store);
        assert_eq!(store.for_actor(buyer, PageRequest::default()).total, 1);
        assert_eq!(store.for_actor(seller, PageRequest::default()).total, 1);
        assert_eq!(store.for_actor(ActorId::new(), PageRequest::default()).total, 0);
    }

    #[test]
    fn escalated_queue_ordering() {
        let store = DisputeStore::new();
        open(&store);
        open(&store);
        store.sweep_deadlines(Utc::now() + Duration::hours(72));
        let queue = store.escalated();
        assert_eq!(queue.len(), 2);
        assert!(queue[0].opened_at <= queue[1].opened_at);
    }
}
