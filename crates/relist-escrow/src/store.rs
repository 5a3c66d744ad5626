//! Optimistic-concurrency order store.
//!
//! Every transition is an atomic read-modify-write keyed by the order id
//! and guarded by the expected current status. The side-effect closure
//! (rail calls, transfer mutation) runs on working copies under the write
//! lock: if it fails, nothing is committed, so two racing requests produce
//! exactly one success and one [`EscrowError::StateConflict`], and a failed
//! external call never leaves a half-applied transition behind.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use relist_core::{ActorId, OrderId, Page, PageRequest};
use tracing::debug;

use crate::error::EscrowError;
use crate::order::{Order, OrderStatus, StatusChange};
use crate::transfer::Transfer;

#[derive(Debug, Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    transfers: HashMap<OrderId, Transfer>,
}

/// The order/transfer store.
#[derive(Debug, Default)]
pub struct OrderStore {
    inner: RwLock<Inner>,
}

impl OrderStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly created order.
    pub fn insert(&self, order: Order) {
        self.inner.write().orders.insert(order.id, order);
    }

    /// Fetches an order by id.
    pub fn get(&self, id: OrderId) -> Result<Order, EscrowError> {
        self.inner
            .read()
            .orders
            .get(&id)
            .cloned()
            .ok_or(EscrowError::NotFound(id))
    }

    /// Fetches an order's transfer workflow.
    pub fn transfer(&self, id: OrderId) -> Result<Transfer, EscrowError> {
        let inner = self.inner.read();
        if !inner.orders.contains_key(&id) {
            return Err(EscrowError::NotFound(id));
        }
        inner
            .transfers
            .get(&id)
            .cloned()
            .ok_or(EscrowError::NoTransfer(id))
    }

    /// Orders an actor is party to, newest first.
    #[must_use]
    pub fn for_actor(&self, actor: ActorId, page: PageRequest) -> Page<Order> {
        let mut items: Vec<Order> = self
            .inner
            .read()
            .orders
            .values()
            .filter(|o| o.involves(actor))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Page::from_vec(items, page)
    }

    /// Snapshot of orders in a given status, with their transfers.
    #[must_use]
    pub fn with_status(&self, status: OrderStatus) -> Vec<(Order, Option<Transfer>)> {
        let inner = self.inner.read();
        inner
            .orders
            .values()
            .filter(|o| o.status == status)
            .map(|o| (o.clone(), inner.transfers.get(&o.id).cloned()))
            .collect()
    }

    /// Applies one guarded transition.
    ///
    /// Under the write lock: verifies the order is in `expected` (else
    /// `StateConflict` carrying the *actual* current status so the client
    /// can refresh), verifies the machine admits `expected → to`, then runs
    /// `effect` on working copies of the order and its transfer. Only if the
    /// effect succeeds are the copies committed, the status advanced, and
    /// the history appended.
    pub fn transition<F>(
        &self,
        id: OrderId,
        expected: OrderStatus,
        to: OrderStatus,
        by_system: bool,
        effect: F,
    ) -> Result<Order, EscrowError>
    where
        F: FnOnce(&mut Order, &mut Option<Transfer>) -> Result<(), EscrowError>,
    {
        let mut inner = self.inner.write();
        let current = inner
            .orders
            .get(&id)
            .ok_or(EscrowError::NotFound(id))?
            .status;
        if current != expected {
            return Err(EscrowError::StateConflict {
                current: current.to_string(),
                attempted: to.to_string(),
            });
        }
        if !expected.can_transition_to(&to) {
            return Err(EscrowError::StateConflict {
                current: current.to_string(),
                attempted: to.to_string(),
            });
        }

        // Work on copies; commit only on success.
        let mut order = inner
            .orders
            .get(&id)
            .cloned()
            .ok_or(EscrowError::NotFound(id))?;
        let mut transfer = inner.transfers.get(&id).cloned();

        effect(&mut order, &mut transfer)?;

        let now = Utc::now();
        order.status = to;
        order.version += 1;
        order.updated_at = now;
        order.history.push(StatusChange { status: to, at: now, by_system });
        debug!(order_id = %id, from = %expected, to = %to, by_system, "order transition committed");

        if let Some(t) = transfer {
            inner.transfers.insert(id, t);
        }
        inner.orders.insert(id, order.clone());
        Ok(order)
    }

}
