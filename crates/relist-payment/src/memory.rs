//! In-process payment rail with a movement ledger.
//!
//! Used by tests and local runs. Tracks every hold and the amounts moved
//! off it, and can be scripted to fail the next occurrence of a given
//! operation so callers can prove their transitions abort cleanly.

use std::collections::HashMap;

use parking_lot::RwLock;
use relist_core::{ActorId, Money, OrderId};
use tracing::debug;

use crate::error::RailError;
use crate::rail::{HoldId, HoldState, PaymentRail, RailOp};

/// One hold and the movements applied to it.
#[derive(Debug, Clone)]
pub struct HoldRecord {
    /// The buyer whose funds are held.
    pub buyer: ActorId,
    /// The order the hold backs.
    pub order: OrderId,
    /// Amount authorized.
    pub amount: Money,
    /// Current state.
    pub state: HoldState,
    /// Total released to the seller so far.
    pub released: Money,
    /// Total refunded to the buyer so far.
    pub refunded: Money,
}

impl HoldRecord {
    /// Amount still escrowed on this hold.
    #[must_use]
    pub fn remaining(&self) -> Money {
        self.amount
            .saturating_sub(self.released)
            .saturating_sub(self.refunded)
    }
}

/// In-memory [`PaymentRail`] implementation.
#[derive(Debug, Default)]
pub struct MemoryRail {
    holds: RwLock<HashMap<HoldId, HoldRecord>>,
    /// Net amounts paid out per seller.
    payouts: RwLock<HashMap<ActorId, Money>>,
    /// Net amounts refunded per buyer.
    refunds: RwLock<HashMap<ActorId, Money>>,
    /// Operations scripted to fail on their next occurrence.
    fail_next: RwLock<Vec<RailOp>>,
}

impl MemoryRail {
    /// Creates an empty rail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next occurrence of `op` to fail with `Unavailable`.
    pub fn fail_next(&self, op: RailOp) {
        self.fail_next.write().push(op);
    }

    fn take_scripted_failure(&self, op: RailOp) -> Result<(), RailError> {
        let mut scripted = self.fail_next.write();
        if let Some(pos) = scripted.iter().position(|o| *o == op) {
            scripted.remove(pos);
            return Err(RailError::Unavailable(format!("scripted failure: {op:?}")));
        }
        Ok(())
    }

    /// Looks up a hold record.
    #[must_use]
    pub fn hold_record(&self, hold: HoldId) -> Option<HoldRecord> {
        self.holds.read().get(&hold).cloned()
    }

    /// Total paid out to a seller across all holds.
    #[must_use]
    pub fn paid_to(&self, seller: ActorId) -> Money {
        self.payouts.read().get(&seller).copied().unwrap_or(Money::ZERO)
    }

    /// Total refunded to a buyer across all holds.
    #[must_use]
    pub fn refunded_to(&self, buyer: ActorId) -> Money {
        self.refunds.read().get(&buyer).copied().unwrap_or(Money::ZERO)
    }
}

impl PaymentRail for MemoryRail {
    fn hold(&self, buyer: ActorId, amount: Money, order: OrderId) -> Result<HoldId, RailError> {
        self.take_scripted_failure(RailOp::Hold)?;
        if amount.is_zero() {
            return Err(RailError::Declined);
        }
        let id = HoldId::new();
        debug!(hold = %id, buyer = %buyer, order = %order, amount = %amount, "hold authorized");
        self.holds.write().insert(
            id,
            HoldRecord {
                buyer,
                order,
                amount,
                state: HoldState::Authorized,
                released: Money::ZERO,
                refunded: Money::ZERO,
            },
        );
        Ok(id)
    }

    fn capture(&self, hold: HoldId) -> Result<(), RailError> {
        self.take_scripted_failure(RailOp::Capture)?;
        let mut holds = self.holds.write();
        let record = holds.get_mut(&hold).ok_or(RailError::UnknownHold(hold))?;
        if record.state != HoldState::Authorized {
            return Err(RailError::InvalidHoldState {
                hold,
                state: record.state.to_string(),
                op: "capture",
            });
        }
        record.state = HoldState::Captured;
        debug!(hold = %hold, "hold captured");
        Ok(())
    }

    fn release(&self, hold: HoldId, seller: ActorId, amount: Money) -> Result<(), RailError> {
        self.take_scripted_failure(RailOp::Release)?;
        let mut holds = self.holds.write();
        let record = holds.get_mut(&hold).ok_or(RailError::UnknownHold(hold))?;
        if record.state != HoldState::Captured {
            return Err(RailError::InvalidHoldState {
                hold,
                state: record.state.to_string(),
                op: "release",
            });
        }
        let remaining = record.remaining();
        if amount > remaining {
            return Err(RailError::InsufficientHold { requested: amount, remaining });
        }
        record.released = record.released.saturating_add(amount);
        let mut payouts = self.payouts.write();
        let entry = payouts.entry(seller).or_insert(Money::ZERO);
        *entry = entry.saturating_add(amount);
        debug!(hold = %hold, seller = %seller, amount = %amount, "escrow released");
        Ok(())
    }

    fn refund(&self, hold: HoldId, amount: Money) -> Result<(), RailError> {
        self.take_scripted_failure(RailOp::Refund)?;
        let mut holds = self.holds.write();
        let record = holds.get_mut(&hold).ok_or(RailError::UnknownHold(hold))?;
        if record.state != HoldState::Captured {
            return Err(RailError::InvalidHoldState {
                hold,
                state: record.state.to_string(),
                op: "refund",
            });
        }
        let remaining = record.remaining();
        if amount > remaining {
            return Err(RailError::InsufficientHold { requested: amount, remaining });
        }
        let buyer = record.buyer;
        record.refunded = record.refunded.saturating_add(amount);
        let mut refunds = self.refunds.write();
        let entry = refunds.entry(buyer).or_insert(Money::ZERO);
        *entry = entry.saturating_add(amount);
        debug!(hold = %hold, buyer = %buyer, amount = %amount, "escrow refunded");
        Ok(())
    }

    fn void(&self, hold: HoldId) -> Result<(), RailError> {
        self.take_scripted_failure(RailOp::Void)?;
        let mut holds = self.holds.write();
        let record = holds.get_mut(&hold).ok_or(RailError::UnknownHold(hold))?;
        if record.state != HoldState::Authorized {
            return Err(RailError::InvalidHoldState {
                hold,
                state: record.state.to_string(),
                op: "void",
            });
        }
        record.state = HoldState::Voided;
        debug!(hold = %hold, "hold voided");
        Ok(())
    }
}
