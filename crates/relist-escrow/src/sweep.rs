//! Periodic deadline enforcement.
//!
//! Deadlines are stored as timestamps and enforced by this sweep, never by
//! blocking calls. Each rule fires only from its precondition status, so
//! re-running the sweep after a timeout has been applied is a no-op, and a
//! user transition racing the sweep is resolved by the same optimistic
//! status precondition — one of the two wins, the other sees a conflict.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EscrowError;
use crate::service::EscrowService;

/// What happens when a buyer neither confirms nor reports by the deadline.
///
/// The default deems receipt confirmed in the seller's favor. This is
/// safety-critical and financially consequential, which is why it is
/// configurable and every firing is logged loudly and audit-tagged as
/// system-initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuyerInactionPolicy {
    /// Deem receipt confirmed and release the payout.
    #[default]
    AutoConfirm,
    /// Open a dispute on the seller's behalf instead of moving money.
    Escalate,
}

/// Counters from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Orders cancelled because the seller missed the proof deadline.
    pub seller_defaults: usize,
    /// Orders auto-confirmed (or escalated) on buyer inaction.
    pub buyer_inaction: usize,
    /// Disputes escalated on a lapsed response deadline.
    pub disputes_escalated: usize,
    /// Outstanding payouts retried to completion.
    pub payouts_released: usize,
    /// Records skipped because a user transition won the race.
    pub conflicts: usize,
}

impl SweepReport {
    /// True when the pass changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.seller_defaults == 0
            && self.buyer_inaction == 0
            && self.disputes_escalated == 0
            && self.payouts_released == 0
    }
}

/// The deadline sweep.
pub struct DeadlineSweep {
    service: Arc<EscrowService>,
    buyer_inaction: BuyerInactionPolicy,
}

impl DeadlineSweep {
    /// Creates a sweep over a service with the default (auto-confirm)
    /// buyer-inaction policy.
    #[must_use]
    pub fn new(service: Arc<EscrowService>) -> Self {
        Self { service, buyer_inaction: BuyerInactionPolicy::default() }
    }

    /// Overrides the buyer-inaction policy.
    #[must_use]
    pub fn with_buyer_inaction(mut self, policy: BuyerInactionPolicy) -> Self {
        self.buyer_inaction = policy;
        self
    }

    /// Runs one idempotent pass against the given clock.
    pub fn run_once(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        // Seller missed the proof deadline: cancel with a full refund.
        for (order, transfer) in self.service.confirmed_awaiting_proof() {
            if now <= transfer.response_deadline {
                continue;
            }
            match self.service.sweep_cancel_seller_default(order.id) {
                Ok(_) => report.seller_defaults += 1,
                Err(EscrowError::StateConflict { .. }) => report.conflicts += 1,
                Err(e) => warn!(order_id = %order.id, error = %e, "seller-default sweep failed"),
            }
        }

        // Buyer missed the response deadline.
        for (order, transfer) in self.service.pending_buyer_response() {
            if now <= transfer.response_deadline {
                continue;
            }
            let result = match self.buyer_inaction {
                BuyerInactionPolicy::AutoConfirm => self.service.sweep_auto_confirm(order.id),
                BuyerInactionPolicy::Escalate => {
                    self.service.sweep_escalate_buyer_inaction(order.id)
                }
            };
            match result {
                Ok(_) => report.buyer_inaction += 1,
                Err(EscrowError::StateConflict { .. }) => report.conflicts += 1,
                Err(e) => warn!(order_id = %order.id, error = %e, "buyer-inaction sweep failed"),
            }
        }

        // Dispute response deadlines.
        report.disputes_escalated = self.service.disputes().sweep_deadlines(now).len();

        // Payouts that failed to release earlier.
        for order in self.service.payouts_outstanding() {
            match self.service.sweep_retry_payout(order.id) {
                Ok(_) => report.payouts_released += 1,
                Err(EscrowError::StateConflict { .. }) => report.conflicts += 1,
                Err(e) => debug!(order_id = %order.id, error = %e, "payout retry still failing"),
            }
        }

        if !report.is_empty() {
            warn!(?report, system_initiated = true, "deadline sweep applied transitions");
        }
        report
    }

    /// Runs the sweep on an interval until the task is aborted.
    pub async fn run(self, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.run_once(Utc::now());
        }
    }
}
