//! Notification seam.
//!
//! Delivery (push, email) is an external collaborator; the core only emits
//! typed notifications at each transition.

use relist_core::{ActorId, DisputeId, OrderId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What happened, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Notification {
    /// A buyer purchased from the recipient's listing.
    OrderPlaced {
        /// The new order.
        order_id: OrderId,
    },
    /// Payment captured; the recipient owes transfer proof.
    PaymentCaptured {
        /// The confirmed order.
        order_id: OrderId,
    },
    /// The seller submitted proof; the recipient should confirm or report.
    ProofSubmitted {
        /// The order in transfer.
        order_id: OrderId,
    },
    /// The order completed and the payout was released.
    OrderCompleted {
        /// The completed order.
        order_id: OrderId,
    },
    /// The order was cancelled and any payment returned.
    OrderCancelled {
        /// The cancelled order.
        order_id: OrderId,
    },
    /// The order was refunded.
    OrderRefunded {
        /// The refunded order.
        order_id: OrderId,
    },
    /// A dispute was opened against the recipient.
    DisputeOpened {
        /// The disputed order.
        order_id: OrderId,
        /// The dispute.
        dispute_id: DisputeId,
    },
    /// The other party responded or added evidence on a dispute.
    DisputeUpdated {
        /// The disputed order.
        order_id: OrderId,
        /// The dispute.
        dispute_id: DisputeId,
    },
    /// A dispute involving the recipient was resolved.
    DisputeResolved {
        /// The disputed order.
        order_id: OrderId,
        /// The dispute.
        dispute_id: DisputeId,
    },
    /// A new message arrived on an order thread.
    MessagePosted {
        /// The order thread.
        order_id: OrderId,
    },
}

/// External notification capability.
pub trait Notifier: Send + Sync {
    /// Delivers one notification to one recipient. Best-effort; failures
    /// are the collaborator's concern and never block a transition.
    fn notify(&self, recipient: ActorId, notification: Notification);
}

/// Notifier that logs deliveries through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates the tracing notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, recipient: ActorId, notification: Notification) {
        info!(recipient = %recipient, notification = ?notification, "notification dispatched");
    }
}

/// Notifier that discards everything. Useful in unit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl NoopNotifier {
    /// Creates a no-op notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for NoopNotifier {
    fn notify(&self, _recipient: ActorId, _notification: Notification) {}
}
