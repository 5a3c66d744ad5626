//! Per-order message threads.
//!
//! Append-only free text between the two order parties. Delivery guarantees
//! are out of scope; this is the persisted thread both sides read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use relist_core::{ActorId, MessageId, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// Maximum message length.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// One message on an order thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,
    /// The order thread this belongs to.
    pub order_id: OrderId,
    /// Who sent it.
    pub sender: ActorId,
    /// Message body.
    pub body: String,
    /// When it was sent.
    pub sent_at: DateTime<Utc>,
}

/// Append-only store of order threads.
#[derive(Debug, Default)]
pub struct MessageStore {
    threads: RwLock<HashMap<OrderId, Vec<Message>>>,
}

impl MessageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to an order thread.
    ///
    /// Party membership is the caller's responsibility (the service checks
    /// the order record); this store only enforces body constraints.
    pub fn post(
        &self,
        order_id: OrderId,
        sender: ActorId,
        body: String,
    ) -> Result<Message, EscrowError> {
        let body = body.trim().to_string();
        if body.is_empty() {
            return Err(EscrowError::InvalidMessage("must not be empty"));
        }
        if body.len() > MAX_MESSAGE_LENGTH {
            return Err(EscrowError::InvalidMessage("exceeds maximum length"));
        }
        let message = Message {
            id: MessageId::new(),
            order_id,
            sender,
            body,
            sent_at: Utc::now(),
        };
        self.threads
            .write()
            .entry(order_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    /// The full thread for an order, oldest first.
    #[must_use]
    pub fn thread(&self, order_id: OrderId) -> Vec<Message> {
        self.threads.read().get(&order_id).cloned().unwrap_or_default()
    }
}
