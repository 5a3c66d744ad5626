//! The payment rail trait.

use std::fmt;
use std::str::FromStr;

use relist_core::{ActorId, Money, OrderId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RailError;

/// Identifier of a funds hold at the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldId(Uuid);

impl HoldId {
    /// Generates a fresh hold id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HoldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HoldId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle of a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldState {
    /// Funds authorized but not yet captured.
    Authorized,
    /// Funds captured and escrowed; movements permitted.
    Captured,
    /// Authorization cancelled before capture.
    Voided,
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorized => write!(f, "authorized"),
            Self::Captured => write!(f, "captured"),
            Self::Voided => write!(f, "voided"),
        }
    }
}

/// Operations a rail performs, used for failure scripting in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RailOp {
    /// Authorize a hold.
    Hold,
    /// Capture a hold.
    Capture,
    /// Release escrowed funds to the seller.
    Release,
    /// Refund escrowed funds to the buyer.
    Refund,
    /// Void an uncaptured hold.
    Void,
}

/// The capability the escrow core requires from a payment provider.
///
/// Every method either fully happens or fully does not: a returned error
/// means no funds moved, so the caller can safely abort its own transition.
pub trait PaymentRail: Send + Sync {
    /// Authorizes a hold of `amount` against the buyer for an order.
    fn hold(&self, buyer: ActorId, amount: Money, order: OrderId) -> Result<HoldId, RailError>;

    /// Captures a previously authorized hold into escrow.
    fn capture(&self, hold: HoldId) -> Result<(), RailError>;

    /// Releases part of the escrowed amount to the seller.
    fn release(&self, hold: HoldId, seller: ActorId, amount: Money) -> Result<(), RailError>;

    /// Refunds part of the escrowed amount to the buyer.
    fn refund(&self, hold: HoldId, amount: Money) -> Result<(), RailError>;

    /// Cancels an uncaptured hold.
    fn void(&self, hold: HoldId) -> Result<(), RailError>;
}
