//! The dispute entity and its state machine.

use chrono::{DateTime, Utc};
use relist_core::{ActorId, DisputeId, OrderId};
use serde::{Deserialize, Serialize};

use relist_core::Money;

use crate::error::DisputeError;
use crate::resolution::{ResolutionOutcome, Split};

/// Why the buyer reported a transfer issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeReason {
    /// The ticket never arrived.
    TicketNotReceived,
    /// The ticket was invalid at the door or failed a scan.
    InvalidTicket,
    /// A different ticket than listed was delivered.
    WrongTicket,
    /// Anything else; see the description.
    Other,
}

/// The status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    /// Just opened, intake pending.
    Open,
    /// Both sides heard; reviewer examining the exchange.
    UnderReview,
    /// Waiting for the seller's statement.
    AwaitingSeller,
    /// Waiting for the buyer's statement.
    AwaitingBuyer,
    /// Ready for a binding resolution (exchange complete or deadline lapsed).
    Escalated,
    /// Resolved with a full refund to the buyer.
    ResolvedBuyerFavor,
    /// Resolved with a full payout to the seller.
    ResolvedSellerFavor,
    /// Resolved with a partial split.
    ResolvedPartial,
    /// Terminal: resolution applied to the order.
    Closed,
}

impl DisputeStatus {
    /// Checks if a transition to the target status is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use DisputeStatus::{
            AwaitingBuyer, AwaitingSeller, Closed, Escalated, Open, ResolvedBuyerFavor,
            ResolvedPartial, ResolvedSellerFavor, UnderReview,
        };

        matches!(
            (self, target),
            (Open, AwaitingSeller | AwaitingBuyer | UnderReview)
                | (AwaitingSeller | AwaitingBuyer, UnderReview | Escalated)
                | (UnderReview, Escalated)
                | (Escalated, ResolvedBuyerFavor | ResolvedSellerFavor | ResolvedPartial)
                | (ResolvedBuyerFavor | ResolvedSellerFavor | ResolvedPartial, Closed)
        )
    }

    /// True once a resolution has been recorded.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(
            self,
            Self::ResolvedBuyerFavor | Self::ResolvedSellerFavor | Self::ResolvedPartial | Self::Closed
        )
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::UnderReview => write!(f, "under_review"),
            Self::AwaitingSeller => write!(f, "awaiting_seller"),
            Self::AwaitingBuyer => write!(f, "awaiting_buyer"),
            Self::Escalated => write!(f, "escalated"),
            Self::ResolvedBuyerFavor => write!(f, "resolved_buyer_favor"),
            Self::ResolvedSellerFavor => write!(f, "resolved_seller_favor"),
            Self::ResolvedPartial => write!(f, "resolved_partial"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// The two sides of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The order's buyer.
    Buyer,
    /// The order's seller.
    Seller,
}

impl Party {
    /// The opposing party.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Buyer => Self::Seller,
            Self::Seller => Self::Buyer,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

/// One party's case: a single statement plus appended evidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyCase {
    /// The party's one initial statement.
    pub statement: Option<String>,
    /// Evidence URLs, append-only.
    pub evidence: Vec<String>,
    /// When the statement was submitted.
    pub submitted_at: Option<DateTime<Utc>>,
}

impl PartyCase {
    /// True once the party has made its statement.
    #[must_use]
    pub const fn has_statement(&self) -> bool {
        self.statement.is_some()
    }
}

/// A dispute over one escrow order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique identifier.
    pub id: DisputeId,
    /// The order under dispute.
    pub order_id: OrderId,
    /// The order's buyer.
    pub buyer: ActorId,
    /// The order's seller.
    pub seller: ActorId,
    /// Why the dispute was opened.
    pub reason: DisputeReason,
    /// Free-text description from the opener.
    pub description: String,
    /// Which party opened the dispute.
    pub opened_by: Party,
    /// The buyer's case.
    pub buyer_case: PartyCase,
    /// The seller's case.
    pub seller_case: PartyCase,
    /// Deadline for the awaited party's response.
    pub response_deadline: Option<DateTime<Utc>>,
    /// Current status.
    pub status: DisputeStatus,
    /// Set when a deadline lapsed: the party whose silence reduced the
    /// weight of its case.
    pub reduced_weight: Option<Party>,
    /// Recorded resolution outcome.
    pub outcome: Option<ResolutionOutcome>,
    /// Reviewer's resolution notes.
    pub resolution_notes: Option<String>,
    /// Refund to the buyer bound by the resolution.
    pub refund_amount: Option<Money>,
    /// Payout to the seller bound by the resolution.
    pub seller_payout_amount: Option<Money>,
    /// When the dispute was opened.
    pub opened_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    /// Opens a dispute with the opener's statement, awaiting the other
    /// party's response by `deadline`.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn open(
        order_id: OrderId,
        buyer: ActorId,
        seller: ActorId,
        opened_by: Party,
        reason: DisputeReason,
        description: String,
        statement: String,
        deadline: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        let mut dispute = Self {
            id: DisputeId::new(),
            order_id,
            buyer,
            seller,
            reason,
            description,
            opened_by,
            buyer_case: PartyCase::default(),
            seller_case: PartyCase::default(),
            response_deadline: Some(deadline),
            status: DisputeStatus::Open,
            reduced_weight: None,
            outcome: None,
            resolution_notes: None,
            refund_amount: None,
            seller_payout_amount: None,
            opened_at: now,
            updated_at: now,
        };
        *dispute.case_mut(opened_by) = PartyCase {
            statement: Some(statement),
            evidence: Vec::new(),
            submitted_at: Some(now),
        };
        // The other side now owes a response.
        dispute.status = match opened_by.other() {
            Party::Seller => DisputeStatus::AwaitingSeller,
            Party::Buyer => DisputeStatus::AwaitingBuyer,
        };
        dispute
    }

    /// Resolves an actor to its party, if any.
    #[must_use]
    pub fn party_of(&self, actor: ActorId) -> Option<Party> {
        if actor == self.buyer {
            Some(Party::Buyer)
        } else if actor == self.seller {
            Some(Party::Seller)
        } else {
            None
        }
    }

    /// Immutable access to a party's case.
    #[must_use]
    pub const fn case(&self, party: Party) -> &PartyCase {
        match party {
            Party::Buyer => &self.buyer_case,
            Party::Seller => &self.seller_case,
        }
    }

    fn case_mut(&mut self, party: Party) -> &mut PartyCase {
        match party {
            Party::Buyer => &mut self.buyer_case,
            Party::Seller => &mut self.seller_case,
        }
    }

    /// The party whose response is currently awaited, if any.
    #[must_use]
    pub const fn awaited_party(&self) -> Option<Party> {
        match self.status {
            DisputeStatus::AwaitingSeller => Some(Party::Seller),
            DisputeStatus::AwaitingBuyer => Some(Party::Buyer),
            _ => None,
        }
    }

    fn transition_to(&mut self, target: DisputeStatus) -> Result<(), DisputeError> {
        if self.status.can_transition_to(&target) {
            self.status = target;
            self.updated_at = Utc::now();
            Ok(())
        } else {
            Err(DisputeError::StateConflict {
                from: self.status.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Records the awaited party's one statement and moves to review.
    pub fn respond(
        &mut self,
        party: Party,
        statement: String,
        evidence: Vec<String>,
    ) -> Result<(), DisputeError> {
        if statement.trim().is_empty() {
            return Err(DisputeError::EmptyField("statement"));
        }
        if self.awaited_party() != Some(party) {
            return Err(DisputeError::NotAwaited);
        }
        if self.case(party).has_statement() {
            return Err(DisputeError::StatementAlreadySubmitted);
        }
        let now = Utc::now();
        *self.case_mut(party) = PartyCase {
            statement: Some(statement),
            evidence,
            submitted_at: Some(now),
        };
        self.response_deadline = None;
        self.transition_to(DisputeStatus::UnderReview)
    }

    /// Appends evidence to a party's case. Allowed until resolution.
    pub fn add_evidence(&mut self, party: Party, url: String) -> Result<(), DisputeError> {
        if url.trim().is_empty() {
            return Err(DisputeError::EmptyField("evidence"));
        }
        if self.status.is_resolved() {
            return Err(DisputeError::StateConflict {
                from: self.status.to_string(),
                to: self.status.to_string(),
            });
        }
        self.case_mut(party).evidence.push(url);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Escalates a lapsed-deadline dispute, recording reduced weight for
    /// the silent party. Returns `false` when nothing fired (no deadline,
    /// not lapsed, or not awaiting anyone) — re-running the sweep after a
    /// timeout has fired is a no-op.
    pub fn escalate_if_lapsed(&mut self, now: DateTime<Utc>) -> bool {
        let Some(awaited) = self.awaited_party() else {
            return false;
        };
        let Some(deadline) = self.response_deadline else {
            return false;
        };
        if now <= deadline {
            return false;
        }
        self.reduced_weight = Some(awaited);
        self.response_deadline = None;
        self.status = DisputeStatus::Escalated;
        self.updated_at = now;
        true
    }

    /// Moves a reviewed exchange to the binding-resolution stage.
    pub fn escalate_for_resolution(&mut self) -> Result<(), DisputeError> {
        self.transition_to(DisputeStatus::Escalated)
    }

    /// Records a resolution outcome and its validated split. Only legal
    /// from `Escalated`; the split must already have been checked against
    /// the order's financials (see [`crate::Resolution::split`]).
    pub fn record_resolution(
        &mut self,
        outcome: ResolutionOutcome,
        notes: String,
        split: Split,
    ) -> Result<(), DisputeError> {
        let target = match outcome {
            ResolutionOutcome::BuyerFavor => DisputeStatus::ResolvedBuyerFavor,
            ResolutionOutcome::SellerFavor => DisputeStatus::ResolvedSellerFavor,
            ResolutionOutcome::Partial => DisputeStatus::ResolvedPartial,
        };
        self.transition_to(target)?;
        self.outcome = Some(outcome);
        self.resolution_notes = Some(notes);
        self.refund_amount = Some(split.refund);
        self.seller_payout_amount = Some(split.seller_payout);
        Ok(())
    }

    /// Closes a resolved dispute.
    pub fn close(&mut self) -> Result<(), DisputeError> {
        self.transition_to(DisputeStatus::Closed)
    }
}
