//! The JSON wire surface and error taxonomy.

use chrono::{DateTime, Utc};
use relist_core::{
    ActorId, DisputeId, ListingId, Money, OrderId, Page, RequestId, VerificationLevel,
};
use relist_dispute::{
    Dispute, DisputeError, DisputeReason, Resolution, ResolutionOutcome,
};
use relist_escrow::{EscrowError, Message, Order, StatusChange, Transfer};
use relist_listings::{Listing, ListingError, SearchFilter, SortKey};
use relist_payment::RailError;
use relist_pricing::PricingError;
use relist_verify::{ProofKind, RejectReason, VerificationRequest, VerifyError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Gateway error taxonomy, stable across all endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Bad input; field-level detail where available. No partial writes.
    Validation,
    /// Missing or unknown bearer token.
    Unauthorized,
    /// Authenticated but not allowed to act here.
    Forbidden,
    /// No such entity (or not visible to this actor).
    NotFound,
    /// The transition is not legal from the current state; refresh and retry.
    Conflict,
    /// Too many requests for this action.
    RateLimited,
    /// An external dependency (payment rail, fraud oracle) failed; nothing
    /// was changed.
    Dependency,
    /// Unexpected failure; reference the incident id. No financial mutation
    /// occurred on this path.
    Internal,
}

impl ApiErrorKind {
    /// HTTP-style status code for the kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::RateLimited => 429,
            Self::Dependency => 502,
            Self::Internal => 500,
        }
    }
}

/// A gateway error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error class.
    pub kind: ApiErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Offending field, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Incident reference, for internal errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident: Option<Uuid>,
}

impl ApiError {
    /// A validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: ApiErrorKind::Validation, message: message.into(), field: None, incident: None }
    }

    /// An unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: message.into(),
            field: None,
            incident: None,
        }
    }

    /// A rate-limit error for an action.
    #[must_use]
    pub fn rate_limited(action: &str) -> Self {
        Self {
            kind: ApiErrorKind::RateLimited,
            message: format!("too many {action} requests; slow down"),
            field: None,
            incident: None,
        }
    }

    /// An internal error with a fresh incident reference.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            kind: ApiErrorKind::Internal,
            message: "something went wrong; quote the incident reference".to_string(),
            field: None,
            incident: Some(Uuid::new_v4()),
        }
    }

    /// Attaches a field name.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// HTTP-style status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    fn of_kind(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), field: None, incident: None }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code(), self.message)
    }
}

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        Self::of_kind(ApiErrorKind::Validation, e.to_string())
    }
}

impl From<ListingError> for ApiError {
    fn from(e: ListingError) -> Self {
        let kind = match &e {
            ListingError::NotFound(_) => ApiErrorKind::NotFound,
            ListingError::Inactive(_) => ApiErrorKind::Conflict,
            ListingError::NotOwner => ApiErrorKind::Forbidden,
            ListingError::Pricing(_)
            | ListingError::QuotaExceeded { .. }
            | ListingError::InvalidQuantity { .. }
            | ListingError::InsufficientQuantity { .. }
            | ListingError::EventInPast
            | ListingError::EmptyField(_)
            | ListingError::FieldTooLong { .. } => ApiErrorKind::Validation,
        };
        Self::of_kind(kind, e.to_string())
    }
}

impl From<VerifyError> for ApiError {
    fn from(e: VerifyError) -> Self {
        let kind = match &e {
            VerifyError::NotFound(_) | VerifyError::NoneForListing(_) => ApiErrorKind::NotFound,
            VerifyError::OracleUnavailable(_) => ApiErrorKind::Dependency,
            VerifyError::AlreadySubmitted | VerifyError::InvalidRequestState { .. } => {
                ApiErrorKind::Conflict
            }
            _ => ApiErrorKind::Validation,
        };
        Self::of_kind(kind, e.to_string())
    }
}

impl From<DisputeError> for ApiError {
    fn from(e: DisputeError) -> Self {
        let kind = match &e {
            DisputeError::NotFound(_) => ApiErrorKind::NotFound,
            DisputeError::NotParty => ApiErrorKind::Forbidden,
            DisputeError::AlreadyOpen(_)
            | DisputeError::StateConflict { .. }
            | DisputeError::NotAwaited
            | DisputeError::StatementAlreadySubmitted => ApiErrorKind::Conflict,
            _ => ApiErrorKind::Validation,
        };
        Self::of_kind(kind, e.to_string())
    }
}

impl From<RailError> for ApiError {
    fn from(e: RailError) -> Self {
        Self::of_kind(ApiErrorKind::Dependency, e.to_string())
    }
}

impl From<EscrowError> for ApiError {
    fn from(e: EscrowError) -> Self {
        match e {
            EscrowError::Listing(inner) => inner.into(),
            EscrowError::Pricing(inner) => inner.into(),
            EscrowError::Dispute(inner) => inner.into(),
            EscrowError::Rail(inner) => inner.into(),
            EscrowError::NotFound(_) => Self::of_kind(ApiErrorKind::NotFound, e.to_string()),
            EscrowError::StateConflict { .. }
            | EscrowError::TransferConflict { .. }
            | EscrowError::NoTransfer(_) => Self::of_kind(ApiErrorKind::Conflict, e.to_string()),
            EscrowError::Forbidden { .. } | EscrowError::SelfPurchase => {
                Self::of_kind(ApiErrorKind::Forbidden, e.to_string())
            }
            EscrowError::NoProofUrls | EscrowError::InvalidMessage(_) => {
                Self::of_kind(ApiErrorKind::Validation, e.to_string())
            }
            // A broken hold invariant is ours, not the client's.
            EscrowError::MissingHold(_) => Self::internal(),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Pagination parameters on list requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageParams {
    /// Resolves to a clamped page request.
    #[must_use]
    pub fn resolve(self) -> relist_core::PageRequest {
        relist_core::PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(20))
    }
}

/// `POST /listings` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingBody {
    /// Event name.
    pub event_name: String,
    /// Venue name.
    pub venue: String,
    /// Event start.
    pub event_date: DateTime<Utc>,
    /// Ticket type.
    pub ticket_type: String,
    /// Tickets offered.
    pub quantity: u32,
    /// Price originally paid per ticket.
    pub original_price: Money,
    /// Per-ticket resale price.
    pub asking_price: Money,
}

/// `POST /transfer` actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum TransferAction {
    /// Seller submits handover proof.
    SubmitProof {
        /// Proof URLs (at least one).
        proof_urls: Vec<String>,
        /// Optional note to the buyer.
        #[serde(default)]
        notes: Option<String>,
    },
    /// Buyer confirms receipt.
    ConfirmReceipt,
    /// Buyer reports an issue, opening a dispute.
    ReportIssue {
        /// Why the transfer failed.
        reason: DisputeReason,
        /// Free-text description.
        notes: String,
    },
}

/// `POST /disputes` actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum DisputeAction {
    /// The awaited party's one statement.
    Respond {
        /// The statement.
        statement: String,
        /// Initial evidence URLs.
        #[serde(default)]
        evidence: Vec<String>,
    },
    /// Append one evidence URL.
    AddEvidence {
        /// The evidence URL.
        url: String,
    },
}

/// `POST /admin/verify` decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum VerifyDecision {
    /// Approve at an explicit level.
    Approve {
        /// The granted level (basic, verified, premium).
        level: VerificationLevel,
    },
    /// Reject with a reason code.
    Reject {
        /// The reason code.
        reason: RejectReason,
        /// Optional note to the seller.
        #[serde(default)]
        note: Option<String>,
    },
    /// Flag for deeper review.
    Flag {
        /// Reviewer note.
        note: String,
    },
}

/// A reviewer's resolution, as submitted over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionBody {
    /// The outcome.
    pub outcome: ResolutionOutcome,
    /// Resolution notes shown to both parties.
    pub notes: String,
    /// Refund to the buyer (partial outcomes).
    #[serde(default)]
    pub refund_amount: Option<Money>,
    /// Payout to the seller (partial outcomes).
    #[serde(default)]
    pub seller_payout_amount: Option<Money>,
    /// Explicitly return the platform fee to the split pool.
    #[serde(default)]
    pub void_platform_fee: bool,
}

impl From<ResolutionBody> for Resolution {
    fn from(body: ResolutionBody) -> Self {
        Self {
            outcome: body.outcome,
            notes: body.notes,
            refund_amount: body.refund_amount,
            seller_payout_amount: body.seller_payout_amount,
            void_platform_fee: body.void_platform_fee,
        }
    }
}

/// Every operation the gateway accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum ApiRequest {
    /// Create a listing (seller).
    CreateListing(CreateListingBody),
    /// Search active listings (public).
    SearchListings {
        /// Filters.
        #[serde(default)]
        filter: SearchFilter,
        /// Sort order.
        #[serde(default)]
        sort: SortKey,
        /// Pagination.
        #[serde(default)]
        page: PageParams,
    },
    /// Fetch one listing; bumps its view count.
    GetListing {
        /// The listing.
        listing_id: ListingId,
    },
    /// The caller's own listings (seller).
    MyListings {
        /// Pagination.
        #[serde(default)]
        page: PageParams,
    },
    /// Withdraw a listing (owning seller).
    WithdrawListing {
        /// The listing.
        listing_id: ListingId,
    },
    /// Purchase from a listing (buyer) — creates a pending order and an
    /// authorized payment hold.
    Purchase {
        /// The listing.
        listing_id: ListingId,
        /// Tickets to buy.
        quantity: u32,
    },
    /// Payment-captured callback for a pending order.
    ConfirmPayment {
        /// The order.
        order_id: OrderId,
    },
    /// Buyer abort of a pending order.
    CancelOrder {
        /// The order.
        order_id: OrderId,
    },
    /// Transfer protocol actions.
    Transfer {
        /// The order.
        order_id: OrderId,
        /// The action.
        #[serde(flatten)]
        action: TransferAction,
    },
    /// The caller's orders, both sides.
    GetOrders {
        /// Pagination.
        #[serde(default)]
        page: PageParams,
    },
    /// One order with transfer state and timeline (parties + reviewers).
    GetOrder {
        /// The order.
        order_id: OrderId,
    },
    /// Dispute actions.
    Dispute {
        /// The dispute.
        dispute_id: DisputeId,
        /// The action.
        #[serde(flatten)]
        action: DisputeAction,
    },
    /// The caller's disputes.
    GetDisputes {
        /// Pagination.
        #[serde(default)]
        page: PageParams,
    },
    /// One dispute (parties + reviewers).
    GetDispute {
        /// The dispute.
        dispute_id: DisputeId,
    },
    /// Post to an order thread.
    PostMessage {
        /// The order.
        order_id: OrderId,
        /// Message body.
        body: String,
    },
    /// Read an order thread.
    GetThread {
        /// The order.
        order_id: OrderId,
    },
    /// Upload a proof artifact (owning seller).
    VerifyUpload {
        /// The listing under verification.
        listing_id: ListingId,
        /// Artifact type.
        kind: ProofKind,
        /// Artifact URL.
        url: String,
    },
    /// Attach purchase details (owning seller).
    VerifyDetails {
        /// The listing under verification.
        listing_id: ListingId,
        /// The details.
        details: relist_verify::ConfirmationDetails,
    },
    /// Run the automated fraud check.
    VerifyFraudCheck {
        /// The listing under verification.
        listing_id: ListingId,
    },
    /// Submit into the review queue.
    VerifySubmit {
        /// The listing under verification.
        listing_id: ListingId,
    },
    /// Start a fresh cycle after rejection.
    VerifyResubmit {
        /// The listing under verification.
        listing_id: ListingId,
    },
    /// The review queue (reviewer).
    VerificationQueue,
    /// Decide a queued request (reviewer).
    AdminVerify {
        /// The request.
        request_id: RequestId,
        /// The decision.
        #[serde(flatten)]
        decision: VerifyDecision,
    },
    /// Move a reviewed dispute to binding resolution (reviewer).
    EscalateDispute {
        /// The dispute.
        dispute_id: DisputeId,
    },
    /// Resolve an escalated dispute (reviewer).
    ResolveDispute {
        /// The dispute.
        dispute_id: DisputeId,
        /// The resolution.
        resolution: ResolutionBody,
    },
}

impl ApiRequest {
    /// Stable action label used as the rate-limit key.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::CreateListing(_) => "create_listing",
            Self::SearchListings { .. } => "search_listings",
            Self::GetListing { .. } => "get_listing",
            Self::MyListings { .. } => "my_listings",
            Self::WithdrawListing { .. } => "withdraw_listing",
            Self::Purchase { .. } => "purchase",
            Self::ConfirmPayment { .. } => "confirm_payment",
            Self::CancelOrder { .. } => "cancel_order",
            Self::Transfer { .. } => "transfer",
            Self::GetOrders { .. } => "get_orders",
            Self::GetOrder { .. } => "get_order",
            Self::Dispute { .. } => "dispute",
            Self::GetDisputes { .. } => "get_disputes",
            Self::GetDispute { .. } => "get_dispute",
            Self::PostMessage { .. } => "post_message",
            Self::GetThread { .. } => "get_thread",
            Self::VerifyUpload { .. } => "verify_upload",
            Self::VerifyDetails { .. } => "verify_details",
            Self::VerifyFraudCheck { .. } => "verify_fraud_check",
            Self::VerifySubmit { .. } => "verify_submit",
            Self::VerifyResubmit { .. } => "verify_resubmit",
            Self::VerificationQueue => "verification_queue",
            Self::AdminVerify { .. } => "admin_verify",
            Self::EscalateDispute { .. } => "escalate_dispute",
            Self::ResolveDispute { .. } => "resolve_dispute",
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Listing as shown to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingView {
    /// Listing id.
    pub id: ListingId,
    /// Owning seller.
    pub seller: ActorId,
    /// Event name.
    pub event_name: String,
    /// Venue.
    pub venue: String,
    /// Event start.
    pub event_date: DateTime<Utc>,
    /// Ticket type.
    pub ticket_type: String,
    /// Tickets remaining.
    pub quantity: u32,
    /// Original per-ticket price.
    pub original_price: Money,
    /// Asking per-ticket price.
    pub asking_price: Money,
    /// Verification level.
    pub verification_level: VerificationLevel,
    /// Accepting purchases.
    pub active: bool,
    /// Detail views.
    pub view_count: u64,
}

impl From<&Listing> for ListingView {
    fn from(l: &Listing) -> Self {
        Self {
            id: l.id,
            seller: l.seller,
            event_name: l.event_name.clone(),
            venue: l.venue.clone(),
            event_date: l.event_date,
            ticket_type: l.ticket_type.clone(),
            quantity: l.quantity,
            original_price: l.original_price,
            asking_price: l.asking_price,
            verification_level: l.verification_level,
            active: l.active,
            view_count: l.view_count,
        }
    }
}

/// Transfer state as shown on an order view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferView {
    /// Transfer status.
    pub status: String,
    /// Seller proof URLs.
    pub seller_proof_urls: Vec<String>,
    /// Seller notes.
    pub seller_notes: Option<String>,
    /// Deadline for the party currently on the hook.
    pub response_deadline: DateTime<Utc>,
    /// When proof landed.
    pub proof_submitted_at: Option<DateTime<Utc>>,
}

impl From<&Transfer> for TransferView {
    fn from(t: &Transfer) -> Self {
        Self {
            status: t.status.to_string(),
            seller_proof_urls: t.seller_proof_urls.clone(),
            seller_notes: t.seller_notes.clone(),
            response_deadline: t.response_deadline,
            proof_submitted_at: t.proof_submitted_at,
        }
    }
}

/// One timeline entry on an order view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Status entered.
    pub status: String,
    /// When.
    pub at: DateTime<Utc>,
    /// True for deadline-sweep transitions.
    pub by_system: bool,
}

impl From<&StatusChange> for TimelineEntry {
    fn from(c: &StatusChange) -> Self {
        Self { status: c.status.to_string(), at: c.at, by_system: c.by_system }
    }
}

/// Order as shown to its parties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    /// Order id.
    pub id: OrderId,
    /// The listing purchased from.
    pub listing_id: ListingId,
    /// Buyer.
    pub buyer: ActorId,
    /// Seller.
    pub seller: ActorId,
    /// Tickets purchased.
    pub quantity: u32,
    /// Subtotal.
    pub subtotal: Money,
    /// Platform fee.
    pub platform_fee: Money,
    /// Buyer-protection fee.
    pub buyer_protection_fee: Money,
    /// Buyer total.
    pub total: Money,
    /// Seller payout on clean completion.
    pub seller_payout: Money,
    /// Current status.
    pub status: String,
    /// Opaque payment handle the client completes checkout against.
    pub payment_ref: Option<String>,
    /// Computed status timeline.
    pub timeline: Vec<TimelineEntry>,
    /// Transfer state, once confirmed.
    pub transfer: Option<TransferView>,
}

impl OrderView {
    /// Builds the view from an order and its optional transfer.
    #[must_use]
    pub fn build(order: &Order, transfer: Option<&Transfer>) -> Self {
        Self {
            id: order.id,
            listing_id: order.listing_id,
            buyer: order.buyer,
            seller: order.seller,
            quantity: order.quantity,
            subtotal: order.subtotal,
            platform_fee: order.platform_fee,
            buyer_protection_fee: order.buyer_protection_fee,
            total: order.total,
            seller_payout: order.seller_payout,
            status: order.status.to_string(),
            payment_ref: order.hold.map(|h| h.to_string()),
            timeline: order.history.iter().map(TimelineEntry::from).collect(),
            transfer: transfer.map(TransferView::from),
        }
    }
}

/// Dispute as shown to its parties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeView {
    /// Dispute id.
    pub id: DisputeId,
    /// The disputed order.
    pub order_id: OrderId,
    /// Status.
    pub status: String,
    /// Reason.
    pub reason: DisputeReason,
    /// Opener's description.
    pub description: String,
    /// Response deadline, while one is running.
    pub response_deadline: Option<DateTime<Utc>>,
    /// Resolution notes, once resolved.
    pub resolution_notes: Option<String>,
    /// Bound refund amount, once resolved.
    pub refund_amount: Option<Money>,
    /// Bound seller payout, once resolved.
    pub seller_payout_amount: Option<Money>,
}

impl From<&Dispute> for DisputeView {
    fn from(d: &Dispute) -> Self {
        Self {
            id: d.id,
            order_id: d.order_id,
            status: d.status.to_string(),
            reason: d.reason,
            description: d.description.clone(),
            response_deadline: d.response_deadline,
            resolution_notes: d.resolution_notes.clone(),
            refund_amount: d.refund_amount,
            seller_payout_amount: d.seller_payout_amount,
        }
    }
}

/// Verification request as shown to the seller and reviewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationView {
    /// Request id.
    pub id: RequestId,
    /// The listing.
    pub listing_id: ListingId,
    /// Status.
    pub status: String,
    /// Kinds uploaded so far.
    pub proofs: Vec<ProofKind>,
    /// Fraud check outcome, if run.
    pub fraud_check: Option<relist_verify::FraudCheckResult>,
    /// Queued for review since.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Reviewer note, if any.
    pub reviewer_note: Option<String>,
}

impl From<&VerificationRequest> for VerificationView {
    fn from(r: &VerificationRequest) -> Self {
        Self {
            id: r.id,
            listing_id: r.listing_id,
            status: r.status.to_string(),
            proofs: r.proofs.iter().map(|p| p.kind).collect(),
            fraud_check: r.fraud_check_result.clone(),
            submitted_at: r.submitted_at,
            reviewer_note: r.reviewer_note.clone(),
        }
    }
}

/// Message as shown on a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    /// Sender.
    pub sender: ActorId,
    /// Body.
    pub body: String,
    /// When sent.
    pub sent_at: DateTime<Utc>,
}

impl From<&Message> for MessageView {
    fn from(m: &Message) -> Self {
        Self { sender: m.sender, body: m.body.clone(), sent_at: m.sent_at }
    }
}

/// Every response the gateway returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum ApiResponse {
    /// One listing.
    Listing(ListingView),
    /// A page of listings.
    Listings(Page<ListingView>),
    /// One order.
    Order(OrderView),
    /// A page of orders.
    Orders(Page<OrderView>),
    /// One dispute.
    Dispute(DisputeView),
    /// A page of disputes.
    Disputes(Page<DisputeView>),
    /// One verification request.
    Verification(VerificationView),
    /// The review queue, oldest first.
    VerificationQueue {
        /// Queued requests.
        requests: Vec<VerificationView>,
    },
    /// One posted message.
    Message(MessageView),
    /// A full order thread, oldest first.
    Thread {
        /// The messages.
        messages: Vec<MessageView>,
    },
    /// Operation acknowledged with nothing else to say.
    Ack,
}
