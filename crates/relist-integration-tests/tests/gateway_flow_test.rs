//! Wire-level tests: JSON frames through the TCP gateway.

use std::sync::Arc;

use relist_audit::NoopAuditLogger;
use relist_core::Role;
use relist_escrow::{EscrowService, NoopNotifier};
use relist_gateway::{Gateway, StaticTier, TokenRegistry, UnlimitedLimiter, serve};
use relist_listings::ListingStore;
use relist_payment::{MemoryRail, PaymentRail};
use relist_pricing::SellerTier;
use relist_verify::{RuleOracle, VerificationStore};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

async fn start_gateway() -> std::net::SocketAddr {
    let listings = Arc::new(ListingStore::new());
    let rail: Arc<dyn PaymentRail> = Arc::new(MemoryRail::new());
    let service = Arc::new(
        EscrowService::new(Arc::clone(&listings), rail)
            .with_audit(Arc::new(NoopAuditLogger::new()))
            .with_notifier(Arc::new(NoopNotifier::new())),
    );
    let auth = TokenRegistry::new();
    auth.issue_role("seller-token-1", Role::Seller).expect("token");
    auth.issue_role("buyer-token-11", Role::Buyer).expect("token");

    let gateway = Arc::new(Gateway::new(
        auth,
        Arc::new(UnlimitedLimiter),
        listings,
        Arc::new(VerificationStore::new()),
        Arc::new(RuleOracle::new()),
        service,
        Arc::new(StaticTier(SellerTier::Trusted)),
        Arc::new(NoopAuditLogger::new()),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = serve(gateway, listener).await;
    });
    addr
}

/// One lockstep JSON-lines client connection.
struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (reader, writer) = stream.into_split();
        Self { lines: BufReader::new(reader).lines(), writer }
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.expect("write");
        self.writer.write_all(b"\n").await.expect("write newline");
    }

    async fn read_frame(&mut self) -> Value {
        let line = self.lines.next_line().await.expect("read").expect("line");
        serde_json::from_str(&line).expect("json")
    }

    async fn call(&mut self, frame: Value) -> Value {
        self.send_raw(&frame.to_string()).await;
        self.read_frame().await
    }
}

#[tokio::test]
async fn purchase_flow_over_the_wire() {
    let addr = start_gateway().await;
    let mut client = Client::connect(addr).await;

    // Seller lists two tickets at a 40% markup.
    let event_date = (chrono::Utc::now() + chrono::Duration::days(30)).to_rfc3339();
    let created = client
        .call(json!({
            "token": "seller-token-1",
            "request": {
                "op": "create_listing",
                "event_name": "Warehouse Project",
                "venue": "Depot Mayfield",
                "event_date": event_date,
                "ticket_type": "ga",
                "quantity": 2,
                "original_price": "20.00",
                "asking_price": "28.00"
            }
        }))
        .await;
    assert_eq!(created["ok"]["result"], "listing");
    assert_eq!(created["ok"]["asking_price"], "28.00");
    let listing_id = created["ok"]["id"].as_str().expect("listing id").to_string();

    // Buyer purchases one ticket.
    let order = client
        .call(json!({
            "token": "buyer-token-11",
            "request": {"op": "purchase", "listing_id": listing_id, "quantity": 1}
        }))
        .await;
    assert_eq!(order["ok"]["status"], "pending");
    assert_eq!(order["ok"]["total"], "31.50");
    assert_eq!(order["ok"]["seller_payout"], "25.20");
}

#[tokio::test]
async fn markup_violation_is_a_400_frame() {
    let addr = start_gateway().await;
    let mut client = Client::connect(addr).await;

    let event_date = (chrono::Utc::now() + chrono::Duration::days(30)).to_rfc3339();
    let response = client
        .call(json!({
            "token": "seller-token-1",
            "request": {
                "op": "create_listing",
                "event_name": "Warehouse Project",
                "venue": "Depot Mayfield",
                "event_date": event_date,
                "ticket_type": "ga",
                "quantity": 1,
                "original_price": "20.00",
                "asking_price": "31.00"
            }
        }))
        .await;
    assert_eq!(response["status"], 400);
    assert_eq!(response["error"]["kind"], "validation");
}

#[tokio::test]
async fn bad_token_is_a_401_frame() {
    let addr = start_gateway().await;
    let mut client = Client::connect(addr).await;

    let response = client
        .call(json!({
            "token": "who-dis-token",
            "request": {"op": "get_orders"}
        }))
        .await;
    assert_eq!(response["status"], 401);
    assert_eq!(response["error"]["kind"], "unauthorized");
}

#[tokio::test]
async fn malformed_frames_do_not_kill_the_connection() {
    let addr = start_gateway().await;
    let mut client = Client::connect(addr).await;

    client.send_raw("this is not json").await;
    let response = client.read_frame().await;
    assert_eq!(response["status"], 400);

    // The connection is still usable.
    let response = client
        .call(json!({"token": "buyer-token-11", "request": {"op": "get_orders"}}))
        .await;
    assert_eq!(response["ok"]["result"], "orders");
}
