//! Gateway server binary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use relist_audit::TracingAuditLogger;
use relist_core::Actor;
use relist_escrow::{DeadlineSweep, EscrowService};
use relist_gateway::config::{parse_buyer_inaction, parse_token_spec};
use relist_gateway::{FixedWindowLimiter, Gateway, ServerConfig, StaticTier, TokenRegistry, serve};
use relist_listings::ListingStore;
use relist_payment::{MemoryRail, PaymentRail};
use relist_pricing::SellerTier;
use relist_verify::{RuleOracle, VerificationStore};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Relist resale gateway.
#[derive(Debug, Parser)]
#[command(name = "relist-gateway", about = "Ticket resale escrow gateway")]
struct Args {
    /// Bind address.
    #[arg(long, env = "RELIST_BIND", default_value = "127.0.0.1:7420")]
    bind: String,

    /// Seconds between deadline-sweep passes.
    #[arg(long, env = "RELIST_SWEEP_INTERVAL", default_value_t = 60)]
    sweep_interval_secs: u64,

    /// Requests allowed per actor and action per minute.
    #[arg(long, env = "RELIST_RATE_LIMIT", default_value_t = 120)]
    rate_limit_per_minute: u32,

    /// Policy when a buyer misses the transfer response deadline
    /// (auto_confirm or escalate).
    #[arg(long, env = "RELIST_BUYER_INACTION", default_value = "auto_confirm")]
    buyer_inaction: String,

    /// Bearer tokens to register, as roles:token (e.g. buyer+seller:tok-x).
    /// Repeatable.
    #[arg(long = "token")]
    tokens: Vec<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let buyer_inaction = parse_buyer_inaction(&self.buyer_inaction)?;
        let mut tokens = Vec::new();
        for spec in &self.tokens {
            tokens.push(parse_token_spec(spec)?);
        }
        Ok(ServerConfig {
            bind: self.bind,
            sweep_interval_secs: self.sweep_interval_secs,
            rate_limit_per_minute: self.rate_limit_per_minute,
            buyer_inaction,
            tokens,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Args::parse().into_config()?;

    let listings = Arc::new(ListingStore::new());
    let verify = Arc::new(VerificationStore::new());
    // The in-process rail stands in for the payment provider integration.
    let rail: Arc<dyn PaymentRail> = Arc::new(MemoryRail::new());
    let audit = Arc::new(TracingAuditLogger::with_prefix("RELIST"));
    let service = Arc::new(
        EscrowService::new(Arc::clone(&listings), rail).with_audit(audit.clone()),
    );

    let auth = TokenRegistry::new();
    for (token, roles) in &config.tokens {
        let actor = Actor::with_roles(relist_core::ActorId::new(), roles.clone());
        info!(actor = %actor.id, roles = ?roles, "registering bearer token");
        auth.issue(token.clone(), actor)
            .map_err(|e| anyhow::anyhow!("invalid token: {}", e.message))?;
    }

    let gateway = Arc::new(Gateway::new(
        auth,
        Arc::new(FixedWindowLimiter::per_minute(config.rate_limit_per_minute)),
        listings,
        verify,
        Arc::new(RuleOracle::new()),
        Arc::clone(&service),
        Arc::new(StaticTier(SellerTier::Trusted)),
        audit,
    ));

    let sweep = DeadlineSweep::new(service).with_buyer_inaction(config.buyer_inaction);
    let sweep_interval = Duration::from_secs(config.sweep_interval_secs.max(1));
    tokio::spawn(sweep.run(sweep_interval));
    info!(interval_secs = sweep_interval.as_secs(), "deadline sweep started");

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    serve(gateway, listener).await.context("gateway server failed")
}
