//! # relist-gateway
//!
//! The request surface of the Relist resale core.
//!
//! Requests arrive as JSON with a bearer token, resolve to an
//! [`relist_core::Actor`], pass a per-actor/action rate limit, and dispatch
//! into the domain services. Domain errors fold into the gateway's error
//! taxonomy (validation / conflict / forbidden / not-found / dependency /
//! rate-limited / internal) with stable status codes.
//!
//! This crate provides:
//!
//! - [`TokenRegistry`] — bearer-token authentication
//! - [`FixedWindowLimiter`] — TTL fixed-window rate limiter behind the
//!   [`RateLimiter`] trait (swap in a shared store for multi-instance
//!   deployments)
//! - [`ApiRequest`] / [`ApiResponse`] / [`ApiError`] — the wire surface
//! - [`Gateway`] — authentication, limiting, and dispatch
//! - [`serve`] — a line-delimited JSON TCP server

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod server;

pub use api::{ApiError, ApiErrorKind, ApiRequest, ApiResponse};
pub use auth::TokenRegistry;
pub use config::ServerConfig;
pub use error::ServerError;
pub use handlers::{Gateway, StaticTier, TierSource};
pub use rate_limit::{FixedWindowLimiter, RateLimiter, UnlimitedLimiter};
pub use server::serve;
