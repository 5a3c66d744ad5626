//! Server configuration.

use relist_core::Role;
use relist_escrow::BuyerInactionPolicy;

use crate::error::ServerError;

/// Runtime configuration for the gateway binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address, e.g. `127.0.0.1:7420`.
    pub bind: String,
    /// Seconds between deadline-sweep passes.
    pub sweep_interval_secs: u64,
    /// Requests allowed per actor/action per minute.
    pub rate_limit_per_minute: u32,
    /// Policy when a buyer misses the transfer response deadline.
    pub buyer_inaction: BuyerInactionPolicy,
    /// Bearer tokens to register at startup, as `(token, roles)`.
    pub tokens: Vec<(String, Vec<Role>)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7420".to_string(),
            sweep_interval_secs: 60,
            rate_limit_per_minute: 120,
            buyer_inaction: BuyerInactionPolicy::default(),
            tokens: Vec::new(),
        }
    }
}

/// Parses a `roles:token` CLI argument, e.g. `buyer+seller:tok-abc123`.
pub fn parse_token_spec(spec: &str) -> Result<(String, Vec<Role>), ServerError> {
    let (roles_part, token) = spec
        .split_once(':')
        .ok_or_else(|| ServerError::Config(format!("token spec missing ':': {spec}")))?;
    if token.len() < 8 {
        return Err(ServerError::Config("token must be at least 8 characters".to_string()));
    }
    let mut roles = Vec::new();
    for role in roles_part.split('+') {
        let role = match role {
            "buyer" => Role::Buyer,
            "seller" => Role::Seller,
            "reviewer" => Role::Reviewer,
            other => return Err(ServerError::Config(format!("unknown role: {other}"))),
        };
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    if roles.is_empty() {
        return Err(ServerError::Config(format!("no roles in token spec: {spec}")));
    }
    Ok((token.to_string(), roles))
}

/// Parses the buyer-inaction policy flag.
pub fn parse_buyer_inaction(value: &str) -> Result<BuyerInactionPolicy, ServerError> {
    match value {
        "auto_confirm" => Ok(BuyerInactionPolicy::AutoConfirm),
        "escalate" => Ok(BuyerInactionPolicy::Escalate),
        other => Err(ServerError::Config(format!(
            "buyer-inaction must be auto_confirm or escalate, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_multi_role_tokens() {
        let (token, roles) = parse_token_spec("buyer:tok-abc123").unwrap();
        assert_eq!(token, "tok-abc123");
        assert_eq!(roles, vec![Role::Buyer]);

        let (_, roles) = parse_token_spec("buyer+seller:tok-abc123").unwrap();
        assert_eq!(roles, vec![Role::Buyer, Role::Seller]);
    }

    #[test]
    fn rejects_malformed_specs() {
        assert!(parse_token_spec("no-colon").is_err());
        assert!(parse_token_spec("buyer:short").is_err());
        assert!(parse_token_spec("wizard:tok-abc123").is_err());
        assert!(parse_token_spec(":tok-abc123").is_err());
    }

    #[test]
    fn parses_buyer_inaction_policy() {
        assert_eq!(
            parse_buyer_inaction("auto_confirm").unwrap(),
            BuyerInactionPolicy::AutoConfirm
        );
        assert_eq!(parse_buyer_inaction("escalate").unwrap(), BuyerInactionPolicy::Escalate);
        assert!(parse_buyer_inaction("coin_flip").is_err());
    }
}
