//! Bearer-token authentication.
//!
//! Identity lives in an external service; the gateway only maps opaque
//! bearer tokens to the [`Actor`] that service minted for them.

use std::collections::HashMap;

use parking_lot::RwLock;
use relist_core::{Actor, ActorId, Role};

use crate::api::{ApiError, ApiErrorKind};

/// Minimum accepted token length.
const MIN_TOKEN_LENGTH: usize = 8;

/// In-memory bearer-token registry.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<String, Actor>>,
}

impl TokenRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token for an actor. Short tokens are refused.
    pub fn issue(&self, token: impl Into<String>, actor: Actor) -> Result<(), ApiError> {
        let token = token.into();
        if token.len() < MIN_TOKEN_LENGTH {
            return Err(ApiError::validation("token too short"));
        }
        self.tokens.write().insert(token, actor);
        Ok(())
    }

    /// Convenience: mints a fresh actor with one role under the token.
    pub fn issue_role(&self, token: impl Into<String>, role: Role) -> Result<Actor, ApiError> {
        let actor = Actor::new(ActorId::new(), role);
        self.issue(token, actor.clone())?;
        Ok(actor)
    }

    /// Revokes a token.
    pub fn revoke(&self, token: &str) {
        self.tokens.write().remove(token);
    }

    /// Resolves a bearer token (with or without the `Bearer ` prefix).
    pub fn authenticate(&self, header: &str) -> Result<Actor, ApiError> {
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(ApiError::unauthorized("missing bearer token"));
        }
        self.tokens
            .read()
            .get(token)
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("unknown bearer token"))
    }
}

/// Requires a role on an authenticated actor.
pub fn require_role(actor: &Actor, role: Role) -> Result<(), ApiError> {
    if actor.has_role(role) {
        Ok(())
    } else {
        Err(ApiError {
            kind: ApiErrorKind::Forbidden,
            message: format!("requires the {role} role"),
            field: None,
            incident: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_authenticate() {
        let registry = TokenRegistry::new();
        let actor = registry.issue_role("buyer-token-1", Role::Buyer).unwrap();

        let resolved = registry.authenticate("buyer-token-1").unwrap();
        assert_eq!(resolved.id, actor.id);

        let with_prefix = registry.authenticate("Bearer buyer-token-1").unwrap();
        assert_eq!(with_prefix.id, actor.id);
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let registry = TokenRegistry::new();
        let err = registry.authenticate("Bearer nope").unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    }

    #[test]
    fn short_tokens_refused() {
        let registry = TokenRegistry::new();
        assert!(registry.issue_role("short", Role::Buyer).is_err());
    }

    #[test]
    fn revoke_removes_access() {
        let registry = TokenRegistry::new();
        registry.issue_role("buyer-token-1", Role::Buyer).unwrap();
        registry.revoke("buyer-token-1");
        assert!(registry.authenticate("buyer-token-1").is_err());
    }

    #[test]
    fn require_role_checks() {
        let actor = Actor::new(ActorId::new(), Role::Buyer);
        assert!(require_role(&actor, Role::Buyer).is_ok());
        assert_eq!(
            require_role(&actor, Role::Reviewer).unwrap_err().kind,
            ApiErrorKind::Forbidden
        );
    }
}
