//! Authenticated principal model.
//!
//! Identity itself is an external collaborator; the core only sees an
//! [`Actor`] resolved from a bearer token, carrying the roles the principal
//! may act under. A principal can hold both buyer and seller roles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ActorId;

/// Roles a principal may act under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May purchase listings, confirm receipt, report issues.
    Buyer,
    /// May create listings and submit transfer proof.
    Seller,
    /// May work the verification queue and resolve disputes.
    Reviewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
            Self::Reviewer => write!(f, "reviewer"),
        }
    }
}

/// An authenticated principal and the roles it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Principal identifier.
    pub id: ActorId,
    /// Roles granted by the identity service.
    pub roles: Vec<Role>,
}

impl Actor {
    /// Creates an actor with a single role.
    #[must_use]
    pub fn new(id: ActorId, role: Role) -> Self {
        Self { id, roles: vec![role] }
    }

    /// Creates an actor holding several roles.
    #[must_use]
    pub fn with_roles(id: ActorId, roles: Vec<Role>) -> Self {
        Self { id, roles }
    }

    /// Returns true if the actor holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_single_role() {
        let actor = Actor::new(ActorId::new(), Role::Buyer);
        assert!(actor.has_role(Role::Buyer));
        assert!(!actor.has_role(Role::Seller));
    }

    #[test]
    fn actor_dual_role() {
        let actor = Actor::with_roles(ActorId::new(), vec![Role::Buyer, Role::Seller]);
        assert!(actor.has_role(Role::Buyer));
        assert!(actor.has_role(Role::Seller));
        assert!(!actor.has_role(Role::Reviewer));
    }

    #[test]
    fn role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Reviewer).unwrap(), "\"reviewer\"");
    }
}
