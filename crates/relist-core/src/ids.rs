//! Typed identifiers for core entities.
//!
//! Each entity gets its own newtype over a v4 UUID so that a listing id
//! can never be passed where an order id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| CoreError::InvalidId(s.to_string()))
            }
        }
    };
}

entity_id!(
    /// Identifier of an authenticated principal (buyer, seller, or reviewer).
    ActorId
);
entity_id!(
    /// Identifier of a resale listing.
    ListingId
);
entity_id!(
    /// Identifier of an escrow order.
    OrderId
);
entity_id!(
    /// Identifier of a ticket transfer workflow.
    TransferId
);
entity_id!(
    /// Identifier of a dispute.
    DisputeId
);
entity_id!(
    /// Identifier of a verification request.
    RequestId
);
entity_id!(
    /// Identifier of an order thread message.
    MessageId
);
