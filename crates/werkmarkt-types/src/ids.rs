//! Strongly-typed identifiers for marketplace entities
//!
//! All IDs are UUID-based but wrapped in newtype structs for type safety.
//! They serialize as the bare UUID so the wire contract stays plain.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user (client or expert)
    UserId
);
uuid_id!(
    /// Unique identifier for a project posting
    PostingId
);
uuid_id!(
    /// Unique identifier for a proposal
    ProposalId
);
uuid_id!(
    /// Unique identifier for a booking request
    BookingId
);
uuid_id!(
    /// Unique identifier for an engagement ("project" in the UI)
    EngagementId
);
uuid_id!(
    /// Unique identifier for a review
    ReviewId
);
uuid_id!(
    /// Unique identifier for a payment ledger entry
    PaymentId
);
uuid_id!(
    /// Unique identifier for a payout
    PayoutId
);

/// Identifier of an external checkout session, assigned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
