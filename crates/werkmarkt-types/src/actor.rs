//! Actor context passed into every lifecycle guard
//!
//! Identity and sessions live at the platform edge; the rules engine never
//! reaches into ambient auth state. Every operation takes the acting user
//! explicitly.

use crate::UserId;
use serde::{Deserialize, Serialize};

/// Role the actor holds for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// Buys services, posts work
    Client,
    /// Sells services, submits proposals
    Expert,
    /// Platform itself (payment callbacks, dispute arbitration)
    System,
}

/// Who is performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: UserId,
    pub role: ActorRole,
}

impl ActorContext {
    pub fn new(user_id: UserId, role: ActorRole) -> Self {
        Self { user_id, role }
    }

    /// Platform-internal actor for gateway callbacks and arbitration.
    pub fn system() -> Self {
        Self {
            user_id: UserId::generate(),
            role: ActorRole::System,
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == ActorRole::System
    }

    pub fn is(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
