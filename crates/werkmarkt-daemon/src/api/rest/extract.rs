//! Request extractors
//!
//! The identity edge in front of the daemon authenticates users and
//! forwards who is calling as `x-actor-id` / `x-actor-role` headers; the
//! daemon trusts and parses them, nothing more.

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;
use werkmarkt_types::{ActorContext, ActorRole, UserId};

/// Header naming the acting user
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header naming the acting role
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated actor behind the current request
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub ActorContext);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_str(parts, ACTOR_ID_HEADER)?;
        let user_id = Uuid::parse_str(user_id)
            .map(UserId::from_uuid)
            .map_err(|_| {
                ApiError::BadRequest(format!("{} must be a UUID", ACTOR_ID_HEADER))
            })?;

        let role = match header_str(parts, ACTOR_ROLE_HEADER)?.to_ascii_lowercase().as_str() {
            "client" => ActorRole::Client,
            "expert" => ActorRole::Expert,
            "system" => ActorRole::System,
            other => {
                return Err(ApiError::BadRequest(format!(
                    "unknown actor role: {}",
                    other
                )))
            }
        };

        Ok(Caller(ActorContext::new(user_id, role)))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {} header", name)))?
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("invalid {} header", name)))
}
