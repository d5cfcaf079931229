use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Customer,
    Provider,
}

/// The acting principal for a request. Authentication itself lives in the
/// identity service; it forwards the verified principal in headers and this
/// extractor only reads them.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_ROLE_HEADER: &str = "x-actor-role";

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Forbidden("missing actor identity".into()))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| AppError::Forbidden("malformed actor identity".into()))?;

        let role = match parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some("customer") => ActorRole::Customer,
            Some("provider") => ActorRole::Provider,
            _ => return Err(AppError::Forbidden("missing or unknown actor role".into())),
        };

        Ok(Actor { id, role })
    }
}
