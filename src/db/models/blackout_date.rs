use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

/// An ad-hoc date on which a provider accepts no appointments, regardless of
/// any weekly rule. Unique per (provider_id, date).
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct BlackoutDate {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub date: Date,
    pub reason: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBlackoutDate {
    pub date: Date,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}
