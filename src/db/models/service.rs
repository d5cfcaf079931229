use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

/// Catalog entry, owned by the external service catalog. The booking engine
/// only reads the fixed duration and the active flag.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub active: bool,
}
