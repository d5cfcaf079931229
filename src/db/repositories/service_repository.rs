use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::Service;

/// Read-only view of the catalog collaborator. Catalog CRUD lives elsewhere.
pub struct ServiceRepository;

impl ServiceRepository {
    pub async fn get_service(pool: &PgPool, service_id: Uuid) -> Result<Service, DatabaseError> {
        sqlx::query_as::<_, Service>(
            "SELECT id, name, duration_minutes, active FROM services WHERE id = $1",
        )
        .bind(service_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or(DatabaseError::NotFound)
    }
}
