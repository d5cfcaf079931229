use std::time::Duration;

use sqlx::PgPool;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{CommitReservation, Reservation, ReservationFilter, ReservationStatus};
use crate::error::{AppError, AppResult};
use crate::scheduling::clock::CivilTime;

const RESERVATION_COLUMNS: &str = "id, provider_id, customer_id, service_id, date, start_time, \
                                   end_time, status, created_at, updated_at";

/// Attempts per commit before persistent lock contention is reported as a
/// slot conflict. The caller re-queries slots and picks again either way.
const COMMIT_ATTEMPTS: u32 = 3;
const COMMIT_BACKOFF: Duration = Duration::from_millis(50);

/// The authoritative record of committed reservations. This owns the one
/// genuine race in the system: two customers submitting the same slot. The
/// overlap check and the insert run inside a single transaction serialized
/// per (provider_id, date) by a Postgres advisory lock, so one commit always
/// observes the other's write. Different providers, or the same provider on
/// different dates, hash to different lock keys and proceed in parallel.
pub struct ReservationRepository;

impl ReservationRepository {
    /// Commit a reservation for the exact slot the customer picked. The slot
    /// list the customer saw is stale by now; this re-validation against the
    /// live ledger is the enforcement point, not the caller's read.
    pub async fn commit(
        pool: &PgPool,
        request: &CommitReservation,
        duration_minutes: i32,
    ) -> AppResult<Reservation> {
        if duration_minutes <= 0 {
            return Err(AppError::InvalidDuration(duration_minutes));
        }
        // end_time is fixed here, from the service's duration as of this
        // moment, and never recomputed.
        let end_time = request.start_time.add_minutes(duration_minutes)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match Self::try_commit(pool, request, end_time).await {
                Err(AppError::Database(ref err)) if is_lock_contention(err) => {
                    if attempt >= COMMIT_ATTEMPTS {
                        warn!(
                            provider_id = %request.provider_id,
                            date = %request.date,
                            "lock contention persisted across {attempt} commit attempts"
                        );
                        return Err(AppError::SlotConflict);
                    }
                    tokio::time::sleep(COMMIT_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn try_commit(
        pool: &PgPool,
        request: &CommitReservation,
        end_time: CivilTime,
    ) -> AppResult<Reservation> {
        let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

        // Waiting on a wedged writer forever would hold the caller's request
        // open; bound the wait and let the retry loop handle 55P03.
        sqlx::query("SET LOCAL lock_timeout = '2s'")
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        // Advisory lock keyed on (provider_id, date), released with the
        // transaction. This is what serializes check-then-insert.
        sqlx::query(
            "SELECT pg_advisory_xact_lock(hashtextextended($1::text || ':' || $2::text, 0))",
        )
        .bind(request.provider_id)
        .bind(request.date)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let occupied: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
               SELECT 1 FROM reservations \
               WHERE provider_id = $1 AND date = $2 \
                 AND status IN ('pending', 'confirmed', 'completed') \
                 AND start_time < $4 AND end_time > $3 \
             )",
        )
        .bind(request.provider_id)
        .bind(request.date)
        .bind(request.start_time)
        .bind(end_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        if occupied {
            // Expected under contention; dropping the transaction rolls back
            // with nothing written.
            return Err(AppError::SlotConflict);
        }

        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "INSERT INTO reservations \
               (provider_id, customer_id, service_id, date, start_time, end_time, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending') \
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(request.provider_id)
        .bind(request.customer_id)
        .bind(request.service_id)
        .bind(request.date)
        .bind(request.start_time)
        .bind(end_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(
            reservation_id = %reservation.id,
            provider_id = %reservation.provider_id,
            date = %reservation.date,
            start_time = %reservation.start_time,
            "reservation committed"
        );
        Ok(reservation)
    }

    pub async fn get(pool: &PgPool, reservation_id: Uuid) -> Result<Reservation, DatabaseError> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(reservation_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or(DatabaseError::NotFound)
    }

    /// The day's reservations for a provider, the slot generator's snapshot
    /// read. All statuses; the generator decides which ones block.
    pub async fn list_for_day(
        pool: &PgPool,
        provider_id: Uuid,
        date: Date,
    ) -> Result<Vec<Reservation>, DatabaseError> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE provider_id = $1 AND date = $2 \
             ORDER BY start_time"
        ))
        .bind(provider_id)
        .bind(date)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)
    }

    pub async fn list(
        pool: &PgPool,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>, DatabaseError> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE ($1::uuid IS NULL OR provider_id = $1) \
               AND ($2::uuid IS NULL OR customer_id = $2) \
               AND ($3::date IS NULL OR date >= $3) \
               AND ($4::date IS NULL OR date <= $4) \
               AND ($5::reservation_status IS NULL OR status = $5) \
             ORDER BY date, start_time"
        ))
        .bind(filter.provider_id)
        .bind(filter.customer_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.status)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)
    }

    /// Compare-and-set on the status we validated against. A lost race means
    /// someone else transitioned the row first; the client's view is stale.
    pub async fn update_status(
        pool: &PgPool,
        reservation_id: Uuid,
        expected: ReservationStatus,
        target: ReservationStatus,
    ) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(&format!(
            "UPDATE reservations SET status = $3, updated_at = now() \
             WHERE id = $1 AND status = $2 \
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(reservation_id)
        .bind(expected)
        .bind(target)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| {
            AppError::InvalidTransition(format!(
                "reservation {reservation_id} was modified concurrently"
            ))
        })
    }
}

fn is_lock_contention(err: &DatabaseError) -> bool {
    match err {
        DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => matches!(
            db_err.code().as_deref(),
            // lock_not_available, serialization_failure, deadlock_detected
            Some("55P03") | Some("40001") | Some("40P01")
        ),
        _ => false,
    }
}
