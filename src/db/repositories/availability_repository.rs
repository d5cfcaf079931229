use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{AvailabilityRule, BlackoutDate, NewAvailabilityRule, NewBlackoutDate};
use crate::scheduling::clock::CivilTime;

const RULE_COLUMNS: &str = "id, provider_id, day_of_week, start_time, end_time, active, created_at";

pub struct AvailabilityRepository;

impl AvailabilityRepository {
    /// All rules a provider owns, for the availability console.
    pub async fn list_rules(
        pool: &PgPool,
        provider_id: Uuid,
    ) -> Result<Vec<AvailabilityRule>, DatabaseError> {
        sqlx::query_as::<_, AvailabilityRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM availability_rules \
             WHERE provider_id = $1 \
             ORDER BY day_of_week, start_time"
        ))
        .bind(provider_id)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)
    }

    /// Rules for one weekday, the slot generator's read. Inactive rules are
    /// included; the generator skips them.
    pub async fn rules_for_day(
        pool: &PgPool,
        provider_id: Uuid,
        day_of_week: i16,
    ) -> Result<Vec<AvailabilityRule>, DatabaseError> {
        sqlx::query_as::<_, AvailabilityRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM availability_rules \
             WHERE provider_id = $1 AND day_of_week = $2 \
             ORDER BY start_time"
        ))
        .bind(provider_id)
        .bind(day_of_week)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)
    }

    /// Weekdays on which the provider has at least one active rule; lets the
    /// booking UI grey out dates without querying slots for each one.
    pub async fn active_days(
        pool: &PgPool,
        provider_id: Uuid,
    ) -> Result<Vec<i16>, DatabaseError> {
        sqlx::query_scalar::<_, i16>(
            "SELECT DISTINCT day_of_week FROM availability_rules \
             WHERE provider_id = $1 AND active \
             ORDER BY day_of_week",
        )
        .bind(provider_id)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)
    }

    pub async fn create_rule(
        pool: &PgPool,
        provider_id: Uuid,
        new_rule: &NewAvailabilityRule,
    ) -> Result<AvailabilityRule, DatabaseError> {
        sqlx::query_as::<_, AvailabilityRule>(&format!(
            "INSERT INTO availability_rules (provider_id, day_of_week, start_time, end_time, active) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {RULE_COLUMNS}"
        ))
        .bind(provider_id)
        .bind(new_rule.day_of_week)
        .bind(new_rule.start_time)
        .bind(new_rule.end_time)
        .bind(new_rule.active)
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn get_rule(
        pool: &PgPool,
        provider_id: Uuid,
        rule_id: Uuid,
    ) -> Result<AvailabilityRule, DatabaseError> {
        sqlx::query_as::<_, AvailabilityRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM availability_rules \
             WHERE id = $1 AND provider_id = $2"
        ))
        .bind(rule_id)
        .bind(provider_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or(DatabaseError::NotFound)
    }

    /// Writes the merged rule; the handler validates the result of the merge
    /// before calling.
    pub async fn update_rule(
        pool: &PgPool,
        provider_id: Uuid,
        rule_id: Uuid,
        day_of_week: i16,
        start_time: CivilTime,
        end_time: CivilTime,
        active: bool,
    ) -> Result<AvailabilityRule, DatabaseError> {
        sqlx::query_as::<_, AvailabilityRule>(&format!(
            "UPDATE availability_rules \
             SET day_of_week = $3, start_time = $4, end_time = $5, active = $6 \
             WHERE id = $1 AND provider_id = $2 \
             RETURNING {RULE_COLUMNS}"
        ))
        .bind(rule_id)
        .bind(provider_id)
        .bind(day_of_week)
        .bind(start_time)
        .bind(end_time)
        .bind(active)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn delete_rule(
        pool: &PgPool,
        provider_id: Uuid,
        rule_id: Uuid,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM availability_rules WHERE id = $1 AND provider_id = $2",
        )
        .bind(rule_id)
        .bind(provider_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    pub async fn list_blackouts(
        pool: &PgPool,
        provider_id: Uuid,
    ) -> Result<Vec<BlackoutDate>, DatabaseError> {
        sqlx::query_as::<_, BlackoutDate>(
            "SELECT id, provider_id, date, reason, created_at FROM blackout_dates \
             WHERE provider_id = $1 \
             ORDER BY date",
        )
        .bind(provider_id)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)
    }

    pub async fn add_blackout(
        pool: &PgPool,
        provider_id: Uuid,
        new_blackout: &NewBlackoutDate,
    ) -> Result<BlackoutDate, DatabaseError> {
        sqlx::query_as::<_, BlackoutDate>(
            "INSERT INTO blackout_dates (provider_id, date, reason) \
             VALUES ($1, $2, $3) \
             RETURNING id, provider_id, date, reason, created_at",
        )
        .bind(provider_id)
        .bind(new_blackout.date)
        .bind(new_blackout.reason.as_deref())
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn remove_blackout(
        pool: &PgPool,
        provider_id: Uuid,
        blackout_id: Uuid,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM blackout_dates WHERE id = $1 AND provider_id = $2",
        )
        .bind(blackout_id)
        .bind(provider_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    pub async fn is_blackout(
        pool: &PgPool,
        provider_id: Uuid,
        date: Date,
    ) -> Result<bool, DatabaseError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM blackout_dates WHERE provider_id = $1 AND date = $2)",
        )
        .bind(provider_id)
        .bind(date)
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from)
    }
}
