//! Call log repository implementation

use async_trait::async_trait;
use callmask_core::{
    models::{CallLog, CallStatus, CallerType, NewCallLog},
    traits::CallLogRepository,
    AppError, AppResult,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of CallLogRepository
pub struct PgCallLogRepository {
    pool: PgPool,
}

impl PgCallLogRepository {
    /// Create a new call log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CallLogRepository for PgCallLogRepository {
    #[instrument(skip(self, entry), fields(virtual_number_id = %entry.virtual_number_id))]
    async fn create(&self, entry: &NewCallLog) -> AppResult<CallLog> {
        debug!("Logging {} call attempt", entry.caller_type);

        let row = sqlx::query_as::<sqlx::Postgres, CallLogRow>(
            r#"
            INSERT INTO call_logs (virtual_number_id, caller_type, caller_number, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, virtual_number_id, caller_type, caller_number, status, created_at
            "#,
        )
        .bind(entry.virtual_number_id)
        .bind(entry.caller_type.to_string())
        .bind(&entry.caller_number)
        .bind(entry.status.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating call log: {}", e);
            AppError::Database(format!("Failed to create call log: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Vec<CallLog>> {
        debug!("Fetching call logs for booking: {}", booking_id);

        let rows = sqlx::query_as::<sqlx::Postgres, CallLogRow>(
            r#"
            SELECT
                cl.id, cl.virtual_number_id, cl.caller_type,
                cl.caller_number, cl.status, cl.created_at
            FROM call_logs cl
            JOIN virtual_numbers vn ON vn.id = cl.virtual_number_id
            WHERE vn.booking_id = $1
            ORDER BY cl.created_at ASC
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching call logs: {}", e);
            AppError::Database(format!("Failed to fetch call logs: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct CallLogRow {
    id: Uuid,
    virtual_number_id: Uuid,
    caller_type: Option<String>,
    caller_number: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<CallLogRow> for CallLog {
    fn from(row: CallLogRow) -> Self {
        Self {
            id: row.id,
            virtual_number_id: row.virtual_number_id,
            caller_type: row
                .caller_type
                .as_deref()
                .and_then(|s| s.parse::<CallerType>().ok()),
            caller_number: row.caller_number,
            status: CallStatus::parse(&row.status),
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_tolerates_unknown_caller_type() {
        let log: CallLog = CallLogRow {
            id: Uuid::new_v4(),
            virtual_number_id: Uuid::new_v4(),
            caller_type: Some("operator".to_string()),
            caller_number: None,
            status: "completed".to_string(),
            created_at: Utc::now(),
        }
        .into();

        assert!(log.caller_type.is_none());
        assert_eq!(log.status, CallStatus::Completed);
    }
}
