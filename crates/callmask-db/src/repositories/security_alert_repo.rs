//! Security alert repository implementation

use async_trait::async_trait;
use callmask_core::{
    models::SecurityAlert, traits::SecurityAlertRepository, AppError, AppResult,
};
use sqlx::{PgPool, Row};
use tracing::{error, instrument, warn};
use uuid::Uuid;

/// PostgreSQL implementation of SecurityAlertRepository
pub struct PgSecurityAlertRepository {
    pool: PgPool,
}

impl PgSecurityAlertRepository {
    /// Create a new security alert repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecurityAlertRepository for PgSecurityAlertRepository {
    #[instrument(skip(self, details))]
    async fn create(
        &self,
        booking_id: Uuid,
        alert_type: &str,
        details: &str,
    ) -> AppResult<SecurityAlert> {
        warn!("Recording {} alert for booking {}", alert_type, booking_id);

        let alert = sqlx::query(
            r#"
            INSERT INTO security_alerts (booking_id, alert_type, details)
            VALUES ($1, $2, $3)
            RETURNING id, booking_id, alert_type, details, created_at
            "#,
        )
        .bind(booking_id)
        .bind(alert_type)
        .bind(details)
        .map(|row: sqlx::postgres::PgRow| SecurityAlert {
            id: row.get("id"),
            booking_id: row.get("booking_id"),
            alert_type: row.get("alert_type"),
            details: row.get("details"),
            created_at: row.get("created_at"),
        })
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating security alert: {}", e);
            AppError::Database(format!("Failed to create security alert: {}", e))
        })?;

        Ok(alert)
    }
}
