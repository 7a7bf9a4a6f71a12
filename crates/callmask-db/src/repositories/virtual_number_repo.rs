//! Virtual number repository implementation
//!
//! Provides PostgreSQL-backed storage for masking numbers with queries for
//! active-number lookup, explicit expiry and lapsed-number sweeping.

use async_trait::async_trait;
use callmask_core::{
    models::VirtualNumber, traits::VirtualNumberRepository, AppError, AppResult,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of VirtualNumberRepository
pub struct PgVirtualNumberRepository {
    pool: PgPool,
}

impl PgVirtualNumberRepository {
    /// Create a new virtual number repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VirtualNumberRepository for PgVirtualNumberRepository {
    #[instrument(skip(self, number), fields(booking_id = %number.booking_id))]
    async fn replace_active(&self, number: &VirtualNumber) -> AppResult<VirtualNumber> {
        debug!("Issuing virtual number for booking: {}", number.booking_id);

        // Start transaction
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let superseded = sqlx::query(
            r#"
            UPDATE virtual_numbers
            SET is_active = FALSE
            WHERE booking_id = $1 AND is_active
            "#,
        )
        .bind(number.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to retire previous virtual numbers: {}", e);
            AppError::Database(format!("Failed to retire previous numbers: {}", e))
        })?
        .rows_affected();

        let row = sqlx::query_as::<sqlx::Postgres, VirtualNumberRow>(
            r#"
            INSERT INTO virtual_numbers (
                id, booking_id, virtual_number, expires_at, is_active
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, booking_id, virtual_number, expires_at, is_active, created_at
            "#,
        )
        .bind(number.id)
        .bind(number.booking_id)
        .bind(&number.virtual_number)
        .bind(number.expires_at)
        .bind(number.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to store virtual number: {}", e);
            AppError::Database(format!("Failed to store virtual number: {}", e))
        })?;

        // Commit transaction
        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        if superseded > 0 {
            debug!(
                "Superseded {} earlier virtual number(s) for booking {}",
                superseded, number.booking_id
            );
        }

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_current_by_booking(&self, booking_id: Uuid) -> AppResult<Option<VirtualNumber>> {
        debug!("Finding current virtual number for booking: {}", booking_id);

        let result = sqlx::query_as::<sqlx::Postgres, VirtualNumberRow>(
            r#"
            SELECT id, booking_id, virtual_number, expires_at, is_active, created_at
            FROM virtual_numbers
            WHERE booking_id = $1
            ORDER BY is_active DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding virtual number: {}", e);
            AppError::Database(format!("Failed to find virtual number: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn expire_by_booking(&self, booking_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        debug!("Expiring virtual numbers for booking: {}", booking_id);

        let result = sqlx::query(
            r#"
            UPDATE virtual_numbers
            SET is_active = FALSE,
                expires_at = $2
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error expiring virtual numbers: {}", e);
            AppError::Database(format!("Failed to expire virtual numbers: {}", e))
        })?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn deactivate_lapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        debug!("Deactivating lapsed virtual numbers");

        let result = sqlx::query(
            r#"
            UPDATE virtual_numbers
            SET is_active = FALSE
            WHERE is_active AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error deactivating lapsed numbers: {}", e);
            AppError::Database(format!("Failed to deactivate lapsed numbers: {}", e))
        })?;

        let count = result.rows_affected();

        if count > 0 {
            info!("Deactivated {} lapsed virtual numbers", count);
        }

        Ok(count)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct VirtualNumberRow {
    id: Uuid,
    booking_id: Uuid,
    virtual_number: String,
    expires_at: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<VirtualNumberRow> for VirtualNumber {
    fn from(row: VirtualNumberRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            virtual_number: row.virtual_number,
            expires_at: row.expires_at,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, run_migrations};
    use callmask_core::config::DatabaseConfig;
    use chrono::Duration;

    async fn test_pool() -> PgPool {
        let config = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/callmask".to_string()),
            max_connections: 2,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 60,
            run_migrations: true,
        };
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn insert_booking(pool: &PgPool) -> Uuid {
        sqlx::query_scalar("INSERT INTO bookings (payment_status) VALUES ('paid') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_replace_and_expire() {
        let pool = test_pool().await;
        let repo = PgVirtualNumberRepository::new(pool.clone());
        let booking_id = insert_booking(&pool).await;

        let first = VirtualNumber::new(booking_id, "+910000000001".to_string(), Duration::hours(24));
        repo.replace_active(&first).await.unwrap();

        let second = VirtualNumber::new(booking_id, "+910000000002".to_string(), Duration::hours(24));
        repo.replace_active(&second).await.unwrap();

        let current = repo.find_current_by_booking(booking_id).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
        assert!(current.is_active);

        let now = Utc::now();
        let expired = repo.expire_by_booking(booking_id, now).await.unwrap();
        assert_eq!(expired, 2);

        let current = repo.find_current_by_booking(booking_id).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
        assert!(!current.is_active);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_deactivate_lapsed() {
        let pool = test_pool().await;
        let repo = PgVirtualNumberRepository::new(pool.clone());
        let booking_id = insert_booking(&pool).await;

        let mut lapsed = VirtualNumber::new(booking_id, "+910000000003".to_string(), Duration::hours(24));
        lapsed.expires_at = Utc::now() - Duration::minutes(5);
        repo.replace_active(&lapsed).await.unwrap();

        assert!(repo.deactivate_lapsed(Utc::now()).await.unwrap() >= 1);

        let current = repo.find_current_by_booking(booking_id).await.unwrap().unwrap();
        assert_eq!(current.id, lapsed.id);
        assert!(!current.is_active);
    }
}
