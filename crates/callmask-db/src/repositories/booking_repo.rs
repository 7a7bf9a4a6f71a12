//! Booking repository implementation
//!
//! Read-only access to bookings. The serving driver is resolved through the
//! booked route's vehicle.

use async_trait::async_trait;
use callmask_core::{
    models::{Booking, PaymentStatus},
    traits::BookingRepository,
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                b.id, b.user_id, b.route_id,
                COALESCE(b.status, 'pending') AS status,
                COALESCE(b.payment_status, 'pending') AS payment_status,
                v.driver_id
            FROM bookings b
            LEFT JOIN routes r ON r.id = b.route_id
            LEFT JOIN vehicles v ON v.id = r.vehicle_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Option<Uuid>,
    route_id: Option<Uuid>,
    status: String,
    payment_status: String,
    driver_id: Option<Uuid>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            route_id: row.route_id,
            status: row.status,
            payment_status: PaymentStatus::parse(&row.payment_status),
            driver_id: row.driver_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let id = Uuid::new_v4();
        let booking: Booking = BookingRow {
            id,
            user_id: None,
            route_id: None,
            status: "confirmed".to_string(),
            payment_status: "paid".to_string(),
            driver_id: Some(Uuid::new_v4()),
        }
        .into();

        assert_eq!(booking.id, id);
        assert_eq!(booking.payment_status, PaymentStatus::Paid);
        assert!(booking.driver_id.is_some());
    }
}
