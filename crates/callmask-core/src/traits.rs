//! Common traits for repositories
//!
//! Defines the storage abstractions the masking service is written against.
//! The database crate provides the PostgreSQL implementations.

use crate::error::AppError;
use crate::models::{Booking, CallLog, NewCallLog, SecurityAlert, VirtualNumber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Booking lookups
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID, including the serving driver
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError>;
}

/// Virtual number storage
#[async_trait]
pub trait VirtualNumberRepository: Send + Sync {
    /// Deactivate the booking's current numbers and store `number` as the active one
    async fn replace_active(&self, number: &VirtualNumber) -> Result<VirtualNumber, AppError>;

    /// The booking's active number, or its most recently issued one when none is active
    async fn find_current_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<VirtualNumber>, AppError>;

    /// Deactivate every number of a booking and set its expiry to `at`
    async fn expire_by_booking(&self, booking_id: Uuid, at: DateTime<Utc>)
        -> Result<u64, AppError>;

    /// Deactivate numbers that are still active but expired before `now`
    async fn deactivate_lapsed(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// Call log storage
#[async_trait]
pub trait CallLogRepository: Send + Sync {
    /// Append a call log entry
    async fn create(&self, entry: &NewCallLog) -> Result<CallLog, AppError>;

    /// All calls placed through any of the booking's numbers, oldest first
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Vec<CallLog>, AppError>;
}

/// Security alert storage
#[async_trait]
pub trait SecurityAlertRepository: Send + Sync {
    /// Record an alert against a booking
    async fn create(
        &self,
        booking_id: Uuid,
        alert_type: &str,
        details: &str,
    ) -> Result<SecurityAlert, AppError>;
}
