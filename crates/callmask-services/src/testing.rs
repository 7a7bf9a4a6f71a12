//! In-memory repositories for tests
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for downstream test suites.

use crate::masking::Repositories;
use async_trait::async_trait;
use callmask_core::models::{
    Booking, CallLog, NewCallLog, PaymentStatus, SecurityAlert, VirtualNumber,
};
use callmask_core::traits::{
    BookingRepository, CallLogRepository, SecurityAlertRepository, VirtualNumberRepository,
};
use callmask_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// One store backing all four repository traits
#[derive(Default)]
pub struct MemoryStore {
    pub bookings: Mutex<Vec<Booking>>,
    pub numbers: Mutex<Vec<VirtualNumber>>,
    pub calls: Mutex<Vec<CallLog>>,
    pub alerts: Mutex<Vec<SecurityAlert>>,
    /// Make alert inserts fail
    pub fail_alerts: bool,
}

impl MemoryStore {
    /// Add a booking with the given payment state and return its id
    pub fn seed_booking(&self, status: PaymentStatus) -> Uuid {
        let id = Uuid::new_v4();
        self.bookings.lock().push(Booking::new(id, status));
        id
    }
}

/// Hand out the same store as every repository
pub fn repositories(store: &Arc<MemoryStore>) -> Repositories {
    Repositories {
        bookings: store.clone(),
        numbers: store.clone(),
        calls: store.clone(),
        alerts: store.clone(),
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.bookings.lock().iter().find(|b| b.id == id).cloned())
    }
}

#[async_trait]
impl VirtualNumberRepository for MemoryStore {
    async fn replace_active(&self, number: &VirtualNumber) -> AppResult<VirtualNumber> {
        let mut numbers = self.numbers.lock();
        for existing in numbers.iter_mut().filter(|n| n.booking_id == number.booking_id) {
            existing.is_active = false;
        }
        numbers.push(number.clone());
        Ok(number.clone())
    }

    async fn find_current_by_booking(&self, booking_id: Uuid) -> AppResult<Option<VirtualNumber>> {
        let numbers = self.numbers.lock();
        let mut issued = numbers.iter().rev().filter(|n| n.booking_id == booking_id);
        let latest = issued.clone().next();
        Ok(issued.find(|n| n.is_active).or(latest).cloned())
    }

    async fn expire_by_booking(&self, booking_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        let mut count = 0;
        for n in self.numbers.lock().iter_mut().filter(|n| n.booking_id == booking_id) {
            n.is_active = false;
            n.expires_at = at;
            count += 1;
        }
        Ok(count)
    }

    async fn deactivate_lapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut count = 0;
        for n in self
            .numbers
            .lock()
            .iter_mut()
            .filter(|n| n.is_active && n.expires_at < now)
        {
            n.is_active = false;
            count += 1;
        }
        Ok(count)
    }
}

#[async_trait]
impl CallLogRepository for MemoryStore {
    async fn create(&self, entry: &NewCallLog) -> AppResult<CallLog> {
        let log = CallLog {
            id: Uuid::new_v4(),
            virtual_number_id: entry.virtual_number_id,
            caller_type: Some(entry.caller_type),
            caller_number: Some(entry.caller_number.clone()),
            status: entry.status,
            created_at: Utc::now(),
        };
        self.calls.lock().push(log.clone());
        Ok(log)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Vec<CallLog>> {
        let ids: Vec<Uuid> = self
            .numbers
            .lock()
            .iter()
            .filter(|n| n.booking_id == booking_id)
            .map(|n| n.id)
            .collect();
        Ok(self
            .calls
            .lock()
            .iter()
            .filter(|c| ids.contains(&c.virtual_number_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SecurityAlertRepository for MemoryStore {
    async fn create(
        &self,
        booking_id: Uuid,
        alert_type: &str,
        details: &str,
    ) -> AppResult<SecurityAlert> {
        if self.fail_alerts {
            return Err(AppError::Database("alerts table unavailable".to_string()));
        }
        let alert = SecurityAlert {
            id: Uuid::new_v4(),
            booking_id,
            alert_type: alert_type.to_string(),
            details: details.to_string(),
            created_at: Utc::now(),
        };
        self.alerts.lock().push(alert.clone());
        Ok(alert)
    }
}
