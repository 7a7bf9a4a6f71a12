//! Virtual number model
//!
//! A masking number issued for a single booking. Lifecycle:
//! 1. Issued active with a fixed lifetime
//! 2. Used to connect calls while active and unexpired
//! 3. Deactivated explicitly, by a newer issue, or by the sweeper

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Virtual number entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualNumber {
    /// Unique identifier
    pub id: Uuid,

    /// Booking this number masks
    pub booking_id: Uuid,

    /// Formatted masking number
    pub virtual_number: String,

    /// When the number stops accepting calls
    pub expires_at: DateTime<Utc>,

    /// Cleared when the number is retired
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl VirtualNumber {
    /// Create a new active number with the given lifetime
    pub fn new(booking_id: Uuid, virtual_number: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            virtual_number,
            expires_at: now + ttl,
            is_active: true,
            created_at: now,
        }
    }

    /// Check if the expiry has passed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Check if calls may be connected through this number at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }
}
