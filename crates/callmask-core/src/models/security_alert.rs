//! Security alert model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alert type written when call-pattern analysis flags a booking
pub const SUSPICIOUS_CALL_PATTERN: &str = "suspicious_call_pattern";

/// Security alert entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub alert_type: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
