//! Booking model
//!
//! Only the fields the masking service reads are modelled here.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Payment state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment captured yet
    #[default]
    Pending,
    /// Payment captured
    Paid,
    /// Gateway signature checked, awaiting capture
    Verified,
    /// Payment attempt failed
    Failed,
    /// Payment returned to the customer
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Verified => write!(f, "verified"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl PaymentStatus {
    /// Parse from the stored column value, falling back to `Pending`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "paid" => PaymentStatus::Paid,
            "verified" => PaymentStatus::Verified,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            _ => PaymentStatus::Pending,
        }
    }

    /// Calls may only be connected once the fare is paid
    pub fn permits_calls(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: Uuid,

    /// Customer who made the booking
    pub user_id: Option<Uuid>,

    /// Booked route
    pub route_id: Option<Uuid>,

    /// Booking lifecycle status (owned by the booking front-end)
    pub status: String,

    /// Payment state
    pub payment_status: PaymentStatus,

    /// Driver of the vehicle serving the route
    pub driver_id: Option<Uuid>,
}

impl Booking {
    /// Create a booking with the given payment state
    pub fn new(id: Uuid, payment_status: PaymentStatus) -> Self {
        Self {
            id,
            user_id: None,
            route_id: None,
            status: "pending".to_string(),
            payment_status,
            driver_id: None,
        }
    }
}
