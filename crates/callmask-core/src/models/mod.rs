//! Domain models for the call-masking service
//!
//! These mirror rows in the externally owned booking store.

pub mod booking;
pub mod call_log;
pub mod security_alert;
pub mod virtual_number;

pub use booking::{Booking, PaymentStatus};
pub use call_log::{redact_number, CallLog, CallStatus, CallerType, NewCallLog};
pub use security_alert::{SecurityAlert, SUSPICIOUS_CALL_PATTERN};
pub use virtual_number::VirtualNumber;
