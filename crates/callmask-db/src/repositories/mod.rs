//! Repository implementations
//!
//! This module contains concrete implementations of the repository traits
//! defined in callmask-core, using sqlx for PostgreSQL access.

pub mod booking_repo;
pub mod call_log_repo;
pub mod security_alert_repo;
pub mod virtual_number_repo;

pub use booking_repo::PgBookingRepository;
pub use call_log_repo::PgCallLogRepository;
pub use security_alert_repo::PgSecurityAlertRepository;
pub use virtual_number_repo::PgVirtualNumberRepository;
