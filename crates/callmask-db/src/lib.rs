//! Callmask Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the call-masking service. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for bookings, virtual numbers, call logs and alerts
//! - The reference schema used for local development and integration tests

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use callmask_core::{AppError, AppResult};
pub use sqlx::PgPool;
