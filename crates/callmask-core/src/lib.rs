//! Callmask Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the call-masking service. It includes:
//!
//! - Domain models (Booking, VirtualNumber, CallLog, SecurityAlert)
//! - Repository traits implemented by the database layer
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
