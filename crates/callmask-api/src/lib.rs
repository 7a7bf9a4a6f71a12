//! API layer for the call-masking service
//!
//! A single POST endpoint dispatches on the request's `action` field to the
//! masking service. A health check sits alongside it.

#![forbid(unsafe_code)]

pub mod cors;
pub mod dto;
pub mod handlers;

pub use cors::build_cors;
pub use dto::{CallMaskingRequest, MaskingAction};
pub use handlers::{configure, json_config};
