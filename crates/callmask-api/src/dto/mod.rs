//! Data Transfer Objects (DTOs) for API requests and responses

pub mod call_masking;
pub mod common;

pub use call_masking::*;
pub use common::*;
