//! Business logic services for the call-masking service
//!
//! # Services
//!
//! - `NumberGenerator` - Deterministic keyed derivation of masking numbers
//! - `CallPatternAnalyzer` - Heuristic detection of suspicious call activity
//! - `CallMaskingService` - The generate / connect / expire / verify operations
//! - `ExpirySweeper` - Periodic deactivation of lapsed numbers
//!
//! Services hold their repositories behind `Arc<dyn ...>` so the HTTP layer
//! can share one instance across workers and tests can swap in memory stores.

pub mod analysis;
pub mod masking;
pub mod number;
pub mod sweeper;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analysis::{CallAnalysis, CallPatternAnalyzer, SuspiciousPattern};
pub use masking::{
    CallMaskingService, ConnectOutcome, ExpireOutcome, Repositories, VerifyOutcome,
};
pub use number::NumberGenerator;
pub use sweeper::ExpirySweeper;

/// Business logic constants
pub mod constants {
    /// Details text when no heuristic trips
    pub const NO_SUSPICIOUS_PATTERNS: &str = "No suspicious patterns detected";
}
