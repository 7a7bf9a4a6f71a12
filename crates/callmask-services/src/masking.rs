//! Call masking service
//!
//! Implements the four masking operations over the repository traits:
//! - `generate` issues the booking's virtual number
//! - `connect` gates a call on payment and expiry and logs it
//! - `expire` retires the booking's numbers immediately
//! - `verify` analyses call history and raises security alerts

use crate::analysis::{CallAnalysis, CallPatternAnalyzer};
use crate::number::NumberGenerator;
use callmask_core::{
    config::{AnalysisConfig, MaskingConfig},
    models::{redact_number, CallerType, NewCallLog, VirtualNumber, SUSPICIOUS_CALL_PATTERN},
    traits::{
        BookingRepository, CallLogRepository, SecurityAlertRepository, VirtualNumberRepository,
    },
    AppError, AppResult,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Storage handles the service operates on
#[derive(Clone)]
pub struct Repositories {
    pub bookings: Arc<dyn BookingRepository>,
    pub numbers: Arc<dyn VirtualNumberRepository>,
    pub calls: Arc<dyn CallLogRepository>,
    pub alerts: Arc<dyn SecurityAlertRepository>,
}

/// Result of a successful `connect`
#[derive(Debug, Clone)]
pub struct ConnectOutcome {
    pub virtual_number: String,
}

/// Result of `expire`
#[derive(Debug, Clone)]
pub struct ExpireOutcome {
    pub expired: u64,
}

/// Result of `verify`
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub analysis: CallAnalysis,
}

impl VerifyOutcome {
    /// A booking is valid when no heuristic tripped
    pub fn is_valid(&self) -> bool {
        !self.analysis.suspicious
    }
}

/// Call masking service
pub struct CallMaskingService {
    repos: Repositories,
    generator: NumberGenerator,
    analyzer: CallPatternAnalyzer,
    ttl: Duration,
    record_alerts: bool,
}

impl CallMaskingService {
    /// Create a new masking service
    pub fn new(
        repos: Repositories,
        generator: NumberGenerator,
        analyzer: CallPatternAnalyzer,
        ttl: Duration,
        record_alerts: bool,
    ) -> Self {
        Self {
            repos,
            generator,
            analyzer,
            ttl,
            record_alerts,
        }
    }

    /// Create a masking service from configuration
    pub fn from_config(
        repos: Repositories,
        masking: &MaskingConfig,
        analysis: &AnalysisConfig,
    ) -> AppResult<Self> {
        Ok(Self::new(
            repos,
            NumberGenerator::from_config(masking),
            CallPatternAnalyzer::from_config(analysis)?,
            Duration::hours(masking.ttl_hours),
            analysis.record_alerts,
        ))
    }

    /// Issue the virtual number for a booking
    ///
    /// The number is derived from the booking id, stored active with the
    /// configured lifetime, and supersedes any number issued earlier.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The booking does not exist
    /// - Storing the number fails
    #[instrument(skip(self))]
    pub async fn generate(&self, booking_id: Uuid) -> AppResult<VirtualNumber> {
        let booking = self
            .repos
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        debug!(
            "Generating virtual number for booking {} (driver: {:?})",
            booking.id, booking.driver_id
        );

        let number = self.generator.generate(&booking.id)?;
        let record = VirtualNumber::new(booking.id, number, self.ttl);
        let stored = self.repos.numbers.replace_active(&record).await?;

        info!(
            "Issued virtual number for booking {} expiring at {}",
            booking.id, stored.expires_at
        );

        Ok(stored)
    }

    /// Connect a call through the booking's virtual number
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The booking does not exist or is not paid
    /// - The booking has no number, or its number was retired before expiry
    /// - The number has expired, whether or not the sweeper has deactivated it
    #[instrument(skip(self, phone_number))]
    pub async fn connect(
        &self,
        booking_id: Uuid,
        phone_number: &str,
        caller_type: CallerType,
    ) -> AppResult<ConnectOutcome> {
        let booking = self
            .repos
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        if !booking.payment_status.permits_calls() {
            warn!(
                "Call refused for booking {}: payment status {}",
                booking_id, booking.payment_status
            );
            return Err(AppError::PaymentRequired);
        }

        let number = self
            .repos
            .numbers
            .find_current_by_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::VirtualNumberNotFound(booking_id.to_string()))?;

        let now = Utc::now();
        if !number.is_usable_at(now) {
            if number.is_expired_at(now) {
                warn!(
                    "Call refused for booking {}: number expired at {}",
                    booking_id, number.expires_at
                );
                return Err(AppError::VirtualNumberExpired);
            }

            warn!("Call refused for booking {}: number retired", booking_id);
            return Err(AppError::VirtualNumberNotFound(booking_id.to_string()));
        }

        let entry = NewCallLog::initiated(number.id, caller_type, phone_number);
        self.repos.calls.create(&entry).await?;

        info!(
            "Connecting {} {} through virtual number for booking {}",
            caller_type,
            redact_number(phone_number),
            booking_id
        );

        Ok(ConnectOutcome {
            virtual_number: number.virtual_number,
        })
    }

    /// Retire every virtual number of a booking immediately
    #[instrument(skip(self))]
    pub async fn expire(&self, booking_id: Uuid) -> AppResult<ExpireOutcome> {
        let expired = self
            .repos
            .numbers
            .expire_by_booking(booking_id, Utc::now())
            .await?;

        info!(
            "Expired {} virtual number(s) for booking {}",
            expired, booking_id
        );

        Ok(ExpireOutcome { expired })
    }

    /// Analyse a booking's call history
    ///
    /// A failure to record the alert is logged and does not fail the request.
    #[instrument(skip(self))]
    pub async fn verify(&self, booking_id: Uuid) -> AppResult<VerifyOutcome> {
        let logs = self.repos.calls.find_by_booking(booking_id).await?;
        let analysis = self.analyzer.analyze(&logs);

        debug!(
            "Analysed {} call(s) for booking {}: {}",
            analysis.call_count, booking_id, analysis.details
        );

        if analysis.suspicious {
            warn!(
                "Suspicious call pattern for booking {}: {}",
                booking_id, analysis.details
            );

            if self.record_alerts {
                if let Err(e) = self
                    .repos
                    .alerts
                    .create(booking_id, SUSPICIOUS_CALL_PATTERN, &analysis.details)
                    .await
                {
                    warn!("Failed to record security alert: {}", e);
                }
            }
        }

        Ok(VerifyOutcome { analysis })
    }
}
