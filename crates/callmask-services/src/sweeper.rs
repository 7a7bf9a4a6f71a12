//! Background deactivation of lapsed virtual numbers

use callmask_core::{traits::VirtualNumberRepository, AppResult};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

/// Periodically flips `is_active` off for numbers past their expiry
pub struct ExpirySweeper {
    numbers: Arc<dyn VirtualNumberRepository>,
    period: Duration,
}

impl ExpirySweeper {
    pub fn new(numbers: Arc<dyn VirtualNumberRepository>, period: Duration) -> Self {
        Self { numbers, period }
    }

    /// Run a single sweep
    pub async fn sweep_once(&self) -> AppResult<u64> {
        let swept = self.numbers.deactivate_lapsed(Utc::now()).await?;
        if swept > 0 {
            info!("Deactivated {} lapsed virtual number(s)", swept);
        } else {
            debug!("No lapsed virtual numbers");
        }
        Ok(swept)
    }

    /// Sweep forever at the configured period
    ///
    /// Errors are logged and the loop keeps going.
    pub async fn run(self) {
        info!("Expiry sweeper started (every {}s)", self.period.as_secs());

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = self.sweep_once().await {
                error!("Expiry sweep failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use callmask_core::models::VirtualNumber;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_sweep_once_deactivates_only_lapsed() {
        let store = Arc::new(MemoryStore::default());
        let lapsed = VirtualNumber::new(
            Uuid::new_v4(),
            "+911111111111".to_string(),
            chrono::Duration::hours(-1),
        );
        let live = VirtualNumber::new(
            Uuid::new_v4(),
            "+912222222222".to_string(),
            chrono::Duration::hours(1),
        );
        store.numbers.lock().extend([lapsed.clone(), live.clone()]);

        let sweeper = ExpirySweeper::new(store.clone(), Duration::from_secs(300));
        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);

        let numbers = store.numbers.lock();
        assert!(!numbers.iter().find(|n| n.id == lapsed.id).unwrap().is_active);
        assert!(numbers.iter().find(|n| n.id == live.id).unwrap().is_active);
        drop(numbers);

        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
    }
}
