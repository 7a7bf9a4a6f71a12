//! Call-pattern analysis
//!
//! Flags a booking when its call history looks like harassment or number
//! harvesting. Three independent heuristics are applied:
//! - more calls than the configured maximum
//! - any call outside the daytime window, in the configured time zone
//! - two consecutive calls closer together than the minimum gap

use crate::constants::NO_SUSPICIOUS_PATTERNS;
use callmask_core::{config::AnalysisConfig, models::CallLog, AppResult};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

/// A heuristic that tripped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuspiciousPattern {
    ExcessiveCalls,
    OddHourCalls,
    RapidSuccession,
}

impl SuspiciousPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuspiciousPattern::ExcessiveCalls => "excessiveCalls",
            SuspiciousPattern::OddHourCalls => "oddHourCalls",
            SuspiciousPattern::RapidSuccession => "rapidSuccession",
        }
    }
}

impl fmt::Display for SuspiciousPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analysing a booking's call history
#[derive(Debug, Clone, Serialize)]
pub struct CallAnalysis {
    pub suspicious: bool,
    pub patterns: Vec<SuspiciousPattern>,
    pub details: String,
    pub call_count: usize,
}

impl CallAnalysis {
    fn from_patterns(patterns: Vec<SuspiciousPattern>, call_count: usize) -> Self {
        let details = if patterns.is_empty() {
            NO_SUSPICIOUS_PATTERNS.to_string()
        } else {
            patterns
                .iter()
                .map(SuspiciousPattern::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            suspicious: !patterns.is_empty(),
            patterns,
            details,
            call_count,
        }
    }
}

/// Heuristic call-pattern analyzer
#[derive(Debug, Clone)]
pub struct CallPatternAnalyzer {
    max_calls: usize,
    day_start: NaiveTime,
    day_end: NaiveTime,
    min_gap: Duration,
    tz: Tz,
}

impl Default for CallPatternAnalyzer {
    fn default() -> Self {
        Self {
            max_calls: 10,
            day_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            day_end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            min_gap: Duration::seconds(60),
            tz: Tz::UTC,
        }
    }
}

impl CallPatternAnalyzer {
    /// Build an analyzer from the analysis settings
    pub fn from_config(config: &AnalysisConfig) -> AppResult<Self> {
        let hour = |h: u32| {
            NaiveTime::from_hms_opt(h, 0, 0).ok_or_else(|| {
                callmask_core::AppError::Config(format!("Invalid hour in analysis window: {}", h))
            })
        };

        Ok(Self {
            max_calls: config.max_calls,
            day_start: hour(config.day_start_hour)?,
            day_end: hour(config.day_end_hour)?,
            min_gap: Duration::seconds(config.min_call_gap_secs),
            tz: config.tz()?,
        })
    }

    /// Analyse a booking's call history
    pub fn analyze(&self, logs: &[CallLog]) -> CallAnalysis {
        let mut timestamps: Vec<DateTime<Utc>> = logs.iter().map(|log| log.created_at).collect();
        timestamps.sort_unstable();

        let mut patterns = Vec::new();

        if timestamps.len() > self.max_calls {
            patterns.push(SuspiciousPattern::ExcessiveCalls);
        }

        if timestamps.iter().any(|at| self.is_odd_hour(*at)) {
            patterns.push(SuspiciousPattern::OddHourCalls);
        }

        if timestamps
            .windows(2)
            .any(|pair| pair[1] - pair[0] < self.min_gap)
        {
            patterns.push(SuspiciousPattern::RapidSuccession);
        }

        CallAnalysis::from_patterns(patterns, timestamps.len())
    }

    /// Whether a call falls outside the permitted daytime window
    pub fn is_odd_hour(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.tz).time();
        local < self.day_start || local > self.day_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callmask_core::models::CallStatus;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn call_at(h: u32, m: u32, s: u32) -> CallLog {
        CallLog {
            id: Uuid::new_v4(),
            virtual_number_id: Uuid::nil(),
            caller_type: None,
            caller_number: None,
            status: CallStatus::Initiated,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, h, m, s).unwrap(),
        }
    }

    #[test]
    fn test_no_calls_is_clean() {
        let analysis = CallPatternAnalyzer::default().analyze(&[]);
        assert!(!analysis.suspicious);
        assert_eq!(analysis.details, NO_SUSPICIOUS_PATTERNS);
        assert_eq!(analysis.call_count, 0);
    }

    #[test]
    fn test_daytime_spaced_calls_are_clean() {
        let logs = vec![call_at(9, 0, 0), call_at(12, 30, 0), call_at(18, 0, 0)];
        let analysis = CallPatternAnalyzer::default().analyze(&logs);
        assert!(!analysis.suspicious);
        assert!(analysis.patterns.is_empty());
    }

    #[test]
    fn test_excessive_calls() {
        let logs: Vec<CallLog> = (0..11).map(|i| call_at(8 + i, 0, 0)).collect();
        let analysis = CallPatternAnalyzer::default().analyze(&logs);
        assert!(analysis.suspicious);
        assert_eq!(analysis.patterns, vec![SuspiciousPattern::ExcessiveCalls]);
        assert_eq!(analysis.details, "excessiveCalls");
    }

    #[test]
    fn test_ten_calls_is_not_excessive() {
        let logs: Vec<CallLog> = (0..10).map(|i| call_at(8 + i, 0, 0)).collect();
        assert!(!CallPatternAnalyzer::default().analyze(&logs).suspicious);
    }

    #[test]
    fn test_odd_hour_boundaries() {
        let analyzer = CallPatternAnalyzer::default();
        assert!(analyzer.is_odd_hour(call_at(5, 59, 59).created_at));
        assert!(!analyzer.is_odd_hour(call_at(6, 0, 0).created_at));
        assert!(!analyzer.is_odd_hour(call_at(22, 0, 0).created_at));
        assert!(analyzer.is_odd_hour(call_at(22, 0, 1).created_at));
        assert!(analyzer.is_odd_hour(call_at(23, 30, 0).created_at));
    }

    #[test]
    fn test_odd_hour_call_is_flagged() {
        let logs = vec![call_at(10, 0, 0), call_at(2, 15, 0)];
        let analysis = CallPatternAnalyzer::default().analyze(&logs);
        assert!(analysis.suspicious);
        assert_eq!(analysis.patterns, vec![SuspiciousPattern::OddHourCalls]);
    }

    #[test]
    fn test_rapid_succession() {
        let logs = vec![call_at(10, 0, 0), call_at(10, 0, 59)];
        let analysis = CallPatternAnalyzer::default().analyze(&logs);
        assert_eq!(analysis.patterns, vec![SuspiciousPattern::RapidSuccession]);

        let logs = vec![call_at(10, 0, 0), call_at(10, 1, 0)];
        assert!(!CallPatternAnalyzer::default().analyze(&logs).suspicious);
    }

    #[test]
    fn test_rapid_succession_ignores_input_order() {
        let logs = vec![call_at(15, 0, 0), call_at(10, 0, 0), call_at(10, 0, 30)];
        let analysis = CallPatternAnalyzer::default().analyze(&logs);
        assert_eq!(analysis.patterns, vec![SuspiciousPattern::RapidSuccession]);
    }

    #[test]
    fn test_multiple_patterns_are_joined() {
        let logs = vec![call_at(23, 0, 0), call_at(23, 0, 10)];
        let analysis = CallPatternAnalyzer::default().analyze(&logs);
        assert_eq!(analysis.details, "oddHourCalls, rapidSuccession");
    }

    #[test]
    fn test_patterns_serialize_like_details() {
        let analysis = CallPatternAnalyzer::default().analyze(&[call_at(2, 0, 0)]);
        assert_eq!(analysis.details, "oddHourCalls");
        assert_eq!(
            serde_json::to_value(&analysis.patterns).unwrap(),
            serde_json::json!(["oddHourCalls"])
        );
    }

    #[test]
    fn test_window_follows_configured_timezone() {
        let config = AnalysisConfig {
            timezone: "Asia/Kolkata".to_string(),
            ..AnalysisConfig::default()
        };
        let analyzer = CallPatternAnalyzer::from_config(&config).unwrap();

        // 20:00 UTC is 01:30 in Kolkata
        assert!(analyzer.is_odd_hour(call_at(20, 0, 0).created_at));
        // 03:00 UTC is 08:30 in Kolkata
        assert!(!analyzer.is_odd_hour(call_at(3, 0, 0).created_at));
    }
}
