//! Call log model
//!
//! One row per call attempted through a virtual number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Party placing the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerType {
    Driver,
    Customer,
}

impl fmt::Display for CallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerType::Driver => write!(f, "driver"),
            CallerType::Customer => write!(f, "customer"),
        }
    }
}

impl FromStr for CallerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driver" => Ok(CallerType::Driver),
            "customer" => Ok(CallerType::Customer),
            other => Err(format!("unknown caller type '{}'", other)),
        }
    }
}

/// Call progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    Initiated,
    Connected,
    Completed,
    Failed,
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStatus::Initiated => write!(f, "initiated"),
            CallStatus::Connected => write!(f, "connected"),
            CallStatus::Completed => write!(f, "completed"),
            CallStatus::Failed => write!(f, "failed"),
        }
    }
}

impl CallStatus {
    /// Parse from the stored column value, falling back to `Initiated`
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "connected" => CallStatus::Connected,
            "completed" => CallStatus::Completed,
            "failed" => CallStatus::Failed,
            _ => CallStatus::Initiated,
        }
    }
}

/// Call log entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLog {
    pub id: Uuid,
    pub virtual_number_id: Uuid,
    pub caller_type: Option<CallerType>,
    pub caller_number: Option<String>,
    pub status: CallStatus,
    pub created_at: DateTime<Utc>,
}

/// Data for appending a call log entry
#[derive(Debug, Clone)]
pub struct NewCallLog {
    pub virtual_number_id: Uuid,
    pub caller_type: CallerType,
    pub caller_number: String,
    pub status: CallStatus,
}

impl NewCallLog {
    /// A call attempt that has just been placed
    pub fn initiated(
        virtual_number_id: Uuid,
        caller_type: CallerType,
        caller_number: impl Into<String>,
    ) -> Self {
        Self {
            virtual_number_id,
            caller_type,
            caller_number: caller_number.into(),
            status: CallStatus::Initiated,
        }
    }
}

/// Hide all but the last four digits of a phone number for logging
pub fn redact_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_type_from_str() {
        assert_eq!("driver".parse::<CallerType>(), Ok(CallerType::Driver));
        assert_eq!("Customer".parse::<CallerType>(), Ok(CallerType::Customer));
        assert!("dispatcher".parse::<CallerType>().is_err());
    }

    #[test]
    fn test_call_status_parse() {
        assert_eq!(CallStatus::parse("initiated"), CallStatus::Initiated);
        assert_eq!(CallStatus::parse("completed"), CallStatus::Completed);
        assert_eq!(CallStatus::parse("unknown"), CallStatus::Initiated);
        assert_eq!(CallStatus::Initiated.to_string(), "initiated");
    }

    #[test]
    fn test_redact_number() {
        assert_eq!(redact_number("+919876543210"), "*********3210");
        assert_eq!(redact_number("123"), "***");
    }
}
