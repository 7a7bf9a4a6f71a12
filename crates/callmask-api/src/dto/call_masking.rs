//! Call masking DTOs
//!
//! Request and response types for the call masking endpoint. Field names are
//! camelCase on the wire.

use callmask_core::models::CallerType;
use callmask_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

/// Operation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskingAction {
    Generate,
    Connect,
    Expire,
    Verify,
}

impl MaskingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaskingAction::Generate => "generate",
            MaskingAction::Connect => "connect",
            MaskingAction::Expire => "expire",
            MaskingAction::Verify => "verify",
        }
    }
}

impl fmt::Display for MaskingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaskingAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate" => Ok(MaskingAction::Generate),
            "connect" => Ok(MaskingAction::Connect),
            "expire" => Ok(MaskingAction::Expire),
            "verify" => Ok(MaskingAction::Verify),
            other => Err(AppError::InvalidAction(other.to_string())),
        }
    }
}

/// Call masking request
///
/// `phoneNumber` and `userType` are only read by `connect`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMaskingRequest {
    /// One of generate, connect, expire, verify
    pub action: String,

    /// Booking the operation applies to
    pub booking_id: String,

    /// Number of the party placing the call
    pub phone_number: Option<String>,

    /// `driver` or `customer`
    pub user_type: Option<String>,
}

/// Caller details of a connect request
#[derive(Debug, Clone, Validate)]
pub struct CallerDetails {
    #[validate(length(min = 7, max = 20, message = "phoneNumber must be 7 to 20 characters"))]
    pub phone_number: String,

    pub caller_type: CallerType,
}

impl CallMaskingRequest {
    /// Parse the requested action
    pub fn action(&self) -> Result<MaskingAction, AppError> {
        self.action.parse().map_err(|e| {
            warn!(action = %self.action, "Rejected unknown action");
            e
        })
    }

    /// Parse the booking identifier
    pub fn booking_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(self.booking_id.trim()).map_err(|_| {
            AppError::InvalidInput(format!("bookingId is not a valid UUID: {}", self.booking_id))
        })
    }

    /// Caller number and type, both required for connect
    pub fn caller(&self) -> Result<CallerDetails, AppError> {
        let phone = self
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::MissingField("phoneNumber".to_string()))?;

        let user_type = self
            .user_type
            .as_deref()
            .ok_or_else(|| AppError::MissingField("userType".to_string()))?;

        let caller_type = user_type.parse::<CallerType>().map_err(AppError::InvalidInput)?;

        let details = CallerDetails {
            phone_number: phone.to_string(),
            caller_type,
        };
        details.validate()?;

        Ok(details)
    }
}

/// Response to `generate`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub virtual_number: String,
}

/// Response to `connect`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub success: bool,
    pub virtual_number: String,
}

/// Response to `expire`
#[derive(Debug, Clone, Serialize)]
pub struct ExpireResponse {
    pub success: bool,
    pub expired: u64,
}

/// Response to `verify`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CallMaskingRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("generate".parse::<MaskingAction>().unwrap(), MaskingAction::Generate);
        assert_eq!("verify".parse::<MaskingAction>().unwrap(), MaskingAction::Verify);

        let err = "delete".parse::<MaskingAction>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid action");
        assert!(matches!(err, AppError::InvalidAction(ref a) if a == "delete"));
    }

    #[test]
    fn test_request_uses_camel_case() {
        let req = request(
            r#"{"action":"connect","bookingId":"6f1c2a9e-3b4d-4c5e-8f70-112233445566","phoneNumber":"+919812345678","userType":"customer"}"#,
        );
        assert_eq!(req.action().unwrap(), MaskingAction::Connect);
        assert!(req.booking_id().is_ok());

        let caller = req.caller().unwrap();
        assert_eq!(caller.phone_number, "+919812345678");
        assert_eq!(caller.caller_type, CallerType::Customer);
    }

    #[test]
    fn test_bad_booking_id() {
        let req = request(r#"{"action":"generate","bookingId":"booking-1"}"#);
        assert!(matches!(req.booking_id(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_connect_fields_required() {
        let req = request(r#"{"action":"connect","bookingId":"x","userType":"driver"}"#);
        assert!(matches!(req.caller(), Err(AppError::MissingField(_))));

        let req = request(r#"{"action":"connect","bookingId":"x","phoneNumber":"+919812345678"}"#);
        assert!(matches!(req.caller(), Err(AppError::MissingField(_))));

        let req = request(
            r#"{"action":"connect","bookingId":"x","phoneNumber":"+919812345678","userType":"admin"}"#,
        );
        assert!(matches!(req.caller(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_phone_length_checked_for_caller_only() {
        let req = request(
            r#"{"action":"connect","bookingId":"x","phoneNumber":"123","userType":"driver"}"#,
        );
        assert!(matches!(req.caller(), Err(AppError::Validation(_))));

        // other actions never look at the caller fields
        let req = request(r#"{"action":"verify","bookingId":"x","phoneNumber":""}"#);
        assert_eq!(req.action().unwrap(), MaskingAction::Verify);
    }

    #[test]
    fn test_response_field_names() {
        let body = serde_json::to_value(VerifyResponse {
            is_valid: false,
            details: "rapidSuccession".to_string(),
        })
        .unwrap();
        assert_eq!(body["isValid"], false);

        let body = serde_json::to_value(ConnectResponse {
            success: true,
            virtual_number: "+91abc".to_string(),
        })
        .unwrap();
        assert_eq!(body["virtualNumber"], "+91abc");
    }
}
