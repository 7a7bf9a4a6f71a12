//! Virtual number derivation
//!
//! Numbers are derived from the booking identifier with HMAC-SHA256, so the
//! same booking always maps to the same number under a given key and no
//! lookup table is needed to reissue it.

use callmask_core::{config::MaskingConfig, AppError, AppResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Keyed generator of masking numbers
#[derive(Clone)]
pub struct NumberGenerator {
    secret: Vec<u8>,
    prefix: String,
    digits: usize,
}

impl NumberGenerator {
    /// Create a generator with an explicit key, prefix and digit count
    pub fn new(secret: impl AsRef<[u8]>, prefix: impl Into<String>, digits: usize) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            prefix: prefix.into(),
            digits,
        }
    }

    /// Create a generator from the masking settings
    pub fn from_config(config: &MaskingConfig) -> Self {
        Self::new(&config.secret, config.country_prefix.clone(), config.digits)
    }

    /// Derive the masking number for a booking
    pub fn generate(&self, booking_id: &Uuid) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(format!("Invalid masking key: {}", e)))?;
        mac.update(booking_id.to_string().as_bytes());

        let digest = hex::encode(mac.finalize().into_bytes());
        let take = self.digits.min(digest.len());

        Ok(format!("{}{}", self.prefix, &digest[..take]))
    }
}

impl std::fmt::Debug for NumberGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberGenerator")
            .field("prefix", &self.prefix)
            .field("digits", &self.digits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> Uuid {
        Uuid::parse_str("6f1c2a9e-3b4d-4c5e-8f70-112233445566").unwrap()
    }

    #[test]
    fn test_same_booking_same_number() {
        let generator = NumberGenerator::new("secret", "+91", 10);
        let first = generator.generate(&booking()).unwrap();
        let second = generator.generate(&booking()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_number_format() {
        let generator = NumberGenerator::new("secret", "+91", 10);
        let number = generator.generate(&booking()).unwrap();
        assert!(number.starts_with("+91"));
        assert_eq!(number.len(), 13);
        assert!(number[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_and_booking_change_the_number() {
        let a = NumberGenerator::new("secret-a", "+91", 10);
        let b = NumberGenerator::new("secret-b", "+91", 10);
        assert_ne!(a.generate(&booking()).unwrap(), b.generate(&booking()).unwrap());
        assert_ne!(
            a.generate(&booking()).unwrap(),
            a.generate(&Uuid::new_v4()).unwrap()
        );
    }

    #[test]
    fn test_known_digest_prefix() {
        let generator = NumberGenerator::new("secret", "", 64);
        let full = generator.generate(&booking()).unwrap();

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(b"6f1c2a9e-3b4d-4c5e-8f70-112233445566");
        assert_eq!(full, hex::encode(mac.finalize().into_bytes()));
    }

    #[test]
    fn test_empty_secret_is_accepted() {
        let generator = NumberGenerator::new("", "+91", 10);
        assert!(generator.generate(&booking()).is_ok());
    }
}
