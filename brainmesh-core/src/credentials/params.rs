//! Tunable parameters for password hashing.

use serde::{Deserialize, Serialize};

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 120_000;

/// Default salt length in bytes.
pub const DEFAULT_SALT_LENGTH: u32 = 16;

/// Default derived key length in bytes.
pub const DEFAULT_KEY_LENGTH: u32 = 32;

/// Parameters used when producing a new password record.
///
/// Verification never reads these: it uses the iteration count stored in the
/// record and the length of the stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct KdfParams {
    /// Number of PBKDF2-HMAC-SHA256 iterations.
    pub iterations: u32,
    /// Salt length in bytes.
    pub salt_length: u32,
    /// Derived key length in bytes.
    pub key_length: u32,
}

impl KdfParams {
    /// Iteration count, clamped to at least one round.
    #[must_use]
    pub fn effective_iterations(&self) -> u32 {
        self.iterations.max(1)
    }

    /// Salt length, clamped to at least one byte.
    #[must_use]
    pub fn effective_salt_length(&self) -> usize {
        self.salt_length.max(1) as usize
    }

    /// Key length, clamped to at least one byte.
    #[must_use]
    pub fn effective_key_length(&self) -> usize {
        self.key_length.max(1) as usize
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            salt_length: DEFAULT_SALT_LENGTH,
            key_length: DEFAULT_KEY_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = KdfParams::default();
        assert_eq!(params.iterations, 120_000);
        assert_eq!(params.effective_salt_length(), 16);
        assert_eq!(params.effective_key_length(), 32);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let params = KdfParams {
            iterations: 0,
            salt_length: 0,
            key_length: 0,
        };
        assert_eq!(params.effective_iterations(), 1);
        assert_eq!(params.effective_salt_length(), 1);
        assert_eq!(params.effective_key_length(), 1);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let params: KdfParams =
            serde_json::from_str(r#"{"iterations": 5000}"#).expect("parse");
        assert_eq!(params.iterations, 5000);
        assert_eq!(params.salt_length, DEFAULT_SALT_LENGTH);
        assert_eq!(params.key_length, DEFAULT_KEY_LENGTH);
    }
}
