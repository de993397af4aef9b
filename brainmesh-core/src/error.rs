use thiserror::Error;

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Error outputs from credential hashing and password settings flows.
///
/// A `KeyDerivation` failure means the password could not be set or checked at
/// all. It must never be reported to the user as an incorrect password.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum CredentialError {
    /// The password-based key derivation primitive reported an error.
    #[error("key_derivation_failed: {0}")]
    KeyDerivation(String),
    /// An empty password was presented where one is required.
    #[error("empty_password")]
    EmptyPassword,
    /// The partition has no stored password record.
    #[error("password_not_configured")]
    PasswordNotConfigured,
    /// The presented password does not match the stored record.
    #[error("wrong_password")]
    WrongPassword,
}
