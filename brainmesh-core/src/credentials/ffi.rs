//! FFI entry points for password settings flows.
//!
//! These mirror the Rust hashing API but never throw: derivation failures
//! surface as `None`/`false`.

use super::hasher::{make_password_hash, PasswordHashRecord};
use super::params::KdfParams;

/// Hashes `password` with the default parameters.
///
/// Returns `None` if the password could not be hashed.
#[uniffi::export]
#[must_use]
pub fn hash_password(password: &str) -> Option<PasswordHashRecord> {
    make_password_hash(password, &KdfParams::default()).ok()
}

/// Hashes `password` with caller-supplied parameters.
///
/// Returns `None` if the password could not be hashed.
#[uniffi::export]
#[must_use]
pub fn hash_password_with_params(password: &str, params: KdfParams) -> Option<PasswordHashRecord> {
    make_password_hash(password, &params).ok()
}

/// Checks `candidate` against a stored record.
#[uniffi::export]
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn check_password(candidate: &str, record: PasswordHashRecord) -> bool {
    record.verify(candidate)
}

/// Returns the default hashing parameters.
#[uniffi::export]
#[must_use]
pub fn default_kdf_params() -> KdfParams {
    KdfParams::default()
}
