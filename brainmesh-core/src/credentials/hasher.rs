//! Salted password hashing and verification.
//!
//! Passwords are stretched with PBKDF2-HMAC-SHA256. The stored record keeps
//! the salt, the derived key and the iteration count together; verification
//! re-derives with the stored values and compares in constant time.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::Hmac;
use rand::{
    rngs::{OsRng, SmallRng},
    RngCore, SeedableRng,
};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::params::KdfParams;
use crate::error::{CredentialError, CredentialResult};

/// Output of hashing a password, stored alongside the partition it protects.
///
/// Produced once per set/change operation and replaced wholesale on the next
/// one; the three fields are never updated independently.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct PasswordHashRecord {
    /// Random salt mixed into the derivation.
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,
    /// Derived key.
    #[serde(with = "hex::serde")]
    pub hash: Vec<u8>,
    /// Iteration count used to derive `hash`.
    pub iterations: u32,
}

impl PasswordHashRecord {
    /// Checks `candidate` against this record.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        verify_password(candidate, &self.salt, &self.hash, self.iterations)
    }
}

impl std::fmt::Debug for PasswordHashRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHashRecord")
            .field("salt", &"[REDACTED]")
            .field("hash", &"[REDACTED]")
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// Generates `length` random salt bytes (at least one).
///
/// Uses the operating system's secure random source. If that source is
/// unavailable, falls back to a time-seeded non-cryptographic generator
/// instead of failing the caller.
#[must_use]
pub fn generate_salt(length: usize) -> Vec<u8> {
    fill_salt(&mut OsRng, length)
}

fn fill_salt(rng: &mut dyn RngCore, length: usize) -> Vec<u8> {
    let mut salt = vec![0u8; length.max(1)];
    if let Err(err) = rng.try_fill_bytes(&mut salt) {
        log::warn!("secure random source unavailable ({err}); using fallback generator for salt");
        fallback_rng().fill_bytes(&mut salt);
    }
    salt
}

fn fallback_rng() -> SmallRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            elapsed
                .as_secs()
                .wrapping_mul(1_000_000_000)
                .wrapping_add(u64::from(elapsed.subsec_nanos()))
        });
    SmallRng::seed_from_u64(nanos ^ u64::from(std::process::id()))
}

/// Derives a `key_length`-byte key from `password` and `salt`.
///
/// Deterministic for identical inputs. Zero `iterations` or `key_length` are
/// clamped to one.
///
/// # Errors
///
/// Returns `CredentialError::KeyDerivation` if the PBKDF2 primitive rejects
/// its inputs. The output is never silently truncated.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
    key_length: usize,
) -> CredentialResult<Vec<u8>> {
    let mut derived = vec![0u8; key_length.max(1)];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(
        password.as_bytes(),
        salt,
        iterations.max(1),
        &mut derived,
    )
    .map_err(|err| CredentialError::KeyDerivation(err.to_string()))?;
    Ok(derived)
}

/// Hashes `password` under a fresh salt.
///
/// # Errors
///
/// Returns `CredentialError::KeyDerivation` if derivation fails; callers must
/// treat this as "password could not be set".
pub fn make_password_hash(
    password: &str,
    params: &KdfParams,
) -> CredentialResult<PasswordHashRecord> {
    let salt = generate_salt(params.effective_salt_length());
    let iterations = params.effective_iterations();
    let hash = derive_key(password, &salt, iterations, params.effective_key_length())
        .inspect_err(|err| log::warn!("password hashing failed: {err}"))?;
    Ok(PasswordHashRecord {
        salt,
        hash,
        iterations,
    })
}

/// Checks `candidate` against a stored salt, hash and iteration count.
///
/// Returns `false` on mismatch and also when derivation fails. The derived
/// value is compared with [`constant_time_eq`].
#[must_use]
pub fn verify_password(candidate: &str, salt: &[u8], hash: &[u8], iterations: u32) -> bool {
    match derive_key(candidate, salt, iterations, hash.len()) {
        Ok(derived) => constant_time_eq(&Zeroizing::new(derived), hash),
        Err(err) => {
            log::warn!("password verification could not derive key: {err}");
            false
        }
    }
}

/// Compares two byte strings without an early exit on the first difference.
///
/// A length mismatch returns `false` immediately; only lengths leak timing.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
