//! Partition records and their protection configuration.
//!
//! A partition is a named, independently protectable data collection. The
//! access-control core only reads partitions; the settings helpers below
//! return updated records for the host to persist.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credentials::{make_password_hash, KdfParams, PasswordHashRecord};
use crate::error::{CredentialError, CredentialResult};

/// Stable unique identifier of a partition.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(String);

uniffi::custom_newtype!(PartitionId, String);

impl PartitionId {
    /// Creates a partition id from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartitionId({})", self.0)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartitionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PartitionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A partition as supplied by the host's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct Partition {
    /// Stable unique identifier.
    pub id: PartitionId,
    /// Display name.
    pub name: String,
    /// Creation time in milliseconds since the Unix epoch. Used for ordering.
    pub created_at: u64,
    /// Whether the platform biometric/passcode check may unlock this partition.
    #[serde(default)]
    pub biometrics_enabled: bool,
    /// Whether password unlock is switched on.
    #[serde(default)]
    pub password_enabled: bool,
    /// Stored password record. Salt, hash and iterations travel together.
    #[serde(default)]
    pub password: Option<PasswordHashRecord>,
}

impl Partition {
    /// Creates an unprotected partition.
    #[must_use]
    pub fn new(id: impl Into<PartitionId>, name: impl Into<String>, created_at: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
            biometrics_enabled: false,
            password_enabled: false,
            password: None,
        }
    }

    /// True if unlocking requires biometrics or a configured password.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.biometrics_enabled || (self.password_enabled && self.password.is_some())
    }

    /// True if password unlock is enabled and a record is stored.
    #[must_use]
    pub const fn is_password_configured(&self) -> bool {
        self.password_enabled && self.password.is_some()
    }

    /// Enables or disables biometric unlock.
    pub fn set_biometrics_enabled(&mut self, enabled: bool) {
        self.biometrics_enabled = enabled;
    }

    /// Sets a new password, replacing any existing record wholesale.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPassword` for an empty password and `KeyDerivation` if
    /// hashing fails. The partition is unchanged on error.
    pub fn set_password(&mut self, new_password: &str, params: &KdfParams) -> CredentialResult<()> {
        if new_password.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        let record = make_password_hash(new_password, params)?;
        self.password = Some(record);
        self.password_enabled = true;
        log::info!("password set for partition {}", self.id);
        Ok(())
    }

    /// Replaces the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `PasswordNotConfigured` if no record exists, `WrongPassword` if
    /// `current` does not verify, plus the errors of [`Self::set_password`].
    pub fn change_password(
        &mut self,
        current: &str,
        new_password: &str,
        params: &KdfParams,
    ) -> CredentialResult<()> {
        self.check_current(current)?;
        self.set_password(new_password, params)
    }

    /// Clears the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `PasswordNotConfigured` if no record exists and `WrongPassword`
    /// if `current` does not verify.
    pub fn remove_password(&mut self, current: &str) -> CredentialResult<()> {
        self.check_current(current)?;
        self.password = None;
        self.password_enabled = false;
        log::info!("password removed for partition {}", self.id);
        Ok(())
    }

    fn check_current(&self, current: &str) -> CredentialResult<()> {
        let record = self
            .password
            .as_ref()
            .ok_or(CredentialError::PasswordNotConfigured)?;
        if record.verify(current) {
            Ok(())
        } else {
            Err(CredentialError::WrongPassword)
        }
    }
}

/// Returns whether `partition` requires an unlock before use.
#[uniffi::export]
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn partition_is_protected(partition: Partition) -> bool {
    partition.is_protected()
}

/// Returns `partition` with a new password set, or `None` if it could not be set.
#[uniffi::export]
#[must_use]
pub fn partition_with_password(
    partition: Partition,
    new_password: &str,
    params: KdfParams,
) -> Option<Partition> {
    let mut updated = partition;
    updated.set_password(new_password, &params).ok()?;
    Some(updated)
}
