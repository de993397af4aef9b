//! Host-provided collaborators.
//!
//! The access-control core does not own partition persistence nor run the
//! device authentication prompt. Hosts implement these traits (in Swift or
//! Kotlin through `UniFFI`, or in Rust) and hand them to the coordinator.

use strum::{Display, EnumString};

use crate::partition::{Partition, PartitionId};

pub mod memory;

/// Source of partitions and owner of the "active partition" pointer.
///
/// The coordinator only reads partitions. It writes the active pointer solely
/// when a cancelled unlock switches to a fallback partition.
#[uniffi::export(with_foreign)]
pub trait PartitionDirectory: Send + Sync {
    /// Lists all known partitions, in any order.
    fn list_partitions(&self) -> Vec<Partition>;

    /// Returns the id of the partition currently in use, if any.
    fn active_partition_id(&self) -> Option<PartitionId>;

    /// Points the host at another partition.
    fn set_active_partition_id(&self, id: PartitionId);
}

/// Best device authentication method currently enrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, uniffi::Enum)]
pub enum DeviceAuthMethod {
    /// Face recognition.
    #[strum(serialize = "Face ID")]
    FaceId,
    /// Fingerprint.
    #[strum(serialize = "Touch ID")]
    TouchId,
    /// Iris recognition.
    #[strum(serialize = "Optic ID")]
    OpticId,
    /// Device passcode, used when no biometric is enrolled.
    #[strum(serialize = "Passcode")]
    Passcode,
}

/// Result of asking the device whether it can authenticate the user right now.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct AuthCapability {
    /// Whether a biometric-or-passcode check can run.
    pub available: bool,
    /// Human label of the best available method.
    pub method_label: String,
}

impl AuthCapability {
    /// Builds a capability report labelled after `method`.
    #[must_use]
    pub fn new(available: bool, method: DeviceAuthMethod) -> Self {
        Self {
            available,
            method_label: method.to_string(),
        }
    }

    /// Report for a device that cannot authenticate at all.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(false, DeviceAuthMethod::Passcode)
    }
}

/// Platform biometric/passcode check.
///
/// The policy is "biometrics or device passcode": a device without biometric
/// enrollment still reports `available` with the passcode label.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait AuthCapabilityProvider: Send + Sync {
    /// Reports whether a device check can run and the label of its method.
    fn can_evaluate(&self) -> AuthCapability;

    /// Runs the device check, resolving to `true` on success.
    ///
    /// Single-shot: callers must not start a second evaluation before the
    /// previous one resolves.
    async fn evaluate(&self, reason: String) -> bool;
}
