//! Unlock prompt value types.

use strum::Display;
use uuid::Uuid;

use crate::partition::{Partition, PartitionId};

/// Why an unlock prompt is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum UnlockPurpose {
    /// The user picked another partition.
    SwitchPartition,
    /// The partition already marked active must be unlocked before use.
    EnterActivePartition,
}

/// One pending unlock prompt.
///
/// Pure data. Continuations are held by the coordinator next to the request
/// and matched back through `id`.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct UnlockRequest {
    /// Correlation id, unique per request.
    pub id: String,
    /// Partition to unlock.
    pub partition_id: PartitionId,
    /// Display name of that partition.
    pub partition_name: String,
    /// Why the prompt is shown.
    pub purpose: UnlockPurpose,
    /// Whether the device check may resolve this request.
    pub allow_biometrics: bool,
    /// Whether a password may resolve this request.
    pub allow_password: bool,
    /// Partition to switch to if the prompt is cancelled.
    pub fallback_partition_id: Option<PartitionId>,
}

impl UnlockRequest {
    pub(crate) fn for_partition(
        partition: &Partition,
        purpose: UnlockPurpose,
        fallback_partition_id: Option<PartitionId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            partition_id: partition.id.clone(),
            partition_name: partition.name.clone(),
            purpose,
            allow_biometrics: partition.biometrics_enabled,
            allow_password: partition.password_enabled && partition.is_password_configured(),
            fallback_partition_id,
        }
    }
}

/// How a request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum UnlockOutcome {
    /// The partition is now unlocked.
    Unlocked,
    /// The user dismissed the prompt.
    Cancelled,
}

/// A resolved request together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct UnlockResolution {
    /// The request that was resolved.
    pub request: UnlockRequest,
    /// How it was resolved.
    pub outcome: UnlockOutcome,
}

/// A continuation run once when a request resolves.
pub type UnlockCallback = Box<dyn FnOnce() + Send>;

/// Optional continuations attached to a request by Rust callers.
#[derive(Default)]
pub struct UnlockCallbacks {
    pub(crate) on_success: Option<UnlockCallback>,
    pub(crate) on_cancel: Option<UnlockCallback>,
}

impl UnlockCallbacks {
    /// No continuations.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Runs `f` after the partition is unlocked.
    #[must_use]
    pub fn on_success(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Runs `f` after the prompt is cancelled.
    #[must_use]
    pub fn on_cancel(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub(crate) fn take(&mut self, outcome: UnlockOutcome) -> Option<UnlockCallback> {
        match outcome {
            UnlockOutcome::Unlocked => self.on_success.take(),
            UnlockOutcome::Cancelled => self.on_cancel.take(),
        }
    }
}

impl std::fmt::Debug for UnlockCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockCallbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}
