//! Runtime unlock state.
//!
//! The coordinator tracks which partitions are unlocked for the lifetime of
//! the process and owns at most one pending unlock request. Competing
//! requests are dropped, never queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::partition::{Partition, PartitionId};
use crate::platform::PartitionDirectory;

use super::request::{
    UnlockCallbacks, UnlockOutcome, UnlockPurpose, UnlockRequest, UnlockResolution,
};

struct ActiveUnlock {
    request: UnlockRequest,
    callbacks: UnlockCallbacks,
    // Set once the request starts resolving; it can never resolve twice.
    resolving: bool,
    device_check_in_flight: bool,
}

#[derive(Default)]
struct CoordinatorState {
    unlocked: HashSet<PartitionId>,
    active: Option<ActiveUnlock>,
}

/// Single source of truth for which partitions are usable right now.
///
/// Unlocked state lives in memory only; a new process starts with every
/// partition locked. All operations are total: misuse such as a second
/// request or a double completion is absorbed as a no-op.
///
/// # Example
///
/// ```rust
/// use brainmesh_core::{Partition, UnlockCoordinator, UnlockPurpose};
///
/// let coordinator = UnlockCoordinator::default();
/// let mut partition = Partition::new("journal", "Journal", 1);
/// partition.biometrics_enabled = true;
///
/// assert!(coordinator.request_unlock(partition.clone(), UnlockPurpose::SwitchPartition, None));
/// let resolution = coordinator.complete_current_request(true).expect("resolved");
/// assert_eq!(resolution.request.partition_id, partition.id);
/// assert!(coordinator.is_unlocked(partition.id));
/// ```
#[derive(Default, uniffi::Object)]
pub struct UnlockCoordinator {
    state: Mutex<CoordinatorState>,
}

#[uniffi::export]
impl UnlockCoordinator {
    /// Creates a coordinator with every partition locked.
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether `id` is currently unlocked.
    ///
    /// # Arguments
    ///
    /// * `id` - The partition to check.
    ///
    /// # Returns
    ///
    /// `true` if a request for `id` succeeded and it has not been locked since.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn is_unlocked(&self, id: PartitionId) -> bool {
        self.state().unlocked.contains(&id)
    }

    /// Ids of all unlocked partitions, sorted.
    ///
    /// Hosts can use this to badge partitions in a switcher without asking
    /// about each one.
    #[must_use]
    pub fn unlocked_partition_ids(&self) -> Vec<PartitionId> {
        let mut ids: Vec<_> = self.state().unlocked.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Locks `id`. Idempotent.
    ///
    /// Call this after a partition's protection changes so the new settings
    /// apply on its next use.
    ///
    /// # Arguments
    ///
    /// * `id` - The partition to lock. Unknown or already locked ids are
    ///   ignored.
    #[allow(clippy::needless_pass_by_value)]
    pub fn lock(&self, id: PartitionId) {
        if self.state().unlocked.remove(&id) {
            log::info!("partition {id} locked");
        }
    }

    /// Locks every partition. Idempotent.
    ///
    /// Hosts call this on their own triggers, e.g. when the app is
    /// backgrounded.
    pub fn lock_all(&self) {
        let mut state = self.state();
        if !state.unlocked.is_empty() {
            log::info!("locking {} unlocked partitions", state.unlocked.len());
            state.unlocked.clear();
        }
    }

    /// The pending request, if any.
    ///
    /// While a continuation runs this still reports the request being
    /// resolved.
    #[must_use]
    pub fn active_request(&self) -> Option<UnlockRequest> {
        self.state().active.as_ref().map(|active| active.request.clone())
    }

    /// Installs an unlock request for `partition` without continuations.
    ///
    /// Hosts correlate the outcome through the request id returned in the
    /// [`UnlockResolution`] of [`Self::complete_current_request`].
    ///
    /// # Arguments
    ///
    /// * `partition` - The partition to unlock, with its current protection
    ///   settings.
    /// * `purpose` - Why the prompt is shown.
    /// * `fallback_partition_id` - Where the host should go if the prompt is
    ///   cancelled.
    ///
    /// # Returns
    ///
    /// `true` if a new request was installed. `false` when the partition is
    /// unprotected, already unlocked, or any request is pending. A pending
    /// request is never replaced.
    #[allow(clippy::needless_pass_by_value)]
    pub fn request_unlock(
        &self,
        partition: Partition,
        purpose: UnlockPurpose,
        fallback_partition_id: Option<PartitionId>,
    ) -> bool {
        self.request_unlock_with_callbacks(
            &partition,
            purpose,
            fallback_partition_id,
            UnlockCallbacks::none(),
        )
    }

    /// Resolves the pending request.
    ///
    /// On success the partition joins the unlocked set before the success
    /// continuation runs. Continuations run while the request is still
    /// reported by [`Self::active_request`]; it is cleared afterwards.
    ///
    /// # Arguments
    ///
    /// * `success` - `true` if the user unlocked the partition, `false` if
    ///   the prompt was dismissed.
    ///
    /// # Returns
    ///
    /// The resolved request and its outcome. `None` when nothing is pending
    /// or the request is already being resolved.
    pub fn complete_current_request(&self, success: bool) -> Option<UnlockResolution> {
        self.resolve(None, success)
    }

    /// Makes sure the directory's active partition is usable.
    ///
    /// If it is protected and locked, installs an `EnterActivePartition`
    /// request whose cancellation switches the directory to the fallback
    /// partition, or does nothing when there is none. Call this at launch and
    /// whenever the host returns to the foreground after [`Self::lock_all`].
    ///
    /// # Arguments
    ///
    /// * `directory` - The host's partition list and active pointer.
    ///
    /// # Returns
    ///
    /// The installed request, or `None` when the active partition is missing,
    /// unprotected, already unlocked, or another request is pending.
    pub fn enforce_active_partition_lock_if_needed(
        &self,
        directory: Arc<dyn PartitionDirectory>,
    ) -> Option<UnlockRequest> {
        let active_id = directory.active_partition_id()?;
        if self.state().unlocked.contains(&active_id) {
            return None;
        }
        let partition = directory
            .list_partitions()
            .into_iter()
            .find(|partition| partition.id == active_id)?;
        if !partition.is_protected() {
            return None;
        }

        let fallback = self.fallback_partition_id(&active_id, directory.as_ref());
        let callbacks = match fallback.clone() {
            Some(fallback_id) => {
                let directory = Arc::clone(&directory);
                UnlockCallbacks::none().on_cancel(move || {
                    log::info!("unlock cancelled, switching to partition {fallback_id}");
                    directory.set_active_partition_id(fallback_id);
                })
            }
            None => UnlockCallbacks::none(),
        };

        if self.request_unlock_with_callbacks(
            &partition,
            UnlockPurpose::EnterActivePartition,
            fallback,
            callbacks,
        ) {
            self.active_request()
        } else {
            None
        }
    }

    /// Earliest-created partition other than `excluding` that can be used
    /// without a prompt.
    ///
    /// # Arguments
    ///
    /// * `excluding` - The partition being left, usually the one behind the
    ///   prompt.
    /// * `directory` - The host's partition list.
    ///
    /// # Returns
    ///
    /// The oldest partition that is unprotected or already unlocked, or
    /// `None` if every other partition is locked.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn find_fallback_partition_id(
        &self,
        excluding: PartitionId,
        directory: Arc<dyn PartitionDirectory>,
    ) -> Option<PartitionId> {
        self.fallback_partition_id(&excluding, directory.as_ref())
    }
}

impl UnlockCoordinator {
    /// Installs an unlock request for `partition`.
    ///
    /// No-op (returns `false`) when the partition is unprotected, already
    /// unlocked, or when any request is pending. A pending request is never
    /// replaced, even by one for the same partition.
    pub fn request_unlock_with_callbacks(
        &self,
        partition: &Partition,
        purpose: UnlockPurpose,
        fallback_partition_id: Option<PartitionId>,
        callbacks: UnlockCallbacks,
    ) -> bool {
        if !partition.is_protected() {
            return false;
        }
        let mut state = self.state();
        if state.unlocked.contains(&partition.id) {
            return false;
        }
        if let Some(active) = &state.active {
            if active.request.partition_id != partition.id {
                log::debug!(
                    "dropping unlock request for partition {}: partition {} is pending",
                    partition.id,
                    active.request.partition_id
                );
            }
            return false;
        }

        let request = UnlockRequest::for_partition(partition, purpose, fallback_partition_id);
        log::info!(
            "unlock requested for partition {} ({purpose}), request {}",
            request.partition_id,
            request.id
        );
        state.active = Some(ActiveUnlock {
            request,
            callbacks,
            resolving: false,
            device_check_in_flight: false,
        });
        true
    }

    /// Fallback search over a borrowed directory.
    ///
    /// Partitions are ordered by `created_at` (ties keep directory order) and
    /// de-duplicated by id, first occurrence winning.
    #[must_use]
    pub fn fallback_partition_id(
        &self,
        excluding: &PartitionId,
        directory: &dyn PartitionDirectory,
    ) -> Option<PartitionId> {
        let mut partitions = directory.list_partitions();
        partitions.sort_by_key(|partition| partition.created_at);

        let mut seen = HashSet::new();
        let state = self.state();
        let fallback = partitions
            .into_iter()
            .filter(|partition| seen.insert(partition.id.clone()))
            .filter(|partition| &partition.id != excluding)
            .find(|partition| !partition.is_protected() || state.unlocked.contains(&partition.id))
            .map(|partition| partition.id);
        drop(state);

        match &fallback {
            Some(id) => log::debug!("fallback for partition {excluding}: {id}"),
            None => log::debug!("no fallback for partition {excluding}"),
        }
        fallback
    }

    /// Resolves the pending request, optionally only if its id matches.
    pub(crate) fn resolve(
        &self,
        expected_id: Option<&str>,
        success: bool,
    ) -> Option<UnlockResolution> {
        let outcome = if success {
            UnlockOutcome::Unlocked
        } else {
            UnlockOutcome::Cancelled
        };

        let (request, callback) = {
            let mut guard = self.state();
            let state = &mut *guard;
            let active = state.active.as_mut()?;
            if active.resolving || expected_id.is_some_and(|id| id != active.request.id) {
                return None;
            }
            active.resolving = true;
            if success {
                state.unlocked.insert(active.request.partition_id.clone());
            }
            (active.request.clone(), active.callbacks.take(outcome))
        };

        log::info!(
            "unlock request {} for partition {} resolved: {outcome}",
            request.id,
            request.partition_id
        );
        if let Some(callback) = callback {
            callback();
        }

        let mut state = self.state();
        if state
            .active
            .as_ref()
            .is_some_and(|active| active.request.id == request.id)
        {
            state.active = None;
        }
        drop(state);

        Some(UnlockResolution { request, outcome })
    }

    /// Id of the pending request if a password may resolve it for `partition_id`.
    pub(crate) fn password_attempt(&self, partition_id: &PartitionId) -> Option<String> {
        let state = self.state();
        let active = state.active.as_ref()?;
        (!active.resolving
            && active.request.allow_password
            && active.request.partition_id == *partition_id)
            .then(|| active.request.id.clone())
    }

    /// Marks a device check as started for the pending request.
    ///
    /// Returns `None` if the request does not allow biometrics or a check is
    /// already running. The check ends when the returned guard is dropped,
    /// including when the awaiting future is cancelled.
    pub(crate) fn begin_device_check(&self) -> Option<DeviceCheck<'_>> {
        let mut state = self.state();
        let active = state.active.as_mut()?;
        if active.resolving || !active.request.allow_biometrics || active.device_check_in_flight {
            return None;
        }
        active.device_check_in_flight = true;
        let request_id = active.request.id.clone();
        drop(state);
        Some(DeviceCheck {
            coordinator: self,
            request_id,
        })
    }

    fn end_device_check(&self, request_id: &str) {
        if let Some(active) = self.state().active.as_mut() {
            if active.request.id == request_id {
                active.device_check_in_flight = false;
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running device check for one request.
pub(crate) struct DeviceCheck<'a> {
    coordinator: &'a UnlockCoordinator,
    request_id: String,
}

impl DeviceCheck<'_> {
    /// Id of the request being checked.
    pub(crate) fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl Drop for DeviceCheck<'_> {
    fn drop(&mut self) {
        self.coordinator.end_device_check(&self.request_id);
    }
}
