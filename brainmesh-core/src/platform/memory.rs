//! In-memory implementations of the platform traits.
//!
//! Used by tests and the developer CLI. Nothing here is persisted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::partition::{Partition, PartitionId};

use super::{AuthCapability, AuthCapabilityProvider, PartitionDirectory};

/// Partition directory backed by a vector.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    partitions: Mutex<Vec<Partition>>,
    active: Mutex<Option<PartitionId>>,
}

impl MemoryDirectory {
    /// Creates a directory holding `partitions` with no active partition.
    #[must_use]
    pub fn new(partitions: Vec<Partition>) -> Self {
        Self {
            partitions: Mutex::new(partitions),
            active: Mutex::new(None),
        }
    }

    /// Sets the active pointer while building the directory.
    #[must_use]
    pub fn with_active(self, id: impl Into<PartitionId>) -> Self {
        *lock(&self.active) = Some(id.into());
        self
    }

    /// Inserts or replaces a partition by id.
    pub fn upsert(&self, partition: Partition) {
        let mut partitions = lock(&self.partitions);
        match partitions.iter_mut().find(|p| p.id == partition.id) {
            Some(existing) => *existing = partition,
            None => partitions.push(partition),
        }
    }
}

impl PartitionDirectory for MemoryDirectory {
    fn list_partitions(&self) -> Vec<Partition> {
        lock(&self.partitions).clone()
    }

    fn active_partition_id(&self) -> Option<PartitionId> {
        lock(&self.active).clone()
    }

    fn set_active_partition_id(&self, id: PartitionId) {
        *lock(&self.active) = Some(id);
    }
}

/// Device check that always reports the same capability and result.
#[derive(Debug)]
pub struct StaticAuthProvider {
    capability: AuthCapability,
    result: bool,
    evaluations: AtomicUsize,
}

impl StaticAuthProvider {
    /// Creates a provider reporting `capability` and resolving to `result`.
    #[must_use]
    pub const fn new(capability: AuthCapability, result: bool) -> Self {
        Self {
            capability,
            result,
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Number of completed `evaluate` calls.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthCapabilityProvider for StaticAuthProvider {
    fn can_evaluate(&self) -> AuthCapability {
        self.capability.clone()
    }

    async fn evaluate(&self, reason: String) -> bool {
        log::debug!("static device check evaluated: {reason}");
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.result
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
