//! JSON partition files for the CLI.

use std::path::Path;

use brainmesh_core::platform::memory::MemoryDirectory;
use brainmesh_core::{Partition, PartitionId};
use eyre::{Context as _, Result};
use serde::Deserialize;

/// On-disk shape of a partition directory.
///
/// ```json
/// { "active": "work", "partitions": [{ "id": "work", "name": "Work", "created_at": 1 }] }
/// ```
#[derive(Debug, Deserialize)]
pub struct DirectoryFile {
    /// Partition the host currently shows.
    #[serde(default)]
    pub active: Option<PartitionId>,
    /// All partitions, in any order.
    pub partitions: Vec<Partition>,
}

impl DirectoryFile {
    /// Reads and parses a directory file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).wrap_err_with(|| format!("invalid directory file {}", path.display()))
    }

    /// Builds an in-memory directory from the file contents.
    pub fn into_directory(self) -> MemoryDirectory {
        let directory = MemoryDirectory::new(self.partitions);
        match self.active {
            Some(active) => directory.with_active(active),
            None => directory,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use brainmesh_core::PartitionDirectory;

    use super::*;

    #[test]
    fn test_load_directory_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"active":"b","partitions":[{{"id":"a","name":"A","created_at":1,"biometrics_enabled":true}},{{"id":"b","name":"B","created_at":2}}]}}"#
        )
        .expect("write");

        let directory = DirectoryFile::load(file.path()).expect("load").into_directory();
        assert_eq!(directory.active_partition_id(), Some(PartitionId::new("b")));
        let partitions = directory.list_partitions();
        assert_eq!(partitions.len(), 2);
        assert!(partitions[0].is_protected());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");
        assert!(DirectoryFile::load(file.path()).is_err());
    }
}
