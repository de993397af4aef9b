#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Partition-level access control for BrainMesh.
//!
//! A BrainMesh user keeps several graphs ("partitions") and may protect each
//! one with a password, the platform biometric/passcode check, or both. This
//! crate holds the pieces that decide whether a partition may be used:
//!
//! - [`credentials`]: salted PBKDF2-HMAC-SHA256 password records.
//! - [`UnlockCoordinator`]: which partitions are unlocked, the single pending
//!   unlock prompt, and the fallback partition used when the active one stays
//!   locked.
//! - [`platform`]: traits the host app implements to supply partitions and run
//!   the device check.

pub mod credentials;
pub use credentials::{KdfParams, PasswordHashRecord};

mod error;
pub use error::*;

pub mod logger;

mod partition;
pub use partition::*;

pub mod platform;
pub use platform::{AuthCapability, AuthCapabilityProvider, DeviceAuthMethod, PartitionDirectory};

mod unlock;
pub use unlock::*;

uniffi::setup_scaffolding!("brainmesh_core");
