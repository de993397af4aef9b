//! Unlock coordination: unlocked set, pending request, fallback selection.

mod coordinator;
mod request;
mod resolve;

pub use coordinator::UnlockCoordinator;
pub use request::{
    UnlockCallback, UnlockCallbacks, UnlockOutcome, UnlockPurpose, UnlockRequest,
    UnlockResolution,
};
