//! Resolving the pending request with a password or a device check.
//!
//! A failed attempt leaves the request pending so the prompt can retry; only
//! a success resolves it here. Cancellation stays with the caller through
//! [`UnlockCoordinator::complete_current_request`].

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::partition::Partition;
use crate::platform::AuthCapabilityProvider;

use super::coordinator::UnlockCoordinator;

#[uniffi::export(async_runtime = "tokio")]
impl UnlockCoordinator {
    /// Tries `candidate` against `partition`'s stored password.
    ///
    /// Hashing runs on the Tokio blocking pool when a runtime is available and
    /// inline otherwise.
    ///
    /// # Arguments
    ///
    /// * `partition` - The partition named by the pending request, with its
    ///   stored password record.
    /// * `candidate` - The password the user typed. Zeroized after use.
    ///
    /// # Returns
    ///
    /// `true` once the pending request is resolved as unlocked. `false` when
    /// there is no matching request that allows passwords, no record is
    /// stored, or the password is wrong. A wrong password leaves the request
    /// pending.
    #[allow(clippy::future_not_send)]
    pub async fn submit_password(&self, partition: Partition, candidate: String) -> bool {
        let candidate = Zeroizing::new(candidate);
        let Some(request_id) = self.password_attempt(&partition.id) else {
            log::debug!("password submitted for partition {} without a matching request", partition.id);
            return false;
        };
        let Some(record) = partition
            .password
            .filter(|_| partition.password_enabled)
        else {
            log::warn!("password submitted for partition {} with no stored record", partition.id);
            return false;
        };

        let verified = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle
                .spawn_blocking(move || record.verify(&candidate))
                .await
                .unwrap_or_else(|err| {
                    log::warn!("password verification task failed: {err}");
                    false
                }),
            Err(_) => record.verify(&candidate),
        };
        if !verified {
            log::info!("password rejected for partition {}", partition.id);
            return false;
        }
        self.resolve(Some(&request_id), true).is_some()
    }

    /// Runs the platform device check for the pending request.
    ///
    /// At most one check runs per request at a time. A check that is dropped
    /// before `evaluate` returns, e.g. because the host cancelled the call,
    /// frees the request for a retry.
    ///
    /// # Arguments
    ///
    /// * `provider` - The host's biometric or passcode check.
    /// * `reason` - Text shown in the system prompt.
    ///
    /// # Returns
    ///
    /// `true` once the pending request is resolved as unlocked. `false`
    /// without prompting when there is no request allowing biometrics, a check
    /// is already running, or the device cannot evaluate. `false` after a
    /// rejected check, which leaves the request pending.
    #[allow(clippy::future_not_send)]
    pub async fn authenticate_with_device(
        &self,
        provider: Arc<dyn AuthCapabilityProvider>,
        reason: String,
    ) -> bool {
        let Some(check) = self.begin_device_check() else {
            return false;
        };
        let request_id = check.request_id().to_owned();
        let capability = provider.can_evaluate();
        if !capability.available {
            log::info!("device check unavailable ({})", capability.method_label);
            return false;
        }

        log::debug!("running device check via {}", capability.method_label);
        let success = provider.evaluate(reason).await;
        drop(check);
        if !success {
            log::info!("device check rejected for request {request_id}");
            return false;
        }
        self.resolve(Some(&request_id), true).is_some()
    }
}
