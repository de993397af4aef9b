//! `brainmesh`: developer CLI for partition access control.
//!
//! Produces and checks password records and replays the unlock coordinator's
//! decisions against a JSON partition file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use brainmesh_core::credentials::{make_password_hash, PasswordHashRecord};
use brainmesh_core::{
    KdfParams, Partition, PartitionDirectory, PartitionId, UnlockCoordinator, UnlockPurpose,
    UnlockRequest,
};
use clap::{Args, Parser, Subcommand};
use eyre::{Context as _, Result};
use serde_json::json;
use tracing_subscriber::EnvFilter;

mod directory;

use directory::DirectoryFile;

#[derive(Parser)]
#[command(name = "brainmesh", version, about = "BrainMesh partition access control tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hash a password and print the record as JSON.
    Hash {
        /// Password to hash.
        #[arg(long, env = "BRAINMESH_PASSWORD", hide_env_values = true)]
        password: String,
        #[command(flatten)]
        kdf: KdfArgs,
    },
    /// Check a password against a JSON record file.
    Verify {
        /// Path to a record produced by `hash`.
        #[arg(long)]
        record: PathBuf,
        /// Candidate password.
        #[arg(long, env = "BRAINMESH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print the fallback partition for an excluded partition.
    Fallback {
        #[command(flatten)]
        state: DirectoryArgs,
        /// Partition to exclude.
        #[arg(long)]
        exclude: String,
    },
    /// Enforce the lock on the directory's active partition.
    Enforce {
        #[command(flatten)]
        state: DirectoryArgs,
        /// Cancel the resulting prompt and report the new active partition.
        #[arg(long)]
        cancel: bool,
    },
}

#[derive(Args)]
struct KdfArgs {
    /// PBKDF2 iteration count.
    #[arg(long, env = "BRAINMESH_KDF_ITERATIONS", default_value_t = brainmesh_core::credentials::DEFAULT_ITERATIONS)]
    iterations: u32,
    /// Salt length in bytes.
    #[arg(long, default_value_t = brainmesh_core::credentials::DEFAULT_SALT_LENGTH)]
    salt_length: u32,
    /// Derived key length in bytes.
    #[arg(long, default_value_t = brainmesh_core::credentials::DEFAULT_KEY_LENGTH)]
    key_length: u32,
}

impl From<KdfArgs> for KdfParams {
    fn from(args: KdfArgs) -> Self {
        Self {
            iterations: args.iterations,
            salt_length: args.salt_length,
            key_length: args.key_length,
        }
    }
}

#[derive(Args)]
struct DirectoryArgs {
    /// JSON partition file.
    #[arg(long)]
    directory: PathBuf,
    /// Partition ids to treat as already unlocked.
    #[arg(long = "unlocked", value_delimiter = ',')]
    unlocked: Vec<String>,
}

impl DirectoryArgs {
    fn load(&self) -> Result<(Arc<dyn PartitionDirectory>, Arc<UnlockCoordinator>)> {
        let file = DirectoryFile::load(&self.directory)?;
        let partitions = file.partitions.clone();
        let directory: Arc<dyn PartitionDirectory> = Arc::new(file.into_directory());
        let coordinator = UnlockCoordinator::new();
        for id in &self.unlocked {
            mark_unlocked(&coordinator, &partitions, &PartitionId::new(id.as_str()));
        }
        Ok((directory, coordinator))
    }
}

// Replays a successful prompt so the coordinator's unlocked set matches `--unlocked`.
fn mark_unlocked(coordinator: &UnlockCoordinator, partitions: &[Partition], id: &PartitionId) {
    let Some(partition) = partitions.iter().find(|partition| &partition.id == id) else {
        tracing::warn!(%id, "unknown partition in --unlocked, ignoring");
        return;
    };
    if coordinator.request_unlock(partition.clone(), UnlockPurpose::SwitchPartition, None) {
        coordinator.complete_current_request(true);
    }
}

fn request_json(request: &UnlockRequest) -> serde_json::Value {
    json!({
        "id": request.id,
        "partition_id": request.partition_id,
        "partition_name": request.partition_name,
        "purpose": request.purpose.to_string(),
        "allow_biometrics": request.allow_biometrics,
        "allow_password": request.allow_password,
        "fallback_partition_id": request.fallback_partition_id,
    })
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Hash { password, kdf } => {
            let params = KdfParams::from(kdf);
            let record = make_password_hash(&password, &params)
                .wrap_err("password could not be hashed")?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { record, password } => {
            let raw = std::fs::read_to_string(&record)
                .wrap_err_with(|| format!("failed to read {}", record.display()))?;
            let record: PasswordHashRecord =
                serde_json::from_str(&raw).wrap_err("invalid password record")?;
            if record.verify(&password) {
                println!("match");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("mismatch");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Fallback { state, exclude } => {
            let (directory, coordinator) = state.load()?;
            let fallback =
                coordinator.find_fallback_partition_id(PartitionId::new(exclude), directory);
            println!("{}", json!({ "fallback_partition_id": fallback }));
            Ok(ExitCode::SUCCESS)
        }
        Command::Enforce { state, cancel } => {
            let (directory, coordinator) = state.load()?;
            let Some(request) =
                coordinator.enforce_active_partition_lock_if_needed(Arc::clone(&directory))
            else {
                println!("{}", json!({ "request": null }));
                return Ok(ExitCode::SUCCESS);
            };
            let mut output = json!({ "request": request_json(&request) });
            if cancel {
                coordinator.complete_current_request(false);
                output["active_partition_id"] = json!(directory.active_partition_id());
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
