// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns

pub mod config;
pub mod error;
pub mod forge;
pub mod manifest;
pub mod pipeline;
pub mod reconcile;
pub mod transfer;
pub mod utils;

pub use config::{BackupConfig, Config, HostConfig};
pub use error::{Result, VaultError};
pub use forge::{AccountListing, DirectoryService, GitLabDirectory, RepositoryRecord};
pub use manifest::{Manifest, ManifestStore};
pub use pipeline::{
    BackupPipeline, BatchReport, BatchStats, Job, JobOutcome, JobResult, JobScheduler,
    MirrorEntry, ProgressTracker, RestorePipeline, RestorePlan, TransferPlan,
    enumerate_mirrors,
};
pub use reconcile::{NameResolution, resolve_destination, resolve_target_name};
pub use transfer::{GitTransfer, TransferPrimitive};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _config = Config::default_config();
        let _name = resolve_target_name("alice", "alice", "proj");
    }
}
