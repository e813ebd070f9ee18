// file: src/pipeline/backup.rs
// description: backup pipeline driver, listing to mirror-clone jobs
// reference: plan-then-execute so dry runs share the real plan builder

use crate::error::Result;
use crate::forge::{DirectoryService, RepositoryRecord};
use crate::manifest::{Manifest, ManifestStore};
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::scheduler::{BatchReport, Job, JobScheduler};
use crate::transfer::TransferPrimitive;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// One intended mirror transfer, as shown by dry runs. Real runs convert
/// plans into jobs one-to-one, so a dry run and a real run always agree on
/// count, names, and addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub label: String,
    pub source: String,
    pub destination: PathBuf,
}

pub struct BackupPipeline<D, T> {
    directory: Arc<D>,
    transfer: Arc<T>,
    store: ManifestStore,
    scheduler: JobScheduler,
}

impl<D, T> BackupPipeline<D, T>
where
    D: DirectoryService + 'static,
    T: TransferPrimitive + 'static,
{
    pub fn new(
        directory: Arc<D>,
        transfer: Arc<T>,
        backup_root: impl Into<PathBuf>,
        concurrency: usize,
    ) -> Result<Self> {
        Ok(Self {
            directory,
            transfer,
            store: ManifestStore::new(backup_root),
            scheduler: JobScheduler::new(concurrency)?,
        })
    }

    pub async fn run(&self, host: &str, dry_run: bool) -> Result<BatchReport> {
        info!("Listing repositories on {}", host);
        let listing = self.directory.list_accessible().await?;
        info!(
            "Found {} repositories for user {}",
            listing.repositories.len(),
            listing.username
        );

        let plans = self.plan_transfers(host, &listing.repositories);

        if dry_run {
            for plan in &plans {
                info!(
                    "[dry-run] would mirror {} -> {}",
                    plan.source,
                    plan.destination.display()
                );
            }
            info!("Dry run: {} transfers planned, none executed", plans.len());
            return Ok(BatchReport::default());
        }

        self.store.save(
            host,
            &Manifest {
                username: listing.username.clone(),
            },
        )?;

        if plans.is_empty() {
            info!("Nothing to back up for {}", host);
            return Ok(BatchReport::default());
        }

        let progress = ProgressTracker::new(plans.len());
        let jobs = plans
            .into_iter()
            .map(|plan| {
                let transfer = self.transfer.clone();
                let TransferPlan {
                    label,
                    source,
                    destination,
                } = plan;
                Job::new(label, async move {
                    transfer.mirror_clone(&source, &destination).await
                })
            })
            .collect();

        let report = self.scheduler.run(jobs, &progress).await;
        progress.finish();

        let stats = progress.get_stats();
        info!(
            "Backup of {} finished: {} attempted, {} failed in {}s",
            host,
            report.attempted(),
            report.failed(),
            stats.duration_secs
        );
        for failure in report.failures() {
            error!("Failed: {}", failure.label);
        }

        Ok(report)
    }

    /// Destination layout is a cross-run contract: restore reads it back as
    /// `<backup_root>/<host>/<group>/…/<name>.git`.
    pub fn plan_transfers(&self, host: &str, repositories: &[RepositoryRecord]) -> Vec<TransferPlan> {
        let host_root = self.store.host_root(host);

        repositories
            .iter()
            .map(|repo| TransferPlan {
                label: repo.full_path.clone(),
                source: repo.transfer_address.clone(),
                destination: host_root.join(format!("{}.git", repo.full_path)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestStore;
    use crate::pipeline::fakes::{FakeDirectory, RecordingTransfer};
    use std::fs;
    use tempfile::TempDir;

    const HOST: &str = "src.example";

    fn pipeline(
        directory: FakeDirectory,
        transfer: RecordingTransfer,
        root: &TempDir,
    ) -> BackupPipeline<FakeDirectory, RecordingTransfer> {
        BackupPipeline::new(Arc::new(directory), Arc::new(transfer), root.path(), 5).unwrap()
    }

    fn three_repo_directory() -> FakeDirectory {
        FakeDirectory::new(
            "alice",
            vec![
                ("alice/proj", "git@src.example:alice/proj.git"),
                ("team-x/tool", "git@src.example:team-x/tool.git"),
                ("team-x/infra/deep", "git@src.example:team-x/infra/deep.git"),
            ],
        )
    }

    #[tokio::test]
    async fn test_backup_schedules_one_job_per_repository() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(three_repo_directory(), RecordingTransfer::new(), &temp);

        let report = pipeline.run(HOST, false).await.unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failed(), 0);

        let clones = pipeline.transfer.clones.lock().unwrap();
        assert_eq!(clones.len(), 3);
        assert!(clones.iter().any(|(_, dest)| {
            *dest == temp.path().join(HOST).join("team-x/infra/deep.git")
        }));

        let manifest = ManifestStore::new(temp.path()).load(HOST).unwrap();
        assert_eq!(manifest.username, "alice");
    }

    #[tokio::test]
    async fn test_dry_run_plans_without_side_effects() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(three_repo_directory(), RecordingTransfer::new(), &temp);

        let report = pipeline.run(HOST, true).await.unwrap();

        assert_eq!(report.attempted(), 0);
        assert_eq!(pipeline.transfer.clone_count(), 0);
        assert!(!ManifestStore::new(temp.path()).exists(HOST));
    }

    #[tokio::test]
    async fn test_dry_run_plan_matches_real_run() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(three_repo_directory(), RecordingTransfer::new(), &temp);

        let listing = pipeline.directory.list_accessible().await.unwrap();
        let plans = pipeline.plan_transfers(HOST, &listing.repositories);

        let report = pipeline.run(HOST, false).await.unwrap();

        assert_eq!(plans.len(), report.attempted());
        let mut planned: Vec<_> = plans.iter().map(|p| p.label.clone()).collect();
        let mut executed: Vec<_> = report.results.iter().map(|r| r.label.clone()).collect();
        planned.sort();
        executed.sort();
        assert_eq!(planned, executed);
    }

    #[tokio::test]
    async fn test_single_failure_does_not_abort_the_batch() {
        let temp = TempDir::new().unwrap();
        let transfer = RecordingTransfer::failing_for(vec!["git@src.example:team-x/tool.git"]);
        let pipeline = pipeline(three_repo_directory(), transfer, &temp);

        let report = pipeline.run(HOST, false).await.unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures().next().unwrap().label, "team-x/tool");
        // All three transfers were still attempted.
        assert_eq!(pipeline.transfer.clone_count(), 3);
    }

    #[tokio::test]
    async fn test_rerunning_backup_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(three_repo_directory(), RecordingTransfer::new(), &temp);

        pipeline.run(HOST, false).await.unwrap();
        let manifest_path = temp.path().join(HOST).join("manifest.json");
        let first = fs::read(&manifest_path).unwrap();
        let mut first_dests: Vec<_> = pipeline
            .transfer
            .clones
            .lock()
            .unwrap()
            .iter()
            .map(|(_, d)| d.clone())
            .collect();

        pipeline.run(HOST, false).await.unwrap();
        let second = fs::read(&manifest_path).unwrap();
        let mut second_dests: Vec<_> = pipeline
            .transfer
            .clones
            .lock()
            .unwrap()
            .iter()
            .skip(first_dests.len())
            .map(|(_, d)| d.clone())
            .collect();

        // Completion order is unspecified, only the path set is contractual.
        first_dests.sort();
        second_dests.sort();
        assert_eq!(first, second);
        assert_eq!(first_dests, second_dests);
    }
}
