// file: src/pipeline/restore.rs
// description: restore pipeline driver, local mirrors to mirror-push jobs
// reference: enumerate, reconcile identities, then schedule transfers

use crate::error::{Result, VaultError};
use crate::forge::{DirectoryService, RepositoryRecord};
use crate::manifest::ManifestStore;
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::scheduler::{BatchReport, Job, JobScheduler};
use crate::reconcile::resolve_destination;
use crate::transfer::TransferPrimitive;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use walkdir::WalkDir;

/// One previously mirrored repository found under a host's backup root.
/// `(owning_group, repository_name)` is unique within a backup set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    pub owning_group: String,
    pub repository_name: String,
    pub local_path: PathBuf,
}

/// One intended mirror push. `existing_address` of `None` means the
/// destination repository must be created first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePlan {
    pub label: String,
    pub local_path: PathBuf,
    pub target_name: String,
    pub existing_address: Option<String>,
}

/// Walks a host's backup root for `<group>/…/<name>.git` mirror directories,
/// sorted by path for reproducible run ordering. Does not descend into the
/// mirrors themselves.
///
/// Any walk error is fatal: an unreadable subtree would silently shrink the
/// restore set, so no job list can be constructed from a partial walk.
pub fn enumerate_mirrors(host_root: &Path) -> Result<Vec<MirrorEntry>> {
    let mut entries = Vec::new();
    let mut walker = WalkDir::new(host_root).follow_links(false).into_iter();

    while let Some(item) = walker.next() {
        let entry = item.map_err(std::io::Error::from)?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = name.strip_suffix(".git") else {
            continue;
        };

        // The mirror's internal layout is git's business.
        walker.skip_current_dir();

        let owning_group = path
            .parent()
            .and_then(|p| p.strip_prefix(host_root).ok())
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        // Layout contract is <host>/<group>/…/<name>.git; a mirror directly
        // under the host root has no owner and is not part of a backup set.
        if owning_group.is_empty() {
            continue;
        }

        entries.push(MirrorEntry {
            owning_group,
            repository_name: stem.to_string(),
            local_path: path.to_path_buf(),
        });
    }

    entries.sort_by(|a, b| a.local_path.cmp(&b.local_path));
    Ok(entries)
}

/// Bare-name lookup table for the destination's existing repositories.
/// Keyed by last path segment only, so entries whose full paths differ but
/// share a bare name overwrite each other. Known lossy simplification.
fn existing_by_bare_name(repositories: &[RepositoryRecord]) -> HashMap<String, String> {
    repositories
        .iter()
        .map(|repo| {
            let bare = repo
                .full_path
                .rsplit('/')
                .next()
                .unwrap_or(&repo.full_path)
                .to_string();
            (bare, repo.transfer_address.clone())
        })
        .collect()
}

fn build_plans(
    entries: &[MirrorEntry],
    source_username: &str,
    existing: &HashMap<String, String>,
) -> Vec<RestorePlan> {
    entries
        .iter()
        .map(|entry| {
            let resolution = resolve_destination(
                &entry.owning_group,
                &entry.repository_name,
                source_username,
                existing,
            );

            RestorePlan {
                label: format!("{}/{}", entry.owning_group, entry.repository_name),
                local_path: entry.local_path.clone(),
                target_name: resolution.target_name,
                existing_address: resolution.existing_address,
            }
        })
        .collect()
}

pub struct RestorePipeline<D, T> {
    directory: Arc<D>,
    transfer: Arc<T>,
    store: ManifestStore,
    scheduler: JobScheduler,
}

impl<D, T> RestorePipeline<D, T>
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

    pub async fn run(&self, src_host: &str, dst_host: &str, dry_run: bool) -> Result<BatchReport> {
        // Precondition check comes before any directory-service contact.
        if !self.store.exists(src_host) {
            return Err(VaultError::MissingBackup {
                host: src_host.to_string(),
            });
        }
        let manifest = self.store.load(src_host)?;
        info!(
            "Restoring backup of {} (user {}) to {}",
            src_host, manifest.username, dst_host
        );

        let listing = self.directory.list_accessible().await?;
        info!(
            "Destination user {} has {} existing repositories",
            listing.username,
            listing.repositories.len()
        );
        let existing = existing_by_bare_name(&listing.repositories);

        let entries = enumerate_mirrors(&self.store.host_root(src_host))?;
        info!("Found {} local mirrors under {}", entries.len(), src_host);

        let plans = build_plans(&entries, &manifest.username, &existing);

        if dry_run {
            for plan in &plans {
                match &plan.existing_address {
                    Some(address) => info!(
                        "[dry-run] would push {} -> {} (reuse)",
                        plan.local_path.display(),
                        address
                    ),
                    None => info!(
                        "[dry-run] would create '{}' and push {}",
                        plan.target_name,
                        plan.local_path.display()
                    ),
                }
            }
            info!("Dry run: {} transfers planned, none executed", plans.len());
            return Ok(BatchReport::default());
        }

        if plans.is_empty() {
            info!("Nothing to restore for {}", src_host);
            return Ok(BatchReport::default());
        }

        let progress = ProgressTracker::new(plans.len());
        let jobs = plans
            .into_iter()
            .map(|plan| {
                let transfer = self.transfer.clone();
                let directory = self.directory.clone();
                let RestorePlan {
                    label,
                    local_path,
                    target_name,
                    existing_address,
                } = plan;

                Job::new(label, async move {
                    // Create-or-reuse was decided once at planning; the
                    // create call runs here so its failure stays contained
                    // to this job. The address is fixed for the transfer.
                    let address = match existing_address {
                        Some(address) => address,
                        None => directory.create_repository(&target_name).await?,
                    };
                    transfer.mirror_push(&local_path, &address).await
                })
            })
            .collect();

        let report = self.scheduler.run(jobs, &progress).await;
        progress.finish();

        let stats = progress.get_stats();
        info!(
            "Restore to {} finished: {} attempted, {} failed in {}s",
            dst_host,
            report.attempted(),
            report.failed(),
            stats.duration_secs
        );
        for failure in report.failures() {
            error!("Failed: {}", failure.label);
        }

        Ok(report)
    }
}
