// file: src/transfer.rs
// description: Full mirror clone/push between repository locations
// reference: git clone --mirror / git push --mirror

use crate::error::{Result, VaultError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// A full, history-preserving copy operation between two repository
/// locations, including all refs. Implementations report failures as
/// diagnostic text rather than panicking; each call owns its own subprocess.
#[async_trait]
pub trait TransferPrimitive: Send + Sync {
    async fn mirror_clone(&self, source_address: &str, destination: &Path) -> Result<()>;

    async fn mirror_push(&self, source: &Path, destination_address: &str) -> Result<()>;
}

/// Transfer primitive backed by the system `git` binary.
pub struct GitTransfer;

impl GitTransfer {
    pub fn new() -> Self {
        Self
    }

    async fn run_git(args: &[&str], workdir: Option<&Path>, target: &str) -> Result<()> {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = workdir {
            command.current_dir(dir);
        }

        debug!("Running git {}", args.join(" "));
        let output = command.output().await?;

        if output.status.success() {
            Ok(())
        } else {
            let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(VaultError::Transfer {
                target: target.to_string(),
                diagnostic,
            })
        }
    }
}

impl Default for GitTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferPrimitive for GitTransfer {
    async fn mirror_clone(&self, source_address: &str, destination: &Path) -> Result<()> {
        // Every backup is a fresh full mirror: an existing destination is
        // replaced, never appended to.
        if destination.exists() {
            debug!("Removing stale mirror at {}", destination.display());
            tokio::fs::remove_dir_all(destination).await?;
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let dest: PathBuf = destination.to_path_buf();
        let dest_str = dest.display().to_string();

        info!("Mirror clone {} -> {}", source_address, dest_str);
        Self::run_git(
            &["clone", "--mirror", source_address, &dest_str],
            None,
            source_address,
        )
        .await
    }

    async fn mirror_push(&self, source: &Path, destination_address: &str) -> Result<()> {
        info!(
            "Mirror push {} -> {}",
            source.display(),
            destination_address
        );
        Self::run_git(
            &["push", "--mirror", destination_address],
            Some(source),
            destination_address,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_failed_subprocess_reports_diagnostic() {
        let temp = TempDir::new().unwrap();
        // Not a repository, so the push must fail with git's own stderr text.
        let result = GitTransfer::new()
            .mirror_push(temp.path(), "file:///nonexistent/target.git")
            .await;

        match result {
            Err(VaultError::Transfer { target, diagnostic }) => {
                assert_eq!(target, "file:///nonexistent/target.git");
                assert!(!diagnostic.is_empty());
            }
            other => panic!("expected Transfer error, got {:?}", other.map(|_| ())),
        }
    }
}
