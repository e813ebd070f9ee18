// file: src/manifest.rs
// description: Per-host manifest persistence for cross-run identity state
// reference: internal on-disk layout contract

use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const MANIFEST_FILE: &str = "manifest.json";

/// The minimal state a restore run needs from the backup run that produced
/// the mirror set: the source account's own username. Deliberately free of
/// timestamps so re-running backup writes identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub username: String,
}

pub struct ManifestStore {
    backup_root: PathBuf,
}

impl ManifestStore {
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        Self {
            backup_root: backup_root.into(),
        }
    }

    /// Root directory holding one mirror tree per host.
    pub fn host_root(&self, host: &str) -> PathBuf {
        self.backup_root.join(host)
    }

    pub fn exists(&self, host: &str) -> bool {
        self.manifest_path(host).is_file()
    }

    pub fn save(&self, host: &str, manifest: &Manifest) -> Result<()> {
        let path = self.manifest_path(host);
        let parent = self.host_root(host);

        fs::create_dir_all(&parent).map_err(|source| VaultError::Manifest {
            path: parent.clone(),
            source,
        })?;

        // Write-then-rename so a concurrent reader never observes a partial
        // manifest and re-backup overwrites are atomic.
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(manifest)?;
        fs::write(&tmp, &bytes).map_err(|source| VaultError::Manifest {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| VaultError::Manifest {
            path: path.clone(),
            source,
        })?;

        debug!("Wrote manifest for {} to {}", host, path.display());
        Ok(())
    }

    pub fn load(&self, host: &str) -> Result<Manifest> {
        let path = self.manifest_path(host);

        if !path.is_file() {
            return Err(VaultError::MissingBackup {
                host: host.to_string(),
            });
        }

        let bytes = fs::read(&path).map_err(|source| VaultError::Manifest {
            path: path.clone(),
            source,
        })?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn manifest_path(&self, host: &str) -> PathBuf {
        self.host_root(host).join(MANIFEST_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path());

        let manifest = Manifest {
            username: "alice".to_string(),
        };
        store.save("gitlab.example", &manifest).unwrap();

        assert!(store.exists("gitlab.example"));
        let loaded = store.load("gitlab.example").unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_missing_manifest_is_distinguishable() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path());

        match store.load("nowhere.example") {
            Err(VaultError::MissingBackup { host }) => assert_eq!(host, "nowhere.example"),
            other => panic!("expected MissingBackup, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_repeated_save_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path());

        let manifest = Manifest {
            username: "alice".to_string(),
        };
        store.save("gitlab.example", &manifest).unwrap();
        let first = fs::read(temp.path().join("gitlab.example/manifest.json")).unwrap();

        store.save("gitlab.example", &manifest).unwrap();
        let second = fs::read(temp.path().join("gitlab.example/manifest.json")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_save_overwrites_previous_username() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path());

        store
            .save(
                "gitlab.example",
                &Manifest {
                    username: "alice".to_string(),
                },
            )
            .unwrap();
        store
            .save(
                "gitlab.example",
                &Manifest {
                    username: "bob".to_string(),
                },
            )
            .unwrap();

        assert_eq!(store.load("gitlab.example").unwrap().username, "bob");
    }
}
