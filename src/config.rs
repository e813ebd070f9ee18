// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{Result, VaultError};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backup: BackupConfig,
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupConfig {
    pub root: PathBuf,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    /// Host name as given on the command line, e.g. "gitlab.com".
    pub name: String,
    pub api_url: String,
    pub token: String,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("REPOVAULT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| VaultError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| VaultError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            backup: BackupConfig {
                root: PathBuf::from("./backups"),
                concurrency: 5,
            },
            hosts: vec![],
        }
    }

    pub fn host(&self, name: &str) -> Result<&HostConfig> {
        self.hosts
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| {
                VaultError::Config(format!(
                    "no credentials configured for host '{}' (add a [[hosts]] entry)",
                    name
                ))
            })
    }

    fn validate(&self) -> Result<()> {
        if self.backup.concurrency == 0 {
            return Err(VaultError::Config(
                "backup.concurrency must be greater than 0".to_string(),
            ));
        }

        for host in &self.hosts {
            if host.token.is_empty() {
                return Err(VaultError::Config(format!(
                    "empty token for host '{}'",
                    host.name
                )));
            }
        }

        Ok(())
    }
}
