// file: src/forge/gitlab.rs
// description: GitLab REST v4 implementation of the directory service
// reference: https://docs.gitlab.com/ee/api/projects.html

use crate::error::{Result, VaultError};
use crate::forge::{AccountListing, DirectoryService, RepositoryRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct GitLabUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct GitLabProject {
    path_with_namespace: String,
    ssh_url_to_repo: String,
}

#[derive(Debug, Serialize)]
struct CreateProjectRequest<'a> {
    name: &'a str,
}

pub struct GitLabDirectory {
    client: Client,
    api_url: String,
    token: String,
}

impl GitLabDirectory {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn authenticated_user(&self) -> Result<GitLabUser> {
        let url = format!("{}/api/v4/user", self.api_url);
        debug!("Fetching authenticated user from {}", url);

        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VaultError::Directory(format!(
                "user lookup failed with status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn all_projects(&self) -> Result<Vec<GitLabProject>> {
        let mut projects = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}/api/v4/projects?membership=true&per_page={}&page={}",
                self.api_url, PER_PAGE, page
            );
            debug!("Listing projects, page {}", page);

            let response = self
                .client
                .get(&url)
                .header("PRIVATE-TOKEN", &self.token)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(VaultError::Directory(format!(
                    "project listing failed with status {}: {}",
                    status, body
                )));
            }

            let batch: Vec<GitLabProject> = response.json().await?;
            let done = (batch.len() as u32) < PER_PAGE;
            projects.extend(batch);

            if done {
                break;
            }
            page += 1;
        }

        Ok(projects)
    }
}

#[async_trait]
impl DirectoryService for GitLabDirectory {
    async fn list_accessible(&self) -> Result<AccountListing> {
        let user = self.authenticated_user().await?;
        let projects = self.all_projects().await?;

        debug!(
            "Listed {} projects for user {}",
            projects.len(),
            user.username
        );

        Ok(AccountListing {
            username: user.username,
            repositories: projects
                .into_iter()
                .map(|p| RepositoryRecord {
                    full_path: p.path_with_namespace,
                    transfer_address: p.ssh_url_to_repo,
                })
                .collect(),
        })
    }

    async fn create_repository(&self, name: &str) -> Result<String> {
        let url = format!("{}/api/v4/projects", self.api_url);
        debug!("Creating repository '{}'", name);

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&CreateProjectRequest { name })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VaultError::Directory(format!(
                "create of '{}' failed with status {}: {}",
                name, status, body
            )));
        }

        let project: GitLabProject = response.json().await?;
        Ok(project.ssh_url_to_repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_is_normalized() {
        let directory =
            GitLabDirectory::new("https://gitlab.example/".to_string(), "token".to_string());
        assert_eq!(directory.api_url, "https://gitlab.example");
    }

    #[test]
    fn test_project_payload_shape() {
        let raw = r#"{
            "path_with_namespace": "team-x/proj",
            "ssh_url_to_repo": "git@gitlab.example:team-x/proj.git",
            "id": 42
        }"#;

        let project: GitLabProject = serde_json::from_str(raw).unwrap();
        assert_eq!(project.path_with_namespace, "team-x/proj");
        assert_eq!(project.ssh_url_to_repo, "git@gitlab.example:team-x/proj.git");
    }
}
