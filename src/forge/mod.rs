// file: src/forge/mod.rs
// description: hosting directory service abstraction and module exports
// reference: internal module structure

pub mod gitlab;

pub use gitlab::GitLabDirectory;

use crate::error::Result;
use async_trait::async_trait;

/// One repository as reported by a hosting account listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// Slash-separated `group/…/name`, unique within the account.
    pub full_path: String,
    /// Opaque locator consumable by the transfer primitive.
    pub transfer_address: String,
}

/// Result of listing everything an authenticated identity can reach.
#[derive(Debug, Clone)]
pub struct AccountListing {
    pub username: String,
    pub repositories: Vec<RepositoryRecord>,
}

/// Abstract directory of repositories on a hosting account.
///
/// Implementations own authentication and transport; callers only see the
/// authenticated identity, the reachable repository set, and a way to create
/// new repositories under that identity.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Authenticated username plus every repository the identity can access.
    async fn list_accessible(&self) -> Result<AccountListing>;

    /// Creates a repository with the given name under the authenticated
    /// identity and returns its transfer address.
    async fn create_repository(&self, name: &str) -> Result<String>;
}
