use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CodeMatch, RepoDetail, RepoSummary, SearchFilters};

/// The data source the browser and CLI consume. Everything that touches
/// GitHub goes through here; the default implementation shells out to `gh`.
#[async_trait]
pub trait RepoSource: Send + Sync + std::fmt::Debug {
    async fn search_repos(&self, query: &str, filters: &SearchFilters)
        -> Result<Vec<RepoSummary>>;

    async fn fetch_detail(&self, full_name: &str) -> Result<RepoDetail>;

    async fn search_code(
        &self,
        query: &str,
        limit: u32,
        language: Option<&str>,
    ) -> Result<Vec<CodeMatch>>;

    async fn open_in_browser(&self, full_name: &str) -> Result<()>;

    /// Clone into `target_dir` (or the tool's default). Returns a short
    /// human-readable outcome line.
    async fn clone_repo(&self, full_name: &str, target_dir: Option<&Path>) -> Result<String>;

    /// Create a gist from a file and return its URL.
    async fn create_gist(
        &self,
        path: &Path,
        description: Option<&str>,
        public: bool,
    ) -> Result<String>;
}
