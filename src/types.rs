use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lightweight repository record used for list display.
/// Field names mirror the `gh search repos --json` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "stargazersCount")]
    pub stars: u64,
    #[serde(default, rename = "forksCount")]
    pub forks: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Extended repository record, fetched on demand for the selected entry.
/// Serialized with the same camelCase keys as `RepoSummary`, so `--json`
/// output from `view` and `repos` matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoDetail {
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    /// README text, already decoded. None when the repo has no README.
    pub readme: Option<String>,
    /// Top-level entries only, in the order the adapter returned them.
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub kind: FileKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
}

/// Filters for repository search, shared by the CLI and the adapter.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub limit: u32,
    pub language: Option<String>,
    pub topic: Option<String>,
    pub sort: Option<SortField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    Stars,
    Forks,
    Updated,
}

impl SortField {
    pub fn as_flag_str(&self) -> &'static str {
        match self {
            SortField::Stars => "stars",
            SortField::Forks => "forks",
            SortField::Updated => "updated",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag_str())
    }
}

/// A single code search hit: repository, path, and the first match fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeMatch {
    pub repo: String,
    pub path: String,
    pub fragment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_serializes_with_camel_case_keys() {
        let detail = RepoDetail {
            full_name: "ratatui/ratatui".into(),
            description: None,
            stars: 1,
            forks: 0,
            language: None,
            url: None,
            updated_at: Some(Utc::now()),
            readme: None,
            files: vec![],
        };
        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(!json.contains("\"full_name\""));
    }
}
