use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::{GhxError, Result};
use crate::source::RepoSource;
use crate::types::{CodeMatch, FileEntry, FileKind, RepoDetail, RepoSummary, SearchFilters};

const SEARCH_FIELDS: &str = "fullName,description,stargazersCount,forksCount,updatedAt,url,language";
const DETAIL_FIELDS: &str =
    "nameWithOwner,description,stargazerCount,forkCount,updatedAt,url,primaryLanguage";
const CODE_FIELDS: &str = "repository,path,textMatches";

/// Adapter over the `gh` CLI. Owns no tokens and no HTTP: authentication,
/// rate limiting, and the wire protocol all live inside `gh`.
#[derive(Debug)]
pub struct GhCli;

impl GhCli {
    /// Probe that `gh` is installed before handing the adapter out.
    pub async fn new() -> Result<Self> {
        let cli = Self;
        cli.run(&["--version"]).await.map_err(|_| {
            GhxError::Tool(
                "GitHub CLI (gh) is not installed or not in PATH. \
                 Install it from https://cli.github.com/"
                    .to_string(),
            )
        })?;
        Ok(cli)
    }

    async fn run<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<String> {
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect();
        tracing::debug!(args = ?rendered, "running gh");

        let output = Command::new("gh").args(args).output().await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(args = ?rendered, %stderr, "gh failed");
            Err(classify_gh_error(&stderr))
        }
    }
}

#[async_trait]
impl RepoSource for GhCli {
    async fn search_repos(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<RepoSummary>> {
        let args = build_search_args(query, filters);
        let output = self.run(&args).await?;
        parse_summaries(&output)
    }

    async fn fetch_detail(&self, full_name: &str) -> Result<RepoDetail> {
        let output = self
            .run(&["repo", "view", full_name, "--json", DETAIL_FIELDS])
            .await?;
        let mut detail = parse_detail(&output)?;

        // Ask for the raw media type so the README arrives as plain text.
        let readme_path = format!("repos/{}/readme", full_name);
        detail.readme = match self
            .run(&["api", readme_path.as_str(), "-H", "Accept: application/vnd.github.raw"])
            .await
        {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(%full_name, %err, "no README");
                None
            }
        };

        // Top-level listing only. A failure here is not fatal: the renderer
        // shows its placeholder tree for an empty listing.
        let contents_path = format!("repos/{}/contents", full_name);
        detail.files = match self.run(&["api", contents_path.as_str()]).await {
            Ok(json) => parse_file_entries(&json).unwrap_or_else(|err| {
                tracing::warn!(%full_name, %err, "unparseable contents listing");
                Vec::new()
            }),
            Err(err) => {
                tracing::warn!(%full_name, %err, "contents listing failed");
                Vec::new()
            }
        };

        Ok(detail)
    }

    async fn search_code(
        &self,
        query: &str,
        limit: u32,
        language: Option<&str>,
    ) -> Result<Vec<CodeMatch>> {
        let mut args = vec![
            "search".to_string(),
            "code".to_string(),
            query.to_string(),
            "--json".to_string(),
            CODE_FIELDS.to_string(),
            "--limit".to_string(),
            limit.to_string(),
        ];
        if let Some(lang) = language {
            args.push("--language".to_string());
            args.push(lang.to_string());
        }
        let output = self.run(&args).await?;
        parse_code_matches(&output)
    }

    async fn open_in_browser(&self, full_name: &str) -> Result<()> {
        self.run(&["repo", "view", full_name, "--web"]).await?;
        Ok(())
    }

    async fn clone_repo(&self, full_name: &str, target_dir: Option<&Path>) -> Result<String> {
        let mut args = vec!["repo".to_string(), "clone".to_string(), full_name.to_string()];
        if let Some(dir) = target_dir {
            args.push(dir.to_string_lossy().into_owned());
        }
        self.run(&args).await?;
        Ok(format!("Cloned {}", full_name))
    }

    async fn create_gist(
        &self,
        path: &Path,
        description: Option<&str>,
        public: bool,
    ) -> Result<String> {
        let mut args = vec!["gist".to_string(), "create".to_string()];
        if let Some(desc) = description {
            args.push("--desc".to_string());
            args.push(desc.to_string());
        }
        if !public {
            args.push("--secret".to_string());
        }
        args.push(path.to_string_lossy().into_owned());
        self.run(&args).await
    }
}

fn build_search_args(query: &str, filters: &SearchFilters) -> Vec<String> {
    let mut args = vec![
        "search".to_string(),
        "repos".to_string(),
        query.to_string(),
        "--json".to_string(),
        SEARCH_FIELDS.to_string(),
        "--limit".to_string(),
        filters.limit.to_string(),
    ];
    if let Some(sort) = filters.sort {
        args.push("--sort".to_string());
        args.push(sort.as_flag_str().to_string());
    }
    if let Some(lang) = &filters.language {
        args.push("--language".to_string());
        args.push(lang.clone());
    }
    if let Some(topic) = &filters.topic {
        args.push("--topic".to_string());
        args.push(topic.clone());
    }
    args
}

/// Map gh's stderr onto the error taxonomy. gh prefixes most failures with
/// the HTTP status, and auth failures tell the user to run `gh auth login`.
fn classify_gh_error(stderr: &str) -> GhxError {
    let lower = stderr.to_lowercase();
    let msg = if stderr.is_empty() {
        "gh exited with an error".to_string()
    } else {
        stderr.to_string()
    };

    if lower.contains("gh auth login") || lower.contains("http 401") || lower.contains("authentication")
    {
        GhxError::Auth(msg)
    } else if lower.contains("http 404") || lower.contains("could not resolve") {
        GhxError::NotFound(msg)
    } else if lower.contains("http 422") || lower.contains("invalid") {
        GhxError::Query(msg)
    } else {
        GhxError::Tool(msg)
    }
}

fn parse_summaries(json: &str) -> Result<Vec<RepoSummary>> {
    Ok(serde_json::from_str(json)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDetail {
    name_with_owner: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazer_count: u64,
    #[serde(default)]
    fork_count: u64,
    #[serde(default)]
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    primary_language: Option<RawLanguage>,
}

#[derive(Debug, Deserialize)]
struct RawLanguage {
    name: String,
}

fn parse_detail(json: &str) -> Result<RepoDetail> {
    let raw: RawDetail = serde_json::from_str(json)?;
    Ok(RepoDetail {
        full_name: raw.name_with_owner,
        description: raw.description,
        stars: raw.stargazer_count,
        forks: raw.fork_count,
        language: raw.primary_language.map(|l| l.name),
        url: raw.url,
        updated_at: raw.updated_at,
        readme: None,
        files: Vec::new(),
    })
}

#[derive(Debug, Deserialize)]
struct RawContentsEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

fn parse_file_entries(json: &str) -> Result<Vec<FileEntry>> {
    let raw: Vec<RawContentsEntry> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|e| FileEntry {
            name: e.name,
            // symlinks and submodules render like files
            kind: if e.kind == "dir" { FileKind::Dir } else { FileKind::File },
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RawCodeResult {
    #[serde(default)]
    repository: Option<RawCodeRepo>,
    path: String,
    #[serde(default, rename = "textMatches")]
    text_matches: Vec<RawTextMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCodeRepo {
    name_with_owner: String,
}

#[derive(Debug, Deserialize)]
struct RawTextMatch {
    #[serde(default)]
    fragment: String,
}

fn parse_code_matches(json: &str) -> Result<Vec<CodeMatch>> {
    let raw: Vec<RawCodeResult> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|r| {
            let fragment = r
                .text_matches
                .first()
                .map(|m| m.fragment.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            CodeMatch {
                repo: r
                    .repository
                    .map(|x| x.name_with_owner)
                    .unwrap_or_else(|| "unknown".to_string()),
                path: r.path,
                fragment,
            }
        })
        .collect())
}
