//! GitHub REST implementation of [`RepositoryHost`].
//!
//! Anonymous, one request per call, no retry. Non-success statuses become
//! [`HostError::Status`]; callers decide which failures are tolerable.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::GitHubConfig;
use crate::contract::{
    CommitSummary, ContentPayload, ContributorSummary, EncodedContent, EntryKind, FileTreeEntry,
    HostError, RepositoryHost, RepositoryMetadata,
};
use crate::reference::RepositoryReference;

pub struct GitHubClient {
    client: Client,
    api_base: Url,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, HostError> {
        let api_base = Url::parse(&config.api_base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| HostError::Body {
                url: config.api_base.clone(),
                reason: "API base is not an absolute http(s) URL".to_string(),
            })?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| HostError::Transport {
                url: config.api_base.clone(),
                source,
            })?;
        info!(api_base = %api_base, "Initialized GitHub client");
        Ok(Self { client, api_base })
    }

    /// `{api_base}/repos/{owner}/{name}/{tail...}` with every segment percent-encoded.
    fn repo_url<'a>(&self, repo: &RepositoryReference, tail: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
                .extend(tail);
        }
        url
    }

    /// GET `url`, returning `None` for 204 No Content.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, HostError> {
        debug!(url = %url, "GitHub request");
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|source| HostError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| HostError::Body {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl RawContent {
    fn into_encoded(self) -> Option<EncodedContent> {
        match (self.content, self.encoding.as_deref()) {
            (Some(content), Some("base64") | None) if !content.is_empty() => {
                Some(EncodedContent { content })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTree {
    #[serde(default)]
    tree: Vec<RawTreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct RawTreeItem {
    path: String,
    #[serde(rename = "type")]
    item_type: String,
    sha: String,
    #[serde(default)]
    size: Option<u64>,
}

impl RawTreeItem {
    fn into_entry(self) -> Option<FileTreeEntry> {
        let kind = match self.item_type.as_str() {
            "blob" => EntryKind::File,
            "tree" => EntryKind::Directory,
            // "commit" entries are submodule links
            _ => return None,
        };
        Some(FileTreeEntry {
            path: self.path,
            kind,
            content_hash: self.sha,
            size_bytes: self.size,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    sha: String,
    commit: RawCommitDetail,
}

#[derive(Debug, Deserialize)]
struct RawCommitDetail {
    author: Option<RawCommitAuthor>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawCommitAuthor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    date: String,
}

impl From<RawCommit> for CommitSummary {
    fn from(raw: RawCommit) -> Self {
        let (author, date) = raw
            .commit
            .author
            .map(|a| (a.name, a.date))
            .unwrap_or_default();
        CommitSummary {
            sha: raw.sha,
            author,
            date,
            message: raw.commit.message,
        }
    }
}

fn tree_entries(raw: RawTree) -> Vec<FileTreeEntry> {
    raw.tree.into_iter().filter_map(RawTreeItem::into_entry).collect()
}

fn content_payload(body: Value, url: &str) -> Result<ContentPayload, HostError> {
    if body.is_array() {
        return Ok(ContentPayload::Directory);
    }
    let raw: RawContent = serde_json::from_value(body).map_err(|e| HostError::Body {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(ContentPayload::File(raw.into_encoded()))
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn metadata(&self, repo: &RepositoryReference) -> Result<RepositoryMetadata, HostError> {
        let url = self.repo_url(repo, std::iter::empty());
        self.get_json(&url).await?.ok_or_else(|| HostError::Body {
            url: url.to_string(),
            reason: "empty metadata response".to_string(),
        })
    }

    async fn readme(&self, repo: &RepositoryReference) -> Result<EncodedContent, HostError> {
        let url = self.repo_url(repo, ["readme"]);
        let raw: Option<RawContent> = self.get_json(&url).await?;
        raw.and_then(RawContent::into_encoded)
            .ok_or_else(|| HostError::Body {
                url: url.to_string(),
                reason: "README has no inline content".to_string(),
            })
    }

    async fn tree(
        &self,
        repo: &RepositoryReference,
        branch: &str,
    ) -> Result<Vec<FileTreeEntry>, HostError> {
        // The branch is one segment even when it contains `/`.
        let mut url = self.repo_url(repo, ["git", "trees", branch]);
        url.query_pairs_mut().append_pair("recursive", "1");
        let raw: Option<RawTree> = self.get_json(&url).await?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        if raw.truncated {
            info!(repo = %repo, "GitHub truncated the recursive tree");
        }
        Ok(tree_entries(raw))
    }

    async fn commits(
        &self,
        repo: &RepositoryReference,
        limit: u8,
    ) -> Result<Vec<CommitSummary>, HostError> {
        let mut url = self.repo_url(repo, ["commits"]);
        url.query_pairs_mut().append_pair("per_page", &limit.to_string());
        let raw: Option<Vec<RawCommit>> = self.get_json(&url).await?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .take(limit as usize)
            .map(CommitSummary::from)
            .collect())
    }

    async fn contributors(
        &self,
        repo: &RepositoryReference,
        limit: u8,
    ) -> Result<Vec<ContributorSummary>, HostError> {
        let mut url = self.repo_url(repo, ["contributors"]);
        url.query_pairs_mut().append_pair("per_page", &limit.to_string());
        let raw: Option<Vec<ContributorSummary>> = self.get_json(&url).await?;
        Ok(raw.unwrap_or_default().into_iter().take(limit as usize).collect())
    }

    async fn contents(
        &self,
        repo: &RepositoryReference,
        path: &str,
    ) -> Result<ContentPayload, HostError> {
        let segments = path.split('/').filter(|segment| !segment.is_empty());
        let url = self.repo_url(repo, std::iter::once("contents").chain(segments));
        match self.get_json::<Value>(&url).await? {
            Some(body) => content_payload(body, url.as_str()),
            None => Ok(ContentPayload::File(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget() -> RepositoryReference {
        RepositoryReference {
            owner: "acme".into(),
            name: "widget".into(),
        }
    }

    #[test]
    fn request_segments_are_percent_encoded() {
        let client = GitHubClient::new(&GitHubConfig {
            api_base: "https://ghe.example.com/api/v3/".into(),
            ..GitHubConfig::default()
        })
        .unwrap();
        let url = client.repo_url(&widget(), ["contents", "docs", "C#-notes?.md", "100%"]);
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/acme/widget/contents/docs/C%23-notes%3F.md/100%25"
        );
        let url = client.repo_url(&widget(), ["git", "trees", "release/1.0"]);
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/acme/widget/git/trees/release%2F1.0"
        );
    }

    #[test]
    fn rejects_unusable_api_base() {
        for base in ["not a url", "mailto:octocat@example.com"] {
            let result = GitHubClient::new(&GitHubConfig {
                api_base: base.into(),
                ..GitHubConfig::default()
            });
            assert!(matches!(result, Err(HostError::Body { .. })), "{base}");
        }
    }

    #[test]
    fn tree_keeps_blobs_and_trees_in_order() {
        let raw: RawTree = serde_json::from_value(json!({
            "sha": "root",
            "truncated": false,
            "tree": [
                {"path": "src", "mode": "040000", "type": "tree", "sha": "t1", "url": "u"},
                {"path": "src/main.rs", "mode": "100644", "type": "blob", "sha": "b1", "size": 120, "url": "u"},
                {"path": "vendor/lib", "mode": "160000", "type": "commit", "sha": "c1"},
                {"path": "README.md", "mode": "100644", "type": "blob", "sha": "b2", "size": 9, "url": "u"}
            ]
        }))
        .unwrap();
        let entries = tree_entries(raw);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["src", "src/main.rs", "README.md"]);
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[1].size_bytes, Some(120));
        assert_eq!(entries[1].content_hash, "b1");
    }

    #[test]
    fn commit_payload_maps_to_summary() {
        let raw: RawCommit = serde_json::from_value(json!({
            "sha": "abc",
            "commit": {
                "author": {"name": "Dev", "email": "d@example.com", "date": "2024-05-02T08:00:00Z"},
                "message": "Fix parser\n\nDetails"
            },
            "author": null
        }))
        .unwrap();
        let summary = CommitSummary::from(raw);
        assert_eq!(summary.author, "Dev");
        assert_eq!(summary.headline(), "Fix parser");
        assert_eq!(summary.day(), "2024-05-02");
    }

    #[test]
    fn contents_distinguishes_directory_absent_and_present() {
        let url = "https://api.github.com/repos/a/b/contents/x";
        assert_eq!(
            content_payload(json!([{"name": "a.rs"}]), url).unwrap(),
            ContentPayload::Directory
        );
        assert_eq!(
            content_payload(json!({"type": "file", "content": "", "encoding": "none"}), url).unwrap(),
            ContentPayload::File(None)
        );
        assert_eq!(
            content_payload(json!({"type": "file", "content": "aGk=\n", "encoding": "base64"}), url)
                .unwrap(),
            ContentPayload::File(Some(EncodedContent {
                content: "aGk=\n".into()
            }))
        );
    }

    #[test]
    fn metadata_deserializes_from_repository_payload() {
        let metadata: RepositoryMetadata = serde_json::from_value(json!({
            "name": "widget",
            "description": null,
            "owner": {"login": "acme", "avatar_url": "https://avatars/acme"},
            "stargazers_count": 3,
            "forks_count": 1,
            "open_issues_count": 0,
            "updated_at": "2024-05-01T10:00:00Z",
            "language": "Rust",
            "html_url": "https://github.com/acme/widget",
            "default_branch": "trunk",
            "homepage": null
        }))
        .unwrap();
        assert_eq!(metadata.default_branch, "trunk");
        assert_eq!(metadata.description, None);
    }
}
