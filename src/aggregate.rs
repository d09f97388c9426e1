//! Data aggregation: one metadata fetch that must succeed, followed by
//! best-effort fetches of README, tree, commits and contributors.
//!
//! Requests are issued one after another. Optional resources that fail or come
//! back empty are recorded in [`FetchOutcomes`] and surface as empty values on
//! the [`AggregateRecord`]; they never abort the run.

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::contract::{
    AnalysisError, CommitSummary, ContentPayload, ContributorSummary, FileTreeEntry, HostError,
    RepositoryHost, RepositoryMetadata,
};
use crate::reference::RepositoryReference;

/// Upper bound the platform applies to the commit log request.
pub const COMMIT_LIMIT: u8 = 10;
/// Upper bound the platform applies to the contributor request.
pub const CONTRIBUTOR_LIMIT: u8 = 10;

pub const DIRECTORY_PLACEHOLDER: &str = "Cannot display directory content directly.";
pub const MISSING_CONTENT_PLACEHOLDER: &str = "File content not available.";
pub const UNREADABLE_CONTENT_PLACEHOLDER: &str = "Error reading file content.";

/// Outcome of one optional fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Data(T),
    Empty,
    Failed(String),
}

impl<T: Default> Fetched<T> {
    pub fn status(&self) -> FetchStatus {
        match self {
            Fetched::Data(_) => FetchStatus::Loaded,
            Fetched::Empty => FetchStatus::Empty,
            Fetched::Failed(_) => FetchStatus::Failed,
        }
    }

    /// Collapse to the public present-or-empty view.
    pub fn into_value(self) -> T {
        match self {
            Fetched::Data(value) => value,
            Fetched::Empty | Fetched::Failed(_) => T::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Loaded,
    Empty,
    Failed,
}

/// Per-resource outcome of the optional fetches of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchOutcomes {
    pub readme: FetchStatus,
    pub tree: FetchStatus,
    pub commits: FetchStatus,
    pub contributors: FetchStatus,
}

/// Everything gathered about a repository before prompting.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub metadata: RepositoryMetadata,
    pub file_tree: Vec<FileTreeEntry>,
    pub readme: String,
    pub commits: Vec<CommitSummary>,
    pub contributors: Vec<ContributorSummary>,
    pub outcomes: FetchOutcomes,
}

/// Fetch and merge all resources of `repo`.
///
/// Fails with [`AnalysisError::NotFound`] only when the metadata request fails,
/// in which case nothing else is requested.
pub async fn aggregate<H>(host: &H, repo: &RepositoryReference) -> Result<AggregateRecord, AnalysisError>
where
    H: RepositoryHost + ?Sized,
{
    let metadata = match host.metadata(repo).await {
        Ok(metadata) => {
            info!(repo = %repo, default_branch = %metadata.default_branch, "Fetched repository metadata");
            metadata
        }
        Err(e) => {
            warn!(repo = %repo, error = %e, "Metadata fetch failed, aborting aggregation");
            return Err(AnalysisError::NotFound);
        }
    };

    let readme = fetch_readme(host, repo).await;
    let file_tree = tolerate(
        "tree",
        host.tree(repo, &metadata.default_branch).await,
        |entries: &Vec<FileTreeEntry>| entries.is_empty(),
    );
    let commits = tolerate(
        "commits",
        host.commits(repo, COMMIT_LIMIT).await,
        |commits: &Vec<CommitSummary>| commits.is_empty(),
    );
    let contributors = tolerate(
        "contributors",
        host.contributors(repo, CONTRIBUTOR_LIMIT).await,
        |contributors: &Vec<ContributorSummary>| contributors.is_empty(),
    );

    let outcomes = FetchOutcomes {
        readme: readme.status(),
        tree: file_tree.status(),
        commits: commits.status(),
        contributors: contributors.status(),
    };
    info!(repo = %repo, ?outcomes, "Aggregation complete");

    Ok(AggregateRecord {
        metadata,
        file_tree: file_tree.into_value(),
        readme: readme.into_value(),
        commits: commits.into_value(),
        contributors: contributors.into_value(),
        outcomes,
    })
}

async fn fetch_readme<H>(host: &H, repo: &RepositoryReference) -> Fetched<String>
where
    H: RepositoryHost + ?Sized,
{
    match host.readme(repo).await {
        Ok(encoded) => match decode_base64_text(&encoded.content) {
            Ok(text) if text.is_empty() => Fetched::Empty,
            Ok(text) => {
                debug!(repo = %repo, chars = text.chars().count(), "Decoded README");
                Fetched::Data(text)
            }
            Err(e) => {
                warn!(repo = %repo, error = %e, "README is not valid base64, continuing without it");
                Fetched::Failed(e.to_string())
            }
        },
        Err(e) => {
            warn!(repo = %repo, error = %e, "README fetch failed, continuing without it");
            Fetched::Failed(e.to_string())
        }
    }
}

fn tolerate<T>(resource: &str, result: Result<T, HostError>, is_empty: impl Fn(&T) -> bool) -> Fetched<T> {
    match result {
        Ok(value) if is_empty(&value) => {
            debug!(resource, "Optional resource is empty");
            Fetched::Empty
        }
        Ok(value) => Fetched::Data(value),
        Err(e) => {
            warn!(resource, error = %e, "Optional fetch failed, continuing without it");
            Fetched::Failed(e.to_string())
        }
    }
}

/// Decode line-wrapped base64 into text.
///
/// All whitespace is removed before decoding; invalid UTF-8 sequences are
/// replaced rather than rejected.
pub fn decode_base64_text(encoded: &str) -> Result<String, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read one file for display.
///
/// Never fails: directories, files without inline content and failed requests
/// each yield a descriptive placeholder instead of the content.
pub async fn file_content<H>(host: &H, repo: &RepositoryReference, path: &str) -> String
where
    H: RepositoryHost + ?Sized,
{
    match host.contents(repo, path).await {
        Ok(ContentPayload::Directory) => DIRECTORY_PLACEHOLDER.to_string(),
        Ok(ContentPayload::File(None)) => MISSING_CONTENT_PLACEHOLDER.to_string(),
        Ok(ContentPayload::File(Some(encoded))) if encoded.content.trim().is_empty() => {
            MISSING_CONTENT_PLACEHOLDER.to_string()
        }
        Ok(ContentPayload::File(Some(encoded))) => match decode_base64_text(&encoded.content) {
            Ok(text) => text,
            Err(e) => {
                warn!(repo = %repo, path, error = %e, "File content is not valid base64");
                UNREADABLE_CONTENT_PLACEHOLDER.to_string()
            }
        },
        Err(e) => {
            warn!(repo = %repo, path, error = %e, "File content fetch failed");
            UNREADABLE_CONTENT_PLACEHOLDER.to_string()
        }
    }
}

/// Put the repository owner first, then everyone else by descending
/// contribution count. Equal counts keep their platform order.
pub fn order_contributors(
    mut contributors: Vec<ContributorSummary>,
    owner_login: &str,
) -> Vec<ContributorSummary> {
    contributors.sort_by(|a, b| {
        let a_owner = a.login == owner_login;
        let b_owner = b.login == owner_login;
        b_owner
            .cmp(&a_owner)
            .then_with(|| b.contributions.cmp(&a.contributions))
    });
    contributors
}
