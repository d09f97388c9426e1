//! # contract: seams between the pipeline and the outside world
//!
//! This module defines the two traits the evaluation pipeline talks through
//! ([`RepositoryHost`] for the hosting platform, [`CompletionService`] for the
//! LLM) together with the plain data types that cross those seams and the
//! error taxonomy surfaced to callers.
//!
//! ## Interface & Extensibility
//! - Implement [`RepositoryHost`] to read repositories from another platform or a fixture.
//! - Implement [`CompletionService`] to talk to another structured-output LLM endpoint.
//! - Both traits are async and object safe; the pipeline never constructs clients itself.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; with the default `test-export-mocks`
//!   feature the generated `MockRepositoryHost` / `MockCompletionService` are
//!   available to integration tests.
//!
//! ## Errors
//! - Adapters return [`HostError`] / [`CompletionError`].
//! - The pipeline collapses everything into one of the three [`AnalysisError`] causes.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::reference::RepositoryReference;

/// Identity of the account owning a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerIdentity {
    pub login: String,
    pub avatar_url: String,
}

/// Descriptive attributes of the repository under evaluation.
///
/// Field names follow the GitHub REST payload so the type deserializes directly
/// from `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: OwnerIdentity,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub default_branch: String,
    #[serde(default)]
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One node of the flattened recursive tree. Hierarchy lives only in `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeEntry {
    pub path: String,
    pub kind: EntryKind,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl FileTreeEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub author: String,
    /// ISO-8601 timestamp as reported by the platform.
    pub date: String,
    pub message: String,
}

impl CommitSummary {
    /// First line of the commit message.
    pub fn headline(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Calendar date part of [`Self::date`].
    pub fn day(&self) -> &str {
        self.date.split('T').next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorSummary {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub contributions: u64,
    #[serde(default)]
    pub html_url: String,
}

/// Raw, still-encoded body of a README or file.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedContent {
    /// Base64 text, possibly line-wrapped.
    pub content: String,
}

/// What the contents endpoint returned for a path.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    /// The path names a directory; the platform answered with a listing.
    Directory,
    /// The path names a file. `None` when the platform omitted the body
    /// (for instance files above its inline size limit).
    File(Option<EncodedContent>),
}

/// Ephemeral request handed to the completion service for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub schema_name: String,
    /// JSON schema every response must satisfy.
    pub schema: serde_json::Value,
}

/// Failure talking to the hosting platform.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Failure talking to the completion service.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// The only failures a caller of the pipeline ever sees.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("invalid GitHub URL, expected https://github.com/owner/repo")]
    InvalidReference,
    #[error("repository not found or private")]
    NotFound,
    #[error("failed to generate analysis: {0}")]
    GenerationFailed(String),
}

/// Read access to a repository hosting platform.
///
/// Every method is one request with no retry. Implementors report non-success
/// statuses as [`HostError::Status`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    async fn metadata(&self, repo: &RepositoryReference) -> Result<RepositoryMetadata, HostError>;

    async fn readme(&self, repo: &RepositoryReference) -> Result<EncodedContent, HostError>;

    /// Full recursive tree anchored at `branch`, in platform order.
    async fn tree(
        &self,
        repo: &RepositoryReference,
        branch: &str,
    ) -> Result<Vec<FileTreeEntry>, HostError>;

    /// Most recent commits first, at most `limit`.
    async fn commits(
        &self,
        repo: &RepositoryReference,
        limit: u8,
    ) -> Result<Vec<CommitSummary>, HostError>;

    /// Top contributors, at most `limit`.
    async fn contributors(
        &self,
        repo: &RepositoryReference,
        limit: u8,
    ) -> Result<Vec<ContributorSummary>, HostError>;

    async fn contents(
        &self,
        repo: &RepositoryReference,
        path: &str,
    ) -> Result<ContentPayload, HostError>;
}

/// A text-completion endpoint able to honour a JSON schema contract.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Submit the request once. `Ok(None)` means the service answered without content.
    async fn complete(&self, request: &AnalysisRequest) -> Result<Option<String>, CompletionError>;
}
