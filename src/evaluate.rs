//! High-level pipeline: parse → aggregate → prompt → complete → sanitize.
//!
//! # Responsibilities
//! - Runs each step once, in order, awaiting one network call at a time
//! - Short-circuits on the three terminal causes of [`AnalysisError`]
//! - Hands back the sanitized [`AnalysisResult`] together with the raw data a
//!   presentation layer needs (metadata, flat tree, ordered contributors)
//!
//! # Callable From
//! - The CLI and the integration tests; both inject their own
//!   [`RepositoryHost`] and [`CompletionService`] implementations.

use serde::Serialize;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::aggregate::{aggregate, order_contributors, FetchOutcomes};
use crate::completion::invoke;
use crate::contract::{
    AnalysisError, CompletionService, ContributorSummary, FileTreeEntry, RepositoryHost,
    RepositoryMetadata,
};
use crate::prompt::build_request;
use crate::reference::parse_repository_url;
use crate::sanitize::sanitize;
use crate::schema::AnalysisResult;

/// Output of one successful evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub analysis: AnalysisResult,
    pub metadata: RepositoryMetadata,
    pub file_tree: Vec<FileTreeEntry>,
    /// Repository owner first, then by descending contributions.
    pub contributors: Vec<ContributorSummary>,
    #[serde(skip)]
    pub outcomes: FetchOutcomes,
}

/// Evaluate the repository behind `url`.
pub async fn evaluate<H, C>(url: &str, host: &H, completion: &C) -> Result<EvaluationReport, AnalysisError>
where
    H: RepositoryHost + ?Sized,
    C: CompletionService + ?Sized,
{
    let Some(repo) = parse_repository_url(url) else {
        error!(url, "Input is not a repository URL");
        return Err(AnalysisError::InvalidReference);
    };

    let span = tracing::info_span!("evaluate", run_id = %Uuid::new_v4(), repo = %repo);
    async move {
        info!("Fetching repository data");
        let record = aggregate(host, &repo).await?;

        info!(
            files = record.file_tree.len(),
            commits = record.commits.len(),
            readme_chars = record.readme.chars().count(),
            "Analyzing codebase"
        );
        let request = build_request(&record);
        let payload = invoke(completion, &request).await?;
        let analysis = sanitize(payload);
        info!(score = analysis.score, medal = ?analysis.medal, "Evaluation complete");

        let contributors = order_contributors(record.contributors, &record.metadata.owner.login);
        Ok::<_, AnalysisError>(EvaluationReport {
            analysis,
            metadata: record.metadata,
            file_tree: record.file_tree,
            contributors,
            outcomes: record.outcomes,
        })
    }
    .instrument(span)
    .await
}
