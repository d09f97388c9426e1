//! Command-line interface for repo-medal.
//!
//! The CLI is glue only: it loads configuration, constructs the GitHub and
//! completion clients, and hands them to the library pipeline. Results are
//! written to stdout; diagnostics go through `tracing`.
//!
//! ## How To Use
//! - `repo-medal analyze --url https://github.com/owner/repo` prints the full evaluation as JSON.
//! - `repo-medal file --url ... --path src/main.rs` prints one file.
//! - `repo-medal tree --url ... [--dir src]` lists one directory level.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::aggregate::file_content;
use crate::completion::CompletionClient;
use crate::config::{AppConfig, GitHubConfig};
use crate::contract::{AnalysisError, EntryKind, RepositoryHost};
use crate::evaluate::evaluate;
use crate::github::GitHubClient;
use crate::load_config::{load_config, load_config_from_env, read_config_file};
use crate::reference::{parse_repository_url, RepositoryReference};
use crate::tree::children;

/// CLI for repo-medal: grade a public GitHub repository.
#[derive(Parser)]
#[clap(
    name = "repo-medal",
    version,
    about = "Grade a public GitHub repository with a schema-constrained LLM evaluation"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a repository and print the report as JSON
    Analyze {
        /// Repository URL, e.g. https://github.com/owner/repo
        #[clap(long)]
        url: String,
        /// Optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Print the content of one file in a repository
    File {
        #[clap(long)]
        url: String,
        /// Path of the file inside the repository
        #[clap(long)]
        path: String,
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// List the immediate children of a directory in a repository
    Tree {
        #[clap(long)]
        url: String,
        /// Directory inside the repository; the root when omitted
        #[clap(long, default_value = "")]
        dir: String,
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Analyze { url, config } => {
            // Reject malformed input before any configuration or client is touched.
            reference(&url)?;
            let config = app_config(config.as_deref())?;
            let host = GitHubClient::new(&config.github)?;
            let completion = CompletionClient::new(config.completion)?;
            tracing::info!(command = "analyze", url = %url, "Starting evaluation");

            let report = evaluate(&url, &host, &completion).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::File { url, path, config } => {
            let repo = reference(&url)?;
            let host = GitHubClient::new(&github_config(config.as_deref())?)?;
            println!("{}", file_content(&host, &repo, &path).await);
            Ok(())
        }
        Commands::Tree { url, dir, config } => {
            let repo = reference(&url)?;
            let host = GitHubClient::new(&github_config(config.as_deref())?)?;
            print_tree(&host, &repo, &dir).await
        }
    }
}

fn reference(url: &str) -> Result<RepositoryReference> {
    parse_repository_url(url).ok_or_else(|| {
        tracing::error!(url, "Input is not a repository URL");
        AnalysisError::InvalidReference.into()
    })
}

fn app_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None => load_config_from_env(),
    }
}

fn github_config(path: Option<&Path>) -> Result<GitHubConfig> {
    Ok(match path {
        Some(path) => read_config_file(path)?.github,
        None => GitHubConfig::default(),
    })
}

async fn print_tree<H>(host: &H, repo: &RepositoryReference, dir: &str) -> Result<()>
where
    H: RepositoryHost + ?Sized,
{
    let metadata = host.metadata(repo).await.map_err(|e| {
        tracing::error!(repo = %repo, error = %e, "Metadata fetch failed");
        AnalysisError::NotFound
    })?;
    let entries = host.tree(repo, &metadata.default_branch).await?;
    for entry in children(&entries, dir) {
        match entry.kind {
            EntryKind::Directory => println!("{}/", entry.path),
            EntryKind::File => match entry.size_bytes {
                Some(size) => println!("{}\t{} B", entry.path, size),
                None => println!("{}", entry.path),
            },
        }
    }
    Ok(())
}
