#![doc = "repo-medal: evaluate a public GitHub repository with a schema-constrained LLM."]

//! The library holds the whole evaluation pipeline; the binary in `main.rs` is
//! a thin CLI over it.
//!
//! # Pipeline
//! [`reference`] → [`aggregate`] → [`prompt`] / [`schema`] → [`completion`] →
//! [`sanitize`], composed by [`evaluate::evaluate`].
//!
//! # Seams
//! Network access goes through the traits in [`contract`]; [`github`] and
//! [`completion::CompletionClient`] are the production implementations.

pub mod aggregate;
pub mod cli;
pub mod completion;
pub mod config;
pub mod contract;
pub mod evaluate;
pub mod github;
pub mod load_config;
pub mod prompt;
pub mod reference;
pub mod sanitize;
pub mod schema;
pub mod tree;

pub use contract::AnalysisError;
pub use evaluate::{evaluate, EvaluationReport};
