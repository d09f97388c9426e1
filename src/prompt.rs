//! Prompt rendering for a single evaluation.
//!
//! The prompt is a pure function of the aggregate record. Its size is bounded
//! by listing at most [`MAX_PROMPT_FILES`] files and [`MAX_README_CHARS`]
//! characters of README; the commit log is already capped by the aggregator.

use std::fmt::Write as _;

use crate::aggregate::AggregateRecord;
use crate::contract::{AnalysisRequest, CommitSummary, FileTreeEntry};
use crate::schema::{response_schema, RESPONSE_SCHEMA_NAME};

pub const MAX_PROMPT_FILES: usize = 300;
pub const MAX_README_CHARS: usize = 5000;

/// Build the request for the completion service: prompt plus response contract.
pub fn build_request(record: &AggregateRecord) -> AnalysisRequest {
    AnalysisRequest {
        prompt: render_prompt(record),
        schema_name: RESPONSE_SCHEMA_NAME.to_string(),
        schema: response_schema(),
    }
}

/// Paths of the first [`MAX_PROMPT_FILES`] files, in tree order.
pub fn file_listing(tree: &[FileTreeEntry]) -> Vec<&str> {
    tree.iter()
        .filter(|entry| entry.is_file())
        .take(MAX_PROMPT_FILES)
        .map(|entry| entry.path.as_str())
        .collect()
}

/// One `- <day>: <headline>` line per commit, in the order given.
pub fn commit_lines(commits: &[CommitSummary]) -> Vec<String> {
    commits
        .iter()
        .map(|commit| format!("- {}: {}", commit.day(), commit.headline()))
        .collect()
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn render_prompt(record: &AggregateRecord) -> String {
    let metadata = &record.metadata;
    let mut prompt = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        prompt,
        "You are a Senior Software Architect. Analyze this GitHub repository.\n"
    );
    let _ = writeln!(prompt, "**Metadata:**");
    let _ = writeln!(prompt, "- Name: {}", metadata.name);
    let _ = writeln!(
        prompt,
        "- Lang: {}",
        metadata.language.as_deref().unwrap_or("unknown")
    );
    let _ = writeln!(prompt, "- Stars: {}", metadata.stargazers_count);
    let _ = writeln!(prompt, "- Last Update: {}\n", metadata.updated_at);

    let _ = writeln!(prompt, "**Recent Commits:**");
    for line in commit_lines(&record.commits) {
        let _ = writeln!(prompt, "{line}");
    }

    let _ = writeln!(prompt, "\n**File Structure (Partial View):**");
    for path in file_listing(&record.file_tree) {
        let _ = writeln!(prompt, "{path}");
    }

    let _ = writeln!(prompt, "\n**README (Truncated):**");
    let _ = writeln!(prompt, "{}", truncate_chars(&record.readme, MAX_README_CHARS));

    prompt.push_str(INSTRUCTIONS);
    prompt
}

const INSTRUCTIONS: &str = "
**Task:**
Evaluate the repository.

**SCORING RULES (CRITICAL):**
- **ALL scores must be strictly on a scale of 0 to 100.**
- 0 is the worst, 100 is the best.
- Do NOT use a scale of 1-10. If the quality is an 8/10, output 80.
- The 'overall score' and all 'metric scores' must be 0-100.
- Breakdowns maxScore should typically be 100 or the sum of items should equal the metric score.

**Specific Evaluation Criteria for Metrics:**
1. **Readme**: Allocate points specifically for \"Setup Instructions\" and \"Software Requirements\".
2. **Code Quality**: Allocate points specifically for \"Comments/Documentation\" and \"Readability/Naming\".
3. **History**: Commit frequency and message clarity.
4. **Structure**: Logical organization.
5. **Tests**: Coverage and CI.

**Standardized Checklist:**
Verify the existence of: License, Readme, Contribution Guidelines, Test Suite, CI Configuration.

**Medal:**
Gold, Silver, Bronze or Iron, from best to worst, matching the overall score.

**Output:** JSON only.
";
