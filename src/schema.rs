//! The structured result of an evaluation and the JSON schema derived from it.
//!
//! [`AnalysisResult`] is the single definition of the response contract: the
//! schema sent to the completion service is generated from the type with
//! `schemars`, then tightened for strict structured-output mode (every key
//! required, no additional properties, no `format`/`title` annotations).

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESPONSE_SCHEMA_NAME: &str = "repository_analysis";

/// Ordinal tier assigned by the model to the overall score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Tier {
    Gold,
    Silver,
    Bronze,
    Iron,
}

impl Tier {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Gold" => Some(Tier::Gold),
            "Silver" => Some(Tier::Silver),
            "Bronze" => Some(Tier::Bronze),
            "Iron" => Some(Tier::Iron),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CheckStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricBreakdown {
    pub label: String,
    pub score: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricDetail {
    /// 0-100
    pub score: f64,
    pub reasoning: String,
    /// Repository paths that support the reasoning.
    pub relevant_files: Vec<String>,
    pub breakdown: Vec<MetricBreakdown>,
}

impl Default for MetricDetail {
    /// Stand-in for a metric the model did not return.
    fn default() -> Self {
        Self {
            score: 0.0,
            reasoning: "No data".to_string(),
            relevant_files: Vec::new(),
            breakdown: Vec::new(),
        }
    }
}

/// The five fixed metrics. Keys are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Metrics {
    /// Documentation quality, including setup instructions and requirements.
    pub readme: MetricDetail,
    /// Code quality: comments and readability/naming.
    pub quality: MetricDetail,
    /// Commit history: frequency and message clarity.
    pub history: MetricDetail,
    /// Logical organisation of the repository.
    pub structure: MetricDetail,
    /// Test coverage and CI.
    pub tests: MetricDetail,
}

impl Metrics {
    pub const KEYS: [&'static str; 5] = ["readme", "quality", "history", "structure", "tests"];

    pub fn get(&self, key: &str) -> Option<&MetricDetail> {
        match key {
            "readme" => Some(&self.readme),
            "quality" => Some(&self.quality),
            "history" => Some(&self.history),
            "structure" => Some(&self.structure),
            "tests" => Some(&self.tests),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceItem {
    pub item: String,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoadmapItem {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Sanitized outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall score, 0-100.
    pub score: f64,
    pub medal: Tier,
    pub metrics: Metrics,
    pub checklist: Vec<ComplianceItem>,
    pub summary: String,
    pub tech_stack: Vec<String>,
    pub roadmap: Vec<RoadmapItem>,
}

/// JSON schema for [`AnalysisResult`] in the form strict structured output expects.
pub fn response_schema() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();
    let root = generator.into_root_schema_for::<AnalysisResult>();
    let mut schema = serde_json::to_value(root).unwrap_or(Value::Null);
    tighten(&mut schema);
    schema
}

// Walks schema positions only, so property *names* such as `title` survive.
fn tighten(node: &mut Value) {
    let Value::Object(map) = node else {
        return;
    };
    map.remove("title");
    map.remove("format");
    map.remove("definitions");

    if let Some(Value::Object(props)) = map.get_mut("properties") {
        props.values_mut().for_each(tighten);
    }
    if let Some(items) = map.get_mut("items") {
        tighten(items);
    }
    for combinator in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = map.get_mut(combinator) {
            branches.iter_mut().for_each(tighten);
        }
    }

    if map.get("type").and_then(Value::as_str) == Some("object") {
        let keys: Vec<Value> = map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().map(Value::String).collect())
            .unwrap_or_default();
        map.insert("required".to_string(), Value::Array(keys));
        map.insert("additionalProperties".to_string(), Value::Bool(false));
    }
}
