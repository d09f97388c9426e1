//! Repair of the structured payload returned by the completion service.
//!
//! [`sanitize`] turns any JSON value into a complete [`AnalysisResult`]:
//! missing containers become empty, missing metrics become
//! [`MetricDetail::default`], partially filled metrics only get the missing
//! arrays. Scores are copied as given; they are neither clamped nor rescaled.

use serde_json::{Map, Value};
use tracing::debug;

use crate::schema::{
    AnalysisResult, CheckStatus, ComplianceItem, MetricBreakdown, MetricDetail, Metrics, Priority,
    RoadmapItem, Tier,
};

/// Build a structurally complete result from an untrusted payload. Never fails.
pub fn sanitize(payload: Value) -> AnalysisResult {
    let empty = Map::new();
    let root = payload.as_object().unwrap_or(&empty);

    let metrics_container = match root.get("metrics").and_then(Value::as_object) {
        Some(container) => container,
        None => {
            debug!("Payload has no metrics container, substituting an empty one");
            &empty
        }
    };
    let metric = |key: &str| match metrics_container.get(key) {
        Some(value) if value.is_object() => metric_detail(value),
        _ => {
            debug!(metric = key, "Metric missing from payload, using default");
            MetricDetail::default()
        }
    };

    let medal = match root.get("medal").and_then(Value::as_str).and_then(Tier::parse) {
        Some(tier) => tier,
        None => {
            debug!(medal = ?root.get("medal"), "Unrecognised medal, using Iron");
            Tier::Iron
        }
    };

    AnalysisResult {
        score: number(root, "score"),
        medal,
        metrics: Metrics {
            readme: metric("readme"),
            quality: metric("quality"),
            history: metric("history"),
            structure: metric("structure"),
            tests: metric("tests"),
        },
        checklist: objects(root, "checklist", compliance_item),
        summary: text(root, "summary"),
        tech_stack: strings(root, "techStack"),
        roadmap: objects(root, "roadmap", roadmap_item),
    }
}

fn metric_detail(value: &Value) -> MetricDetail {
    let Some(fields) = value.as_object() else {
        return MetricDetail::default();
    };
    MetricDetail {
        score: number(fields, "score"),
        reasoning: text(fields, "reasoning"),
        relevant_files: strings(fields, "relevantFiles"),
        breakdown: objects(fields, "breakdown", |entry| MetricBreakdown {
            label: text(entry, "label"),
            score: number(entry, "score"),
            max_score: number(entry, "maxScore"),
        }),
    }
}

fn compliance_item(entry: &Map<String, Value>) -> ComplianceItem {
    let status = match entry.get("status").and_then(Value::as_str) {
        Some("Pass") => CheckStatus::Pass,
        _ => CheckStatus::Fail,
    };
    ComplianceItem {
        item: text(entry, "item"),
        status,
    }
}

fn roadmap_item(entry: &Map<String, Value>) -> RoadmapItem {
    let priority = match entry.get("priority").and_then(Value::as_str) {
        Some("High") => Priority::High,
        Some("Medium") => Priority::Medium,
        _ => Priority::Low,
    };
    RoadmapItem {
        title: text(entry, "title"),
        description: text(entry, "description"),
        priority,
    }
}

fn number(fields: &Map<String, Value>, key: &str) -> f64 {
    fields.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn strings(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Map every object element of the array at `key`; anything else is dropped.
fn objects<T>(fields: &Map<String, Value>, key: &str, map: impl Fn(&Map<String, Value>) -> T) -> Vec<T> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).map(&map).collect())
        .unwrap_or_default()
}
