//! Completion service boundary.
//!
//! [`invoke`] submits an [`AnalysisRequest`] once and returns the parsed but
//! otherwise untrusted JSON payload. [`CompletionClient`] is the production
//! [`CompletionService`]: an OpenAI-compatible chat completions endpoint using
//! strict `json_schema` response formatting.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::CompletionConfig;
use crate::contract::{AnalysisError, AnalysisRequest, CompletionError, CompletionService};

/// Submit `request` once and parse the structured payload.
///
/// Service errors, empty payloads and payloads that are not JSON all become
/// [`AnalysisError::GenerationFailed`]. Nothing is retried.
pub async fn invoke<S>(service: &S, request: &AnalysisRequest) -> Result<Value, AnalysisError>
where
    S: CompletionService + ?Sized,
{
    let text = match service.complete(request).await {
        Ok(Some(text)) if !text.trim().is_empty() => text,
        Ok(_) => {
            error!("Completion service returned an empty payload");
            return Err(AnalysisError::GenerationFailed(
                "empty response from completion service".to_string(),
            ));
        }
        Err(e) => {
            error!(error = %e, "Completion request failed");
            return Err(AnalysisError::GenerationFailed(e.to_string()));
        }
    };
    debug!(bytes = text.len(), "Received structured payload");

    serde_json::from_str(&text).map_err(|e| {
        error!(error = %e, "Structured payload is not valid JSON");
        AnalysisError::GenerationFailed(format!("unparseable structured output: {e}"))
    })
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct CompletionClient {
    config: CompletionConfig,
    client: Client,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        info!(base_url = %config.base_url, model = %config.model, "Initialized completion client");
        Ok(Self { config, client })
    }

    fn body<'a>(&'a self, request: &'a AnalysisRequest) -> ChatCompletionsRequest<'a> {
        ChatCompletionsRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &request.schema_name,
                    strict: true,
                    schema: &request.schema,
                },
            },
        }
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(&self, request: &AnalysisRequest) -> Result<Option<String>, CompletionError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        info!(url = %url, model = %self.config.model, prompt_chars = request.prompt.len(), "Requesting structured completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        Ok(parsed.into_content())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsResponse {
    fn into_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}
