//! HTTP client for an OpenAI-compatible generation backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::generator::TrainingExampleGenerator;
use crate::error::GenerationError;
use crate::types::{Answer, GenerationConfig, QaRecord, RecordMetadata};

const SYSTEM_PROMPT: &str = "You write training data about source code. \
Reply with a single JSON object and nothing else.";

const DEFAULT_SCENARIO: &str = "business_logic_qa";
const DEFAULT_LANGUAGE: &str = "Python";

/// Client that asks a chat-completions endpoint for QA records.
pub struct GenerationClient {
    client: Client,
    config: GenerationConfig,
    source_repository: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// What the model is asked to produce. Bookkeeping fields may be omitted.
#[derive(Debug, Deserialize)]
struct GeneratedExample {
    id: Option<String>,
    scenario: Option<String>,
    source_repository: Option<String>,
    metadata: Option<RecordMetadata>,
    question: String,
    answer: Answer,
}

impl GenerationClient {
    /// Create a new generation client.
    pub fn new(config: GenerationConfig, source_repository: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config,
            source_repository: source_repository.to_string(),
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Send the prompt, retrying transport errors and retryable statuses.
    async fn send_with_retry(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut attempt = 0;
        loop {
            match self.try_request(prompt).await {
                Ok(content) => return Ok(content),
                Err(e) if attempt < self.config.max_retries && Self::is_retryable(&e) => {
                    attempt += 1;
                    warn!(
                        error = %e,
                        attempt,
                        max_retries = self.config.max_retries,
                        "Generation request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(1 << (attempt - 1))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn is_retryable(error: &GenerationError) -> bool {
        match error {
            GenerationError::Transport(_) => true,
            GenerationError::Backend { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            GenerationError::InvalidResponse(_) => false,
        }
    }

    /// Send a single chat request and return the reply text.
    async fn try_request(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse("response had no content".to_string()))
    }

    /// Turn model output into a record, filling in omitted bookkeeping fields.
    pub fn parse_record(&self, content: &str) -> Result<QaRecord, GenerationError> {
        let json = extract_json_object(content).ok_or_else(|| {
            GenerationError::InvalidResponse("no JSON object in model output".to_string())
        })?;

        let generated: GeneratedExample = serde_json::from_str(json)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        Ok(QaRecord {
            id: generated
                .id
                .unwrap_or_else(|| format!("qa_{}", Uuid::new_v4().simple())),
            scenario: generated
                .scenario
                .unwrap_or_else(|| DEFAULT_SCENARIO.to_string()),
            source_repository: generated
                .source_repository
                .unwrap_or_else(|| self.source_repository.clone()),
            metadata: generated.metadata.unwrap_or_else(|| RecordMetadata {
                language: DEFAULT_LANGUAGE.to_string(),
                domain: String::new(),
            }),
            question: generated.question,
            answer: generated.answer,
        })
    }

    /// Check if the backend answers its model listing.
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[async_trait]
impl TrainingExampleGenerator for GenerationClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn generate_training_example(&self, prompt: &str) -> Result<QaRecord, GenerationError> {
        debug!(model = %self.config.model, prompt_len = prompt.len(), "Requesting training example");
        let content = self.send_with_retry(prompt).await?;
        let record = self.parse_record(&content)?;
        info!(id = %record.id, "Generated training example");
        Ok(record)
    }
}

/// Slice out the outermost `{...}` of a reply, ignoring code fences or chatter.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}
