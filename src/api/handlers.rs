//! HTTP request handlers for the QA service.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ast_engine::EntityExtractor;
use crate::batch::{distinct_method_names, BatchConfig, BatchGenerator, BatchReport};
use crate::error::{AnalysisError, PipelineError};
use crate::pipeline::{PipelineOutcome, QaPipeline};
use crate::prompt::METHOD_NOT_FOUND;
use crate::types::{FileAnalysis, QaRecord, ServiceConfig};

/// Application state shared across handlers.
pub struct AppState {
    pub pipeline: QaPipeline,
    pub config: ServiceConfig,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

/// Handler error mapped onto a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                line: None,
                column: None,
            },
        }
    }

    fn method_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, METHOD_NOT_FOUND)
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match &err {
            AnalysisError::Syntax { line, column, .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: ErrorResponse {
                    error: err.to_string(),
                    line: Some(*line),
                    column: Some(*column),
                },
            },
            AnalysisError::Parser(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Analysis(e) => e.into(),
            PipelineError::PromptTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
            }
            PipelineError::Generation(e) => {
                warn!(error = %e, "Generation backend failed");
                Self::new(StatusCode::BAD_GATEWAY, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    generator: String,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generator: state.pipeline.generator().name().to_string(),
    })
}

/// Source unit to analyze.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub source: String,
    pub file_path: String,
}

/// Extract the entity model of a source unit.
pub async fn analyze(Json(request): Json<AnalyzeRequest>) -> Result<Json<FileAnalysis>, ApiError> {
    let analysis = EntityExtractor::extract(&request.source, &request.file_path)?;
    info!(
        file_path = %analysis.file_path,
        entities = analysis.entities.len(),
        "Analyzed source"
    );
    Ok(Json(analysis))
}

/// Source unit plus the method to build a prompt for.
#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub source: String,
    pub file_path: String,
    pub target_method: String,
}

/// Rendered prompt response.
#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub file_path: String,
    pub target_method: String,
    pub prompt: String,
    pub token_count: usize,
}

/// Render the generation prompt for one method.
pub async fn prompt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TargetRequest>,
) -> Result<Json<PromptResponse>, ApiError> {
    let analysis = EntityExtractor::extract(&request.source, &request.file_path)?;
    let prepared = state
        .pipeline
        .prepare_prompt(&analysis, &request.target_method)?
        .ok_or_else(ApiError::method_not_found)?;

    Ok(Json(PromptResponse {
        file_path: request.file_path,
        target_method: request.target_method,
        prompt: prepared.text,
        token_count: prepared.token_count,
    }))
}

/// Generate a training record for one method.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TargetRequest>,
) -> Result<Json<QaRecord>, ApiError> {
    let outcome = state
        .pipeline
        .run(&request.source, &request.file_path, &request.target_method)
        .await?;

    match outcome {
        PipelineOutcome::Generated(record) => Ok(Json(record)),
        PipelineOutcome::MethodNotFound => Err(ApiError::method_not_found()),
    }
}

/// Source unit plus optional candidate methods.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub source: String,
    pub file_path: String,
    /// Every method in the file when omitted.
    #[serde(default)]
    pub target_methods: Option<Vec<String>>,
}

/// Generate records for several methods of one file.
pub async fn generate_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchReport>, ApiError> {
    let analysis = EntityExtractor::extract(&request.source, &request.file_path)?;
    let targets = request
        .target_methods
        .unwrap_or_else(|| distinct_method_names(&analysis));

    let batch = BatchGenerator::new(
        state.pipeline.clone(),
        BatchConfig {
            concurrency: state.config.batch_concurrency,
            continue_on_error: true,
        },
    );

    let report = batch.generate_batch(&analysis, &targets).await?;
    Ok(Json(report))
}
