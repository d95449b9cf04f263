//! Batch generation over many candidate methods of one file.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::{PipelineOutcome, QaPipeline};
use crate::types::{FileAnalysis, QaRecord};
use crate::DEFAULT_BATCH_CONCURRENCY;

/// Configuration for batch generation.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum generations in flight
    pub concurrency: usize,
    /// Whether to continue when a single target fails
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            continue_on_error: true,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub file_path: String,
    pub total_targets: usize,
    pub generated: usize,
    pub failed: usize,
    /// Targets that resolved to no method.
    pub missing: Vec<String>,
    /// Records in target order.
    pub records: Vec<QaRecord>,
    pub errors: Vec<BatchError>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// A target that failed to generate.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub target_method: String,
    pub error: String,
}

/// Generates records for several methods of a single analysis.
pub struct BatchGenerator {
    pipeline: QaPipeline,
    config: BatchConfig,
}

impl BatchGenerator {
    pub fn new(pipeline: QaPipeline, config: BatchConfig) -> Self {
        Self { pipeline, config }
    }

    /// Generate a record for each of `targets`, in order.
    pub async fn generate_batch(
        &self,
        analysis: &FileAnalysis,
        targets: &[String],
    ) -> Result<BatchReport, PipelineError> {
        let started_at = Utc::now();
        let pipeline = &self.pipeline;

        info!(
            file_path = %analysis.file_path,
            targets = targets.len(),
            concurrency = self.config.concurrency,
            "Starting batch generation"
        );

        let mut results = stream::iter(targets.iter().cloned())
            .map(|target| async move {
                let result = pipeline.generate_for(analysis, &target).await;
                (target, result)
            })
            .buffered(self.config.concurrency.max(1));

        let mut records = Vec::new();
        let mut missing = Vec::new();
        let mut errors = Vec::new();

        while let Some((target, result)) = results.next().await {
            match result {
                Ok(PipelineOutcome::Generated(record)) => records.push(record),
                Ok(PipelineOutcome::MethodNotFound) => missing.push(target),
                Err(e) => {
                    if !self.config.continue_on_error {
                        return Err(e);
                    }
                    warn!(target_method = %target, error = %e, "Failed to generate example");
                    errors.push(BatchError {
                        target_method: target,
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = BatchReport {
            file_path: analysis.file_path.clone(),
            total_targets: targets.len(),
            generated: records.len(),
            failed: errors.len(),
            missing,
            records,
            errors,
            started_at,
            completed_at: Utc::now(),
        };

        info!(
            generated = report.generated,
            missing = report.missing.len(),
            failed = report.failed,
            "Batch generation complete"
        );

        Ok(report)
    }

    /// Generate a record for every distinct method name in the analysis.
    pub async fn generate_all(&self, analysis: &FileAnalysis) -> Result<BatchReport, PipelineError> {
        let targets = distinct_method_names(analysis);
        self.generate_batch(analysis, &targets).await
    }
}

/// Method names in model order, first occurrence only.
pub fn distinct_method_names(analysis: &FileAnalysis) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in analysis.method_names() {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
