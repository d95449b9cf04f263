//! End-to-end flow: analyze source, render a prompt, generate a record.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ast_engine::EntityExtractor;
use crate::error::PipelineError;
use crate::output::TrainingExampleGenerator;
use crate::prompt::{count_tokens, synthesize_prompt, PromptOutcome};
use crate::types::{FileAnalysis, QaRecord};
use crate::DEFAULT_MAX_PROMPT_TOKENS;

/// Outcome of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Generated(QaRecord),
    MethodNotFound,
}

/// A rendered prompt with its token count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPrompt {
    pub text: String,
    pub token_count: usize,
}

/// Runs extraction, prompt synthesis and generation with one generator.
#[derive(Clone)]
pub struct QaPipeline {
    generator: Arc<dyn TrainingExampleGenerator>,
    max_prompt_tokens: usize,
}

impl QaPipeline {
    pub fn new(generator: Arc<dyn TrainingExampleGenerator>) -> Self {
        Self {
            generator,
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
        }
    }

    /// Set the prompt token limit.
    pub fn with_max_prompt_tokens(mut self, limit: usize) -> Self {
        self.max_prompt_tokens = limit;
        self
    }

    pub fn generator(&self) -> &dyn TrainingExampleGenerator {
        self.generator.as_ref()
    }

    pub fn max_prompt_tokens(&self) -> usize {
        self.max_prompt_tokens
    }

    /// Render the prompt for `target_method` and check it against the limit.
    ///
    /// Returns `Ok(None)` when the method is not in the analysis.
    pub fn prepare_prompt(
        &self,
        analysis: &FileAnalysis,
        target_method: &str,
    ) -> Result<Option<PreparedPrompt>, PipelineError> {
        let text = match synthesize_prompt(analysis, target_method) {
            PromptOutcome::Found(text) => text,
            PromptOutcome::NotFound => return Ok(None),
        };

        let token_count = count_tokens(&text);
        if token_count > self.max_prompt_tokens {
            return Err(PipelineError::PromptTooLarge {
                method: target_method.to_string(),
                tokens: token_count,
                limit: self.max_prompt_tokens,
            });
        }

        Ok(Some(PreparedPrompt { text, token_count }))
    }

    /// Generate a record for one method of an existing analysis.
    pub async fn generate_for(
        &self,
        analysis: &FileAnalysis,
        target_method: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let Some(prompt) = self.prepare_prompt(analysis, target_method)? else {
            warn!(file_path = %analysis.file_path, target_method, "Target method not found");
            return Ok(PipelineOutcome::MethodNotFound);
        };

        info!(
            file_path = %analysis.file_path,
            target_method,
            tokens = prompt.token_count,
            generator = self.generator.name(),
            "Sending prompt to generator"
        );

        let record = self.generator.generate_training_example(&prompt.text).await?;
        Ok(PipelineOutcome::Generated(record))
    }

    /// Analyze `source` and generate a record for `target_method`.
    pub async fn run(
        &self,
        source: &str,
        file_path: &str,
        target_method: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let analysis = EntityExtractor::extract(source, file_path)?;
        self.generate_for(&analysis, target_method).await
    }
}
