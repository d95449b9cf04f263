//! The generation boundary: prompt in, training record out.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::types::QaRecord;

/// Turns a rendered prompt into a QA training record.
///
/// Implementations may be slow or networked. Extraction and prompt synthesis
/// never depend on a concrete implementation.
#[async_trait]
pub trait TrainingExampleGenerator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Generate a training record for `prompt`.
    async fn generate_training_example(&self, prompt: &str) -> Result<QaRecord, GenerationError>;
}

/// Adapts a plain function `&str -> QaRecord` into a generator.
pub struct FnGenerator<F> {
    func: F,
}

impl<F> FnGenerator<F>
where
    F: Fn(&str) -> QaRecord + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> TrainingExampleGenerator for FnGenerator<F>
where
    F: Fn(&str) -> QaRecord + Send + Sync,
{
    fn name(&self) -> &'static str {
        "function"
    }

    async fn generate_training_example(&self, prompt: &str) -> Result<QaRecord, GenerationError> {
        Ok((self.func)(prompt))
    }
}
