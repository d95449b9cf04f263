//! CodeQA Service Library
//!
//! Extracts class and method knowledge from source code and turns it into
//! question/answer training examples about the code's business logic.

pub mod api;
pub mod ast_engine;
pub mod batch;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use ast_engine::{extract, EntityExtractor};
pub use batch::{BatchConfig, BatchGenerator, BatchReport};
pub use error::{AnalysisError, GenerationError, PipelineError};
pub use output::{FnGenerator, GenerationClient, MockGenerator, TrainingExampleGenerator};
pub use pipeline::{PipelineOutcome, QaPipeline};
pub use prompt::{synthesize_prompt, PromptOutcome, METHOD_NOT_FOUND};
pub use types::{ClassEntity, FileAnalysis, MethodEntity, QaRecord};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ast_engine::{extract, EntityExtractor};
    pub use crate::error::*;
    pub use crate::output::*;
    pub use crate::pipeline::*;
    pub use crate::prompt::*;
    pub use crate::types::*;
}

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3019;

/// Default prompt budget in tokens
pub const DEFAULT_MAX_PROMPT_TOKENS: usize = 4096;

/// Default number of concurrent generations in a batch
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Default repository label for generated records
pub const DEFAULT_SOURCE_REPOSITORY: &str = "internal_project/user_management_system";
