//! Error types for analysis, generation and the combined pipeline.

use thiserror::Error;

/// Failure to turn source text into a [`FileAnalysis`](crate::FileAnalysis).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Source text is not valid in the supported grammar.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-based line of the first error.
        line: usize,
        /// 0-based column of the first error.
        column: usize,
        message: String,
    },

    /// The grammar could not be loaded or the parser gave up.
    #[error("parser unavailable: {0}")]
    Parser(String),
}

impl AnalysisError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, AnalysisError::Syntax { .. })
    }
}

/// Failure inside a generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("generation backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("generation response was not a valid training record: {0}")]
    InvalidResponse(String),
}

/// Failure of the end-to-end analyze → prompt → generate flow.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("prompt for `{method}` has {tokens} tokens, limit is {limit}")]
    PromptTooLarge {
        method: String,
        tokens: usize,
        limit: usize,
    },

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
