//! Prompt synthesis for QA generation.

pub mod synthesizer;
pub mod tokens;

pub use synthesizer::{render_prompt, synthesize_prompt, PromptOutcome, METHOD_NOT_FOUND};
pub use tokens::count_tokens;
