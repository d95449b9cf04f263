//! Token counting for prompt budgets.

use tiktoken_rs::CoreBPE;

lazy_static::lazy_static! {
    // cl100k_base is a close enough estimate for the chat models we target.
    static ref BPE: Option<CoreBPE> = tiktoken_rs::cl100k_base().ok();
}

/// Count the tokens in `text`.
///
/// Falls back to a four-bytes-per-token estimate if the encoding cannot be
/// loaded.
pub fn count_tokens(text: &str) -> usize {
    match BPE.as_ref() {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => text.len().div_ceil(4),
    }
}
