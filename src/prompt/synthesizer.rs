//! Prompt synthesis from an entity model.

use std::fmt;

use tracing::debug;

use crate::types::{ClassEntity, FileAnalysis, MethodEntity};

/// Returned in place of a prompt when the target method is not in the model.
pub const METHOD_NOT_FOUND: &str = "Error: target method not found.";

/// Marker substituted for a missing docstring.
const NO_DOCSTRING: &str = "None";

/// Result of resolving a target method and rendering its prompt.
///
/// A miss is an ordinary outcome: callers probe many candidate names and
/// branch on [`PromptOutcome::NotFound`] rather than handling an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Found(String),
    NotFound,
}

impl PromptOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PromptOutcome::Found(_))
    }

    /// The prompt text, or [`METHOD_NOT_FOUND`] for a miss.
    pub fn as_str(&self) -> &str {
        match self {
            PromptOutcome::Found(prompt) => prompt,
            PromptOutcome::NotFound => METHOD_NOT_FOUND,
        }
    }

    pub fn into_prompt(self) -> Option<String> {
        match self {
            PromptOutcome::Found(prompt) => Some(prompt),
            PromptOutcome::NotFound => None,
        }
    }
}

impl fmt::Display for PromptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve `target_method` in `analysis` and render a QA generation prompt.
///
/// The first class in model order that declares the method wins.
pub fn synthesize_prompt(analysis: &FileAnalysis, target_method: &str) -> PromptOutcome {
    match analysis.find_method(target_method) {
        Some((class, method)) => {
            debug!(
                file_path = %analysis.file_path,
                class = %class.name,
                method = %method.name,
                "Resolved target method"
            );
            PromptOutcome::Found(render_prompt(&analysis.file_path, class, method))
        }
        None => {
            debug!(file_path = %analysis.file_path, target_method, "Target method not found");
            PromptOutcome::NotFound
        }
    }
}

/// Render the prompt for a resolved method.
pub fn render_prompt(file_path: &str, class: &ClassEntity, method: &MethodEntity) -> String {
    let docstring = method.docstring.as_deref().unwrap_or(NO_DOCSTRING);

    let prompt = format!(
        r#"
Based on the code context below, generate a question-and-answer (QA) pair about the core business flow.

**Code context:**
- File path: {file_path}
- Target method: {method_name}
- Method documentation: {docstring}

**Your task:**
1. Write a **question** from the user's point of view.
2. Using the code logic and the documentation, write a detailed and accurate **answer**.
3. Output the result in the JSON format below, including `trace` information that shows what the answer is based on.

**Output format:**
{{
  "question": "...",
  "answer": {{
    "summary": "...",
    "trace": [
      {{
        "type": "entrypoint",
        "description": "...",
        "file_path": {file_path_json},
        "class": {class_json},
        "method": {method_json},
        "line_start": {line_start}
      }}
    ]
  }}
}}
"#,
        method_name = method.name,
        file_path_json = json_string(file_path),
        class_json = json_string(&class.name),
        method_json = json_string(&method.name),
        line_start = method.line_start,
    );

    prompt.trim().to_string()
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
