//! QA training record returned by the generation boundary.

use serde::{Deserialize, Serialize};

/// A question/answer training example with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub id: String,

    /// Scenario tag, e.g. `business_logic_qa`.
    pub scenario: String,

    /// Label of the repository the source came from.
    pub source_repository: String,

    pub metadata: RecordMetadata,

    pub question: String,

    pub answer: Answer,
}

/// Language/domain tags attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub language: String,
    pub domain: String,
}

/// Answer text plus the code locations it is grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Answer {
    pub summary: String,

    #[serde(default)]
    pub trace: Vec<TraceEntry>,
}

/// Links an answer back to a method in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Role of the location, e.g. `entrypoint`.
    #[serde(rename = "type")]
    pub kind: String,

    pub description: String,

    pub file_path: String,

    pub class: String,

    pub method: String,

    pub line_start: usize,
}
