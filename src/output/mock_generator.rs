//! Deterministic stand-in for a generation backend.

use async_trait::async_trait;
use tracing::debug;

use super::generator::TrainingExampleGenerator;
use crate::error::GenerationError;
use crate::types::{Answer, QaRecord, RecordMetadata, TraceEntry};

/// Returns the same reference record for every prompt.
///
/// Used when no backend is configured, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The fixed record this generator returns.
    pub fn reference_record() -> QaRecord {
        QaRecord {
            id: "qa_user_creation_001".to_string(),
            scenario: "business_logic_qa".to_string(),
            source_repository: "internal_project/user_management_system".to_string(),
            metadata: RecordMetadata {
                language: "Python".to_string(),
                domain: "User Management".to_string(),
            },
            question: "In the user management system, what is the complete business flow for \
                       creating a new user, and which checks run first?"
                .to_string(),
            answer: Answer {
                summary: "Creating a new user goes through the `create_user` method of \
                          `UserService`. The flow first checks that the username and email are \
                          unique to prevent duplicates. Once the checks pass, the user entity is \
                          created and persisted to the database, and the basic info of the new \
                          user (ID, username and so on) is returned."
                    .to_string(),
                trace: vec![TraceEntry {
                    kind: "entrypoint".to_string(),
                    description: "The primary business logic for creating a new user.".to_string(),
                    file_path: "services/user_service.py".to_string(),
                    class: "UserService".to_string(),
                    method: "create_user".to_string(),
                    line_start: 15,
                }],
            },
        }
    }
}

#[async_trait]
impl TrainingExampleGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate_training_example(&self, prompt: &str) -> Result<QaRecord, GenerationError> {
        debug!(prompt_len = prompt.len(), "Mock generator received prompt");
        Ok(Self::reference_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let generator = MockGenerator::new();
        let a = generator.generate_training_example("one").await.unwrap();
        let b = generator.generate_training_example("two").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id, "qa_user_creation_001");
    }

    #[test]
    fn test_reference_record_shape() {
        let value = serde_json::to_value(MockGenerator::reference_record()).unwrap();
        let Value::Object(top) = &value else {
            panic!("record is not an object");
        };

        let mut keys: Vec<&str> = top.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["answer", "id", "metadata", "question", "scenario", "source_repository"]
        );
        assert_eq!(value["metadata"]["language"], "Python");

        let trace = &value["answer"]["trace"][0];
        for key in ["type", "description", "file_path", "class", "method", "line_start"] {
            assert!(trace.get(key).is_some(), "missing trace key {key}");
        }
        assert_eq!(trace["type"], "entrypoint");
    }
}
