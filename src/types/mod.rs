//! Core types for the QA service.

mod analysis;
mod config;
mod record;

pub use analysis::{ClassEntity, ClassKind, FileAnalysis, MethodEntity, MethodKind};
pub use config::{GenerationConfig, ServiceConfig};
pub use record::{Answer, QaRecord, RecordMetadata, TraceEntry};
