//! Generation boundary and its implementations.

pub mod generation_client;
pub mod generator;
pub mod mock_generator;

pub use generation_client::GenerationClient;
pub use generator::{FnGenerator, TrainingExampleGenerator};
pub use mock_generator::MockGenerator;
