pub mod backend;
pub mod classes;
pub mod config;
pub mod decoder;
pub mod error;
pub mod mapping;
pub mod model;
pub mod normalize;
pub mod processing;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use backend::{Device, InferenceBackend, InferenceOutput};
pub use config::{ModelConfig, ModelSource};
pub use error::PipelineError;
pub use mapping::{ClassMappingTable, HazardCategory};
pub use model::ModelHandle;
pub use service::{InferenceService, MODEL_VERSION_TAG};
pub use types::{Detection, HazardPrediction, ImageSize, InferenceResult};
