use super::{Device, InferenceBackend, InferenceOutput};
use crate::classes::ClassNames;
use anyhow::Context;
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{CUDAExecutionProvider, ExecutionProvider},
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const INPUT_NAME: &str = "images";
/// Output name of Ultralytics YOLOv8 exports.
const DEFAULT_OUTPUT_NAME: &str = "output0";

pub struct OrtBackend {
    // `Session::run` needs exclusive access, so concurrent requests take turns.
    session: Mutex<Session>,
    output_name: String,
    device: Device,
    class_names: Option<ClassNames>,
}

impl OrtBackend {
    /// Load a YOLOv8 ONNX export, preferring CUDA when the provider is usable.
    pub fn load_model(path: &Path, intra_threads: usize) -> anyhow::Result<Self> {
        Self::load_model_with_device(path, Self::detect_device(), intra_threads)
    }

    /// Load model with specified execution provider
    pub fn load_model_with_device(
        path: &Path,
        device: Device,
        intra_threads: usize,
    ) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?;

        match device {
            Device::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(0)
                    .build()
                    .error_on_failure()])?;
            }
            Device::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        let output_names: Vec<&str> = session.outputs().iter().map(|o| o.name()).collect();
        let output_name = select_output_name(&output_names)
            .with_context(|| format!("model {} declares no outputs", path.display()))?;
        let class_names = read_class_names(&session);

        tracing::info!(
            path = %path.display(),
            device = %device,
            output = %output_name,
            embedded_classes = class_names.as_ref().map(|n| n.len()),
            "Model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            device,
            class_names,
        })
    }

    pub fn detect_device() -> Device {
        match CUDAExecutionProvider::default().is_available() {
            Ok(true) => Device::Cuda,
            Ok(false) => Device::Cpu,
            Err(e) => {
                tracing::debug!(error = %e, "CUDA availability check failed, using CPU");
                Device::Cpu
            }
        }
    }
}

/// Prefer the standard YOLOv8 output, otherwise the first declared one.
fn select_output_name(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find(|name| **name == DEFAULT_OUTPUT_NAME)
        .or_else(|| names.first())
        .map(|name| name.to_string())
}

// A panic mid-run leaves the session itself usable, so poisoning is ignored.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_class_names(session: &Session) -> Option<ClassNames> {
    let metadata = match session.metadata() {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read model metadata");
            return None;
        }
    };

    match metadata.custom("names") {
        Some(raw) => {
            let parsed = ClassNames::from_ultralytics_metadata(&raw);
            if parsed.is_none() {
                tracing::warn!(names = %raw, "Unrecognised `names` metadata");
            }
            parsed
        }
        None => None,
    }
}

impl InferenceBackend for OrtBackend {
    fn infer(&self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
        let mut session = lock_session(&self.session);

        let outputs = session.run(ort::inputs![
            INPUT_NAME => TensorRef::from_array_view(images.view())?
        ])?;

        let predictions = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("model produced no `{}` output", self.output_name))?
            .try_extract_array::<f32>()?;

        Ok(InferenceOutput {
            predictions: predictions.into_owned(),
        })
    }

    fn device(&self) -> Device {
        self.device
    }

    fn class_names(&self) -> Option<ClassNames> {
        self.class_names.clone()
    }
}
