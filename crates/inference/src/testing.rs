//! In-memory backend for exercising the pipeline without an ONNX model.

use crate::{
    backend::{Device, InferenceBackend, InferenceOutput},
    classes::ClassNames,
    config::{ModelConfig, ModelSource},
    model::ModelHandle,
};
use ndarray::{Array, IxDyn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the same YOLOv8-shaped output for every call.
pub struct FixedBackend {
    output: Option<Array<f32, IxDyn>>,
    names: Option<ClassNames>,
    calls: Arc<AtomicUsize>,
}

impl FixedBackend {
    /// Detections given as `(class_id, score, [cx, cy, w, h])` in input pixels.
    pub fn with_detections(num_classes: usize, detections: &[(usize, f32, [f32; 4])]) -> Self {
        let mut output = Array::zeros(IxDyn(&[1, 4 + num_classes, detections.len()]));
        for (i, (class_id, score, b)) in detections.iter().enumerate() {
            for (k, v) in b.iter().enumerate() {
                output[[0, k, i]] = *v;
            }
            output[[0, 4 + class_id, i]] = *score;
        }

        Self {
            output: Some(output),
            names: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A model that never finds anything.
    pub fn empty() -> Self {
        Self::with_detections(80, &[])
    }

    /// A model whose every invocation errors.
    pub fn failing() -> Self {
        Self {
            output: None,
            names: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_names(mut self, names: ClassNames) -> Self {
        self.names = Some(names);
        self
    }

    /// Shared invocation counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn into_handle(self) -> ModelHandle {
        ModelHandle::new(
            Box::new(self),
            &ModelConfig::default(),
            ModelSource::Pretrained,
            "memory://fixed".into(),
        )
    }
}

impl InferenceBackend for FixedBackend {
    fn infer(&self, _images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.output {
            Some(output) => Ok(InferenceOutput {
                predictions: output.clone(),
            }),
            None => anyhow::bail!("fixed backend configured to fail"),
        }
    }

    fn device(&self) -> Device {
        Device::Cpu
    }

    fn class_names(&self) -> Option<ClassNames> {
        self.names.clone()
    }
}
