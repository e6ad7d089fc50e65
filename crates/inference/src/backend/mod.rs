use crate::classes::ClassNames;
use ndarray::{Array, IxDyn};
use serde::Serialize;
use std::fmt;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Compute device a model was bound to at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded detection model.
///
/// Implementations must tolerate concurrent `infer` calls from multiple
/// request handlers.
pub trait InferenceBackend: Send + Sync {
    /// Run the model on an NCHW input tensor.
    fn infer(&self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;

    fn device(&self) -> Device;

    /// Class table embedded in the model file, if any.
    fn class_names(&self) -> Option<ClassNames> {
        None
    }
}

pub struct InferenceOutput {
    pub predictions: ndarray::ArrayD<f32>, // [1, 4 + num_classes, num_anchors] cxcywh + scores
}
