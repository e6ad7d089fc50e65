use common::env_or;
use std::path::PathBuf;

pub const DEFAULT_INPUT_SIZE: (u32, u32) = (640, 640);
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Custom hazard model, used when the file exists.
    pub model_path: PathBuf,
    /// Generic pretrained model loaded when the custom one is absent.
    pub fallback_model_path: PathBuf,
    pub input_size: (u32, u32),
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
}

impl ModelConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let model_path: String = env_or("MODEL_PATH", "models/hazard_detection.onnx".to_string());
        let fallback_model_path: String =
            env_or("FALLBACK_MODEL_PATH", "models/yolov8n.onnx".to_string());

        let input_width = env_or("INPUT_WIDTH", DEFAULT_INPUT_SIZE.0);
        let input_height = env_or("INPUT_HEIGHT", DEFAULT_INPUT_SIZE.1);

        Self {
            model_path: model_path.into(),
            fallback_model_path: fallback_model_path.into(),
            input_size: (input_width.max(32), input_height.max(32)),
            iou_threshold: env_or("IOU_THRESHOLD", DEFAULT_IOU_THRESHOLD).clamp(0.0, 1.0),
            max_detections: env_or("MAX_DETECTIONS", DEFAULT_MAX_DETECTIONS).max(1),
            intra_threads: env_or("INTRA_THREADS", 4usize).max(1),
        }
    }

    /// Path that should actually be loaded: the custom model if present on
    /// disk, otherwise the pretrained fallback.
    pub fn resolve_model_path(&self) -> (&PathBuf, ModelSource) {
        if self.model_path.exists() {
            (&self.model_path, ModelSource::Custom)
        } else {
            (&self.fallback_model_path, ModelSource::Pretrained)
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/hazard_detection.onnx"),
            fallback_model_path: PathBuf::from("models/yolov8n.onnx"),
            input_size: DEFAULT_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
            intra_threads: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Custom,
    Pretrained,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::Custom => "custom",
            ModelSource::Pretrained => "pretrained",
        }
    }
}
