use crate::{
    backend::{Device, InferenceBackend, InferenceOutput},
    classes::ClassNames,
    config::{ModelConfig, ModelSource},
    error::PipelineError,
    processing::{
        post::{PostProcessor, TransformParams},
        pre::PreProcessor,
    },
    types::RawDetection,
};
use image::RgbImage;
use std::path::PathBuf;

/// The loaded detection model and its class vocabulary.
///
/// Built once at startup and shared read-only across requests.
pub struct ModelHandle {
    backend: Box<dyn InferenceBackend>,
    class_names: ClassNames,
    preprocessor: PreProcessor,
    postprocessor: PostProcessor,
    source: ModelSource,
    path: PathBuf,
}

impl ModelHandle {
    pub fn new(
        backend: Box<dyn InferenceBackend>,
        config: &ModelConfig,
        source: ModelSource,
        path: PathBuf,
    ) -> Self {
        let class_names = backend.class_names().unwrap_or_else(|| {
            tracing::info!("Model has no embedded class names, using COCO labels");
            ClassNames::coco()
        });

        Self {
            backend,
            class_names,
            preprocessor: PreProcessor::new(config.input_size),
            postprocessor: PostProcessor::new(config.iou_threshold, config.max_detections),
            source,
            path,
        }
    }

    /// Load the custom model if present, otherwise the pretrained fallback.
    #[cfg(feature = "ort-backend")]
    pub fn load(config: &ModelConfig) -> anyhow::Result<Self> {
        use crate::backend::ort::OrtBackend;
        use anyhow::Context;

        let (path, source) = config.resolve_model_path();
        match source {
            ModelSource::Custom => {
                tracing::info!(path = %path.display(), "Loading custom model")
            }
            ModelSource::Pretrained => tracing::info!(
                path = %path.display(),
                missing = %config.model_path.display(),
                "Custom model not found, loading pretrained model"
            ),
        }

        let backend = OrtBackend::load_model(path, config.intra_threads)
            .with_context(|| format!("failed to load model from {}", path.display()))?;

        let handle = Self::new(Box::new(backend), config, source, path.clone());
        tracing::info!(
            device = %handle.device(),
            classes = ?handle.class_names.as_slice(),
            "Model loaded successfully"
        );

        Ok(handle)
    }

    /// Run the model and return raw detections at or above `confidence_threshold`.
    pub fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, PipelineError> {
        let (input, letterbox) = self
            .preprocessor
            .preprocess(image)
            .map_err(PipelineError::Inference)?;

        let InferenceOutput { predictions } = {
            let _infer_span = tracing::info_span!("model_inference", device = %self.device()).entered();
            self.backend.infer(&input).map_err(PipelineError::Inference)?
        };

        let transform = TransformParams {
            orig_width: image.width(),
            orig_height: image.height(),
            letterbox,
        };

        self.postprocessor
            .parse_detections(&predictions.view(), confidence_threshold, &transform)
            .map_err(PipelineError::Inference)
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.class_names
    }

    pub fn device(&self) -> Device {
        self.backend.device()
    }

    pub fn input_size(&self) -> (u32, u32) {
        self.preprocessor.input_size
    }

    pub fn source(&self) -> ModelSource {
        self.source
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
