use crate::{
    decoder::decode_image,
    error::PipelineError,
    mapping::ClassMappingTable,
    model::ModelHandle,
    normalize::normalize_detections,
    types::{ImageSize, InferenceResult, round_millis},
};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::sync::Arc;
use std::time::Instant;

/// Tag reported with every prediction.
pub const MODEL_VERSION_TAG: &str = "YOLOv8";

/// Per-request pipeline stages. Any stage may end in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Decoding,
    Inferring,
    Mapping,
    Responding,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Decoding => "decoding",
            Stage::Inferring => "inferring",
            Stage::Mapping => "mapping",
            Stage::Responding => "responding",
        }
    }
}

struct Metrics {
    duration: Histogram<f64>,
    images: Counter<u64>,
    predictions: Counter<u64>,
    failures: Counter<u64>,
}

fn init_metrics(meter_name: &'static str) -> Metrics {
    let meter = global::meter(meter_name);
    let latency_buckets = [
        0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0,
    ];

    Metrics {
        duration: meter
            .f64_histogram("hazard_inference_duration_seconds")
            .with_description("Time to process a single image (decode + infer + map)")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build(),
        images: meter
            .u64_counter("hazard_images_total")
            .with_description("Total images processed successfully")
            .build(),
        predictions: meter
            .u64_counter("hazard_predictions_total")
            .with_description("Total hazard predictions returned")
            .build(),
        failures: meter
            .u64_counter("hazard_inference_failures_total")
            .with_description("Images that failed to process, by reason")
            .build(),
    }
}

/// Runs the single-image pipeline: decode, detect, normalize, map.
///
/// Cheap to clone; the model and mapping table are shared.
#[derive(Clone)]
pub struct InferenceService {
    model: Option<Arc<ModelHandle>>,
    mapping: Arc<ClassMappingTable>,
    metrics: Arc<Metrics>,
}

impl InferenceService {
    pub fn new(model: Option<Arc<ModelHandle>>, mapping: Arc<ClassMappingTable>) -> Self {
        Self {
            model,
            mapping,
            metrics: Arc::new(init_metrics("inference")),
        }
    }

    pub fn model(&self) -> Option<&Arc<ModelHandle>> {
        self.model.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Process one uploaded image. Blocking: call from a blocking-capable
    /// thread when running inside an async runtime.
    pub fn predict(
        &self,
        image_bytes: &[u8],
        confidence_threshold: f32,
    ) -> Result<InferenceResult, PipelineError> {
        let span = tracing::info_span!(
            "predict",
            confidence_threshold,
            bytes = image_bytes.len(),
            stage = Stage::Received.as_str(),
            predictions = tracing::field::Empty,
        );
        let _enter = span.enter();

        let start = Instant::now();
        let mut stage = Stage::Received;

        let result = self.run_stages(image_bytes, confidence_threshold, &mut stage, &span);
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok((predictions, image_size)) => {
                stage = Stage::Responding;
                span.record("stage", stage.as_str());
                span.record("predictions", predictions.len());

                self.metrics.duration.record(elapsed, &[]);
                self.metrics.images.add(1, &[]);
                self.metrics.predictions.add(predictions.len() as u64, &[]);

                tracing::debug!(
                    predictions = predictions.len(),
                    elapsed_s = elapsed,
                    "Image processed"
                );

                Ok(InferenceResult {
                    predictions,
                    processing_time: round_millis(elapsed),
                    model_version: MODEL_VERSION_TAG,
                    image_size,
                })
            }
            Err(e) => {
                self.metrics
                    .failures
                    .add(1, &[KeyValue::new("reason", e.kind())]);
                tracing::warn!(
                    stage = stage.as_str(),
                    reason = e.kind(),
                    error = %e,
                    "Prediction failed"
                );
                Err(e)
            }
        }
    }

    fn run_stages(
        &self,
        image_bytes: &[u8],
        confidence_threshold: f32,
        stage: &mut Stage,
        span: &tracing::Span,
    ) -> Result<(Vec<crate::types::HazardPrediction>, ImageSize), PipelineError> {
        let mut advance = |next: Stage| {
            *stage = next;
            span.record("stage", next.as_str());
        };

        let model = self.model.as_ref().ok_or(PipelineError::ModelUnavailable)?;

        advance(Stage::Decoding);
        let image = decode_image(image_bytes)?;
        let image_size = ImageSize {
            width: image.width(),
            height: image.height(),
        };

        advance(Stage::Inferring);
        let raw = model.detect(&image, confidence_threshold)?;

        advance(Stage::Mapping);
        let detections = normalize_detections(raw, model.class_names());
        let predictions = self.mapping.map(&detections, confidence_threshold);

        Ok((predictions, image_size))
    }
}
