use crate::mapping::HazardCategory;
use serde::Serialize;

/// Corner-format box in source-image pixels: `[x1, y1, x2, y2]`.
pub type BoundingBox = [f32; 4];

/// Model output for one located object, before labels are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub class: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardPrediction {
    pub class: HazardCategory,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub original_class: String,
}

/// Serialized as `[height, width]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Serialize for ImageSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.height, self.width].serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    pub predictions: Vec<HazardPrediction>,
    /// Wall-clock seconds from decode through mapping, rounded to
    /// milliseconds. Receiving the upload is not included.
    pub processing_time: f64,
    pub model_version: &'static str,
    pub image_size: ImageSize,
}

pub(crate) fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}
