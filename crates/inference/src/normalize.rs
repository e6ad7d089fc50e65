use crate::classes::ClassNames;
use crate::types::{Detection, RawDetection};

/// Resolve class indices to labels, keeping the model's detection order.
pub fn normalize_detections(raw: Vec<RawDetection>, class_names: &ClassNames) -> Vec<Detection> {
    raw.into_iter()
        .map(|d| Detection {
            class: class_names.label(d.class_id).to_string(),
            confidence: d.confidence,
            bbox: d.bbox,
        })
        .collect()
}
