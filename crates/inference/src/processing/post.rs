use crate::processing::pre::Letterbox;
use crate::types::RawDetection;

pub struct TransformParams {
    pub orig_width: u32,
    pub orig_height: u32,
    pub letterbox: Letterbox,
}

pub struct PostProcessor {
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl PostProcessor {
    pub fn new(iou_threshold: f32, max_detections: usize) -> Self {
        Self {
            iou_threshold,
            max_detections,
        }
    }

    /// Decode a YOLOv8 head output into source-image detections.
    ///
    /// `output` is `[1, 4 + num_classes, num_anchors]`: per anchor, a box in
    /// cxcywh input-pixel coordinates followed by per-class scores. Results
    /// come back in confidence-descending order after class-aware NMS.
    #[tracing::instrument(skip(self, output, transform))]
    pub fn parse_detections(
        &self,
        output: &ndarray::ArrayViewD<f32>,
        confidence_threshold: f32,
        transform: &TransformParams,
    ) -> anyhow::Result<Vec<RawDetection>> {
        let shape = output.shape();
        if shape.len() != 3 || shape[0] != 1 || shape[1] < 5 {
            anyhow::bail!(
                "Unexpected model output shape {:?}, expected [1, 4 + classes, anchors]",
                shape
            );
        }

        let num_features = shape[1];
        let num_anchors = shape[2];

        let mut candidates = Vec::new();

        for i in 0..num_anchors {
            // Argmax over class scores
            let mut confidence = f32::NEG_INFINITY;
            let mut class_id = 0usize;
            for c in 4..num_features {
                let score = output[[0, c, i]];
                if score > confidence {
                    confidence = score;
                    class_id = c - 4;
                }
            }

            if !confidence.is_finite() || confidence < confidence_threshold {
                continue;
            }

            let (x1, y1, x2, y2) = cxcywh_to_xyxy(
                output[[0, 0, i]],
                output[[0, 1, i]],
                output[[0, 2, i]],
                output[[0, 3, i]],
            );

            candidates.push(RawDetection {
                class_id,
                confidence,
                bbox: to_source_coordinates([x1, y1, x2, y2], transform),
            });
        }

        let candidates_before_nms = candidates.len();
        let detections = self.non_maximum_suppression(candidates);

        tracing::trace!(
            candidates_before_nms,
            detections = detections.len(),
            "Decoded model output"
        );

        Ok(detections)
    }

    /// Greedy per-class NMS, keeping at most `max_detections`.
    fn non_maximum_suppression(&self, mut candidates: Vec<RawDetection>) -> Vec<RawDetection> {
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut kept: Vec<RawDetection> = Vec::new();
        for candidate in candidates {
            if kept.len() >= self.max_detections {
                break;
            }
            let suppressed = kept.iter().any(|k| {
                k.class_id == candidate.class_id && iou(&k.bbox, &candidate.bbox) > self.iou_threshold
            });
            if !suppressed {
                kept.push(candidate);
            }
        }
        kept
    }
}

/// Undo the letterbox and clamp to the source image.
fn to_source_coordinates(bbox: [f32; 4], transform: &TransformParams) -> [f32; 4] {
    let lb = &transform.letterbox;
    let w = transform.orig_width as f32;
    let h = transform.orig_height as f32;

    [
        ((bbox[0] - lb.offset_x) / lb.scale).clamp(0.0, w),
        ((bbox[1] - lb.offset_y) / lb.scale).clamp(0.0, h),
        ((bbox[2] - lb.offset_x) / lb.scale).clamp(0.0, w),
        ((bbox[3] - lb.offset_y) / lb.scale).clamp(0.0, h),
    ]
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let x1 = cx - w / 2.0;
    let y1 = cy - h / 2.0;
    let x2 = cx + w / 2.0;
    let y2 = cy + h / 2.0;
    (x1, y1, x2, y2)
}

/// Intersection over union of two corner-format boxes
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - inter;

    if union <= 0.0 { 0.0 } else { inter / union }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    /// Helper to create a default PostProcessor for tests
    fn test_postprocessor() -> PostProcessor {
        PostProcessor::new(0.7, 300)
    }

    /// Letterbox transform for a source of the given size
    fn test_transform(
        orig_width: u32,
        orig_height: u32,
        scale: f32,
        offset_x: f32,
        offset_y: f32,
    ) -> TransformParams {
        TransformParams {
            orig_width,
            orig_height,
            letterbox: Letterbox {
                scale,
                offset_x,
                offset_y,
            },
        }
    }

    /// Helper to create YOLOv8 format output [1, 4 + num_classes, n]
    fn create_yolo_output(
        boxes_cxcywh: Vec<[f32; 4]>,
        class_scores: Vec<(usize, f32)>, // (class_id, score) per anchor
        num_classes: usize,
    ) -> Array<f32, IxDyn> {
        let n = boxes_cxcywh.len();
        let features = 4 + num_classes;
        let mut output = Array::zeros(IxDyn(&[1, features, n]));

        for (i, b) in boxes_cxcywh.iter().enumerate() {
            for (k, v) in b.iter().enumerate() {
                output[[0, k, i]] = *v;
            }
        }
        for (i, (class_id, score)) in class_scores.iter().enumerate() {
            output[[0, 4 + class_id, i]] = *score;
        }

        output
    }

    #[test]
    fn test_cxcywh_to_xyxy() {
        let (x1, y1, x2, y2) = cxcywh_to_xyxy(0.5, 0.5, 0.4, 0.2);
        assert!((x1 - 0.3).abs() < 1e-6);
        assert!((y1 - 0.4).abs() < 1e-6);
        assert!((x2 - 0.7).abs() < 1e-6);
        assert!((y2 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_iou() {
        let a = [0.0, 0.0, 10.0, 10.0];
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(iou(&a, &[20.0, 20.0, 30.0, 30.0]), 0.0);
        // Half overlap: inter 50, union 150
        assert!((iou(&a, &[5.0, 0.0, 15.0, 10.0]) - 1.0 / 3.0).abs() < 1e-6);
        // Degenerate boxes
        assert_eq!(iou(&[0.0; 4], &[0.0; 4]), 0.0);
    }

    /// Test that confidence threshold filters detections correctly
    #[test]
    fn test_confidence_threshold_filtering() {
        let boxes = vec![
            [100.0, 100.0, 20.0, 20.0],
            [200.0, 200.0, 20.0, 20.0],
            [300.0, 300.0, 20.0, 20.0],
        ];
        let scores = vec![(0, 0.49), (1, 0.5), (2, 0.8)];

        let output = create_yolo_output(boxes, scores, 80);
        let detections = test_postprocessor()
            .parse_detections(&output.view(), 0.5, &test_transform(640, 640, 1.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(detections.len(), 2, "Should filter out confidence < 0.5");
        assert!(detections.iter().all(|d| d.confidence >= 0.5));
        assert_eq!(detections[0].class_id, 2, "Highest confidence first");
        assert_eq!(detections[1].class_id, 1, "Boundary case: 0.5 included");
    }

    /// Test coordinate inverse transformation with known values
    #[test]
    fn test_coordinate_inverse_transformation() {
        // Original image: 800x600, input 640x640
        // Scale = 0.8, Offset X = 0, Offset Y = 80
        // Box in input space cxcywh (320, 320, 160, 160) -> xyxy (240, 240, 400, 400)
        // After inverse transform:
        //   x1 = 240 / 0.8 = 300
        //   y1 = (240 - 80) / 0.8 = 200
        //   x2 = 400 / 0.8 = 500
        //   y2 = (400 - 80) / 0.8 = 400
        let output = create_yolo_output(vec![[320.0, 320.0, 160.0, 160.0]], vec![(0, 0.9)], 80);
        let detections = test_postprocessor()
            .parse_detections(&output.view(), 0.5, &test_transform(800, 600, 0.8, 0.0, 80.0))
            .unwrap();

        assert_eq!(detections.len(), 1);
        let [x1, y1, x2, y2] = detections[0].bbox;
        assert!((x1 - 300.0).abs() < 0.1, "x1 transformation incorrect: {}", x1);
        assert!((y1 - 200.0).abs() < 0.1, "y1 transformation incorrect: {}", y1);
        assert!((x2 - 500.0).abs() < 0.1, "x2 transformation incorrect: {}", x2);
        assert!((y2 - 400.0).abs() < 0.1, "y2 transformation incorrect: {}", y2);
    }

    /// Test that coordinates are clamped to image bounds
    #[test]
    fn test_coordinates_clamped_to_image_bounds() {
        let boxes = vec![
            [10.0, 10.0, 100.0, 100.0],   // Will go negative
            [390.0, 390.0, 100.0, 100.0], // Will exceed bounds
        ];
        let scores = vec![(0, 0.9), (1, 0.9)];
        let output = create_yolo_output(boxes, scores, 80);

        let detections = test_postprocessor()
            .parse_detections(&output.view(), 0.5, &test_transform(400, 400, 1.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(detections.len(), 2);
        let low = detections.iter().find(|d| d.class_id == 0).unwrap();
        let high = detections.iter().find(|d| d.class_id == 1).unwrap();

        assert_eq!(low.bbox[0], 0.0, "Negative x1 should be clamped to 0");
        assert_eq!(low.bbox[1], 0.0, "Negative y1 should be clamped to 0");
        assert_eq!(high.bbox[2], 400.0, "x2 exceeding width should be clamped");
        assert_eq!(high.bbox[3], 400.0, "y2 exceeding height should be clamped");
    }

    /// Test class ID extraction via argmax
    #[test]
    fn test_class_id_argmax() {
        let boxes = vec![
            [50.0, 50.0, 10.0, 10.0],
            [150.0, 150.0, 10.0, 10.0],
            [250.0, 250.0, 10.0, 10.0],
        ];
        let mut output = create_yolo_output(boxes, vec![(0, 0.9), (39, 0.8), (79, 0.7)], 80);
        // A weaker competing score must not win the argmax
        output[[0, 4 + 5, 0]] = 0.6;

        let detections = test_postprocessor()
            .parse_detections(&output.view(), 0.5, &test_transform(640, 640, 1.0, 0.0, 0.0))
            .unwrap();

        let ids: Vec<usize> = detections.iter().map(|d| d.class_id).collect();
        assert_eq!(ids, vec![0, 39, 79]);
    }

    #[test]
    fn test_nms_suppresses_same_class_overlaps_only() {
        let boxes = vec![
            [100.0, 100.0, 50.0, 50.0],
            [102.0, 102.0, 50.0, 50.0], // Same class, heavy overlap -> suppressed
            [101.0, 101.0, 50.0, 50.0], // Different class, heavy overlap -> kept
            [400.0, 400.0, 50.0, 50.0], // Same class, no overlap -> kept
        ];
        let scores = vec![(3, 0.9), (3, 0.85), (7, 0.8), (3, 0.6)];
        let output = create_yolo_output(boxes, scores, 80);

        let detections = test_postprocessor()
            .parse_detections(&output.view(), 0.25, &test_transform(640, 640, 1.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(detections.len(), 3);
        assert_eq!(detections[0].confidence, 0.9);
        assert_eq!(detections[1].class_id, 7);
        assert_eq!(detections[2].confidence, 0.6);
    }

    #[test]
    fn test_max_detections_cap() {
        let boxes: Vec<[f32; 4]> = (0..10)
            .map(|i| [i as f32 * 60.0 + 20.0, 20.0, 10.0, 10.0])
            .collect();
        let scores = (0..10).map(|i| (0, 0.9 - i as f32 * 0.01)).collect();
        let output = create_yolo_output(boxes, scores, 80);

        let post_processor = PostProcessor::new(0.7, 4);
        let detections = post_processor
            .parse_detections(&output.view(), 0.5, &test_transform(640, 640, 1.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(detections.len(), 4);
        assert!(detections.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }

    /// Test edge case: Empty detections (0 anchors)
    #[test]
    fn test_empty_input() {
        let output = Array::from_shape_vec(IxDyn(&[1, 84, 0]), vec![]).unwrap();
        let detections = test_postprocessor()
            .parse_detections(&output.view(), 0.5, &test_transform(640, 640, 1.0, 0.0, 0.0))
            .unwrap();

        assert!(detections.is_empty(), "Empty input should return no detections");
    }

    #[test]
    fn test_rejects_unexpected_shape() {
        let output = Array::<f32, _>::zeros(IxDyn(&[1, 300, 4]));
        // [1, 300, 4] parses as 296 classes x 4 anchors, all zero -> nothing
        assert!(
            test_postprocessor()
                .parse_detections(&output.view(), 0.5, &test_transform(640, 640, 1.0, 0.0, 0.0))
                .unwrap()
                .is_empty()
        );

        let output = Array::<f32, _>::zeros(IxDyn(&[300, 4]));
        assert!(
            test_postprocessor()
                .parse_detections(&output.view(), 0.5, &test_transform(640, 640, 1.0, 0.0, 0.0))
                .is_err()
        );
    }
}
