/// COCO class names in YOLOv8 (0-indexed, 80 classes) order.
///
/// Used when an exported model carries no `names` metadata.
pub const COCO_NAMES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

pub const UNKNOWN_LABEL: &str = "unknown";

const MAX_METADATA_CLASSES: usize = 10_000;

/// Class-index → label table of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn coco() -> Self {
        Self::new(COCO_NAMES.iter().map(|s| s.to_string()).collect())
    }

    /// Label for `class_id`, or [`UNKNOWN_LABEL`] when the index is out of range.
    pub fn label(&self, class_id: usize) -> &str {
        self.names
            .get(class_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parse the `names` metadata entry written by Ultralytics ONNX exports,
    /// a Python dict literal such as `{0: 'person', 1: 'bicycle'}`.
    ///
    /// Indices may be sparse; gaps are filled with [`UNKNOWN_LABEL`].
    pub fn from_ultralytics_metadata(raw: &str) -> Option<Self> {
        let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;

        let mut entries: Vec<(usize, String)> = Vec::new();
        let mut rest = body.trim();

        while !rest.is_empty() {
            let (index, after_index) = rest.split_once(':')?;
            let index: usize = index.trim().parse().ok()?;
            if index >= MAX_METADATA_CLASSES {
                return None;
            }

            let after_index = after_index.trim_start();
            let quote = after_index.chars().next()?;
            if quote != '\'' && quote != '"' {
                return None;
            }
            let value_start = &after_index[1..];
            let end = value_start.find(quote)?;
            entries.push((index, value_start[..end].to_string()));

            rest = value_start[end + 1..].trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
        }

        if entries.is_empty() {
            return None;
        }

        let len = entries.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
        let mut names = vec![UNKNOWN_LABEL.to_string(); len];
        for (index, name) in entries {
            names[index] = name;
        }

        Some(Self::new(names))
    }
}
