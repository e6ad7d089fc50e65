use crate::types::{Detection, HazardPrediction};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Closed vocabulary of road-hazard categories reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardCategory {
    RoadCracks,
    GoodRoad,
    OpenManhole,
    Pothole,
    Debris,
    CattleOnRoad,
    TrafficLightIssue,
    SignageDamage,
    Other,
}

impl HazardCategory {
    pub const ALL: [HazardCategory; 9] = [
        HazardCategory::RoadCracks,
        HazardCategory::GoodRoad,
        HazardCategory::OpenManhole,
        HazardCategory::Pothole,
        HazardCategory::Debris,
        HazardCategory::CattleOnRoad,
        HazardCategory::TrafficLightIssue,
        HazardCategory::SignageDamage,
        HazardCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardCategory::RoadCracks => "road_cracks",
            HazardCategory::GoodRoad => "good_road",
            HazardCategory::OpenManhole => "open_manhole",
            HazardCategory::Pothole => "pothole",
            HazardCategory::Debris => "debris",
            HazardCategory::CattleOnRoad => "cattle_on_road",
            HazardCategory::TrafficLightIssue => "traffic_light_issue",
            HazardCategory::SignageDamage => "signage_damage",
            HazardCategory::Other => "other",
        }
    }
}

impl fmt::Display for HazardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use HazardCategory::*;

/// Classes of the custom hazard model followed by COCO fallbacks for when the
/// generic pretrained model is serving.
const STANDARD_ENTRIES: &[(&str, HazardCategory)] = &[
    ("cracks", RoadCracks),
    ("good_road", GoodRoad),
    ("open_manhole", OpenManhole),
    ("pothole", Pothole),
    ("person", Other),
    ("bicycle", Other),
    ("car", Other),
    ("motorcycle", Other),
    ("bus", Other),
    ("truck", Other),
    ("traffic light", TrafficLightIssue),
    ("stop sign", SignageDamage),
    ("bench", Debris),
    ("bird", Other),
    ("cat", CattleOnRoad),
    ("dog", CattleOnRoad),
    ("horse", CattleOnRoad),
    ("sheep", CattleOnRoad),
    ("cow", CattleOnRoad),
    ("elephant", CattleOnRoad),
    ("bear", CattleOnRoad),
    ("zebra", CattleOnRoad),
    ("giraffe", CattleOnRoad),
    ("umbrella", Debris),
    ("handbag", Debris),
    ("tie", Debris),
    ("suitcase", Debris),
    ("frisbee", Debris),
    ("skis", Debris),
    ("snowboard", Debris),
    ("sports ball", Debris),
    ("kite", Debris),
    ("baseball bat", Debris),
    ("baseball glove", Debris),
    ("skateboard", Debris),
    ("surfboard", Debris),
    ("tennis racket", Debris),
    ("bottle", Debris),
    ("wine glass", Debris),
    ("cup", Debris),
    ("fork", Debris),
    ("knife", Debris),
    ("spoon", Debris),
    ("bowl", Debris),
    ("chair", Debris),
    ("couch", Debris),
    ("potted plant", Debris),
    ("bed", Debris),
    ("dining table", Debris),
    ("toilet", Debris),
    ("tv", Debris),
    ("laptop", Debris),
    ("mouse", Debris),
    ("remote", Debris),
    ("keyboard", Debris),
    ("cell phone", Debris),
    ("microwave", Debris),
    ("oven", Debris),
    ("toaster", Debris),
    ("sink", Debris),
    ("refrigerator", Debris),
    ("book", Debris),
    ("clock", Debris),
    ("vase", Debris),
    ("scissors", Debris),
    ("teddy bear", Debris),
    ("hair drier", Debris),
    ("toothbrush", Debris),
];

/// Immutable lookup from lowercase model labels to hazard categories.
///
/// Total: labels without an entry map to [`HazardCategory::Other`].
#[derive(Debug, Clone)]
pub struct ClassMappingTable {
    entries: HashMap<String, HazardCategory>,
}

impl ClassMappingTable {
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_ENTRIES.iter().copied())
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, HazardCategory)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(label, category)| (label.to_lowercase(), category))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, label: &str) -> HazardCategory {
        self.entries
            .get(&label.to_lowercase())
            .copied()
            .unwrap_or(HazardCategory::Other)
    }

    /// Keep detections at or above `confidence_threshold` and translate their
    /// labels. Order is preserved.
    pub fn map(&self, detections: &[Detection], confidence_threshold: f32) -> Vec<HazardPrediction> {
        detections
            .iter()
            .filter(|d| d.confidence >= confidence_threshold)
            .map(|d| HazardPrediction {
                class: self.lookup(&d.class),
                confidence: d.confidence,
                bbox: d.bbox,
                original_class: d.class.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ClassMappingTable {
    fn default() -> Self {
        Self::standard()
    }
}
