// src/records.rs
//
// Wire model for the dataset JSON. One record per image; `objects` stay raw
// JSON values so a single malformed object can be skipped without failing
// the image, and so fields this tool does not know about survive a re-save.
// The generator only ever rewrites `scene_graph.triples`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image: ImageInfo,
    pub scene_graph: SceneGraphData,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub image_id: i64,
    pub image_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraphData {
    pub objects: Vec<Value>,
    /// Fully replaced on every run; any triples present on input are discarded.
    #[serde(default)]
    pub triples: Vec<Triple>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A detection, parsed out of one entry of `scene_graph.objects`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectedObject {
    pub object_id: u32,
    pub class: String,
    #[serde(default)]
    pub attribute: Vec<String>,
    /// Normalized (x_center, y_center, width, height), y from the top.
    pub bounding_box: [f64; 4],
}

impl DetectedObject {
    /// Index 0 is the only semantically significant attribute slot
    /// ("Flying", "Three-story"); the rest are auxiliary tags.
    pub fn primary_attribute(&self) -> Option<&str> {
        self.attribute.first().map(String::as_str)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let object: DetectedObject = serde_json::from_value(value.clone())
            .context("object entry does not match the detection schema")?;
        if object.bounding_box.iter().any(|v| !v.is_finite()) {
            anyhow::bail!("object {} has a non-finite bounding box", object.object_id);
        }
        Ok(object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject_id: u32,
    pub predicate: String,
    pub object_id: u32,
}

/// One entry of the ambiguity report: `{"image <id>": [sorted predicates]}`.
pub type AmbiguityRecord = BTreeMap<String, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object() {
        let value = json!({
            "object_id": 3,
            "class": "MBT",
            "attribute": ["Destroyed"],
            "bounding_box": [0.5, 0.5, 0.3, 0.3]
        });
        let object = DetectedObject::from_value(&value).unwrap();
        assert_eq!(object.object_id, 3);
        assert_eq!(object.primary_attribute(), Some("Destroyed"));
    }

    #[test]
    fn test_missing_attribute_defaults_empty() {
        let value = json!({
            "object_id": 1,
            "class": "Truck",
            "bounding_box": [0.1, 0.2, 0.05, 0.05]
        });
        let object = DetectedObject::from_value(&value).unwrap();
        assert!(object.attribute.is_empty());
        assert_eq!(object.primary_attribute(), None);
    }

    #[test]
    fn test_wrong_arity_bbox_rejected() {
        let value = json!({
            "object_id": 1,
            "class": "Truck",
            "attribute": [],
            "bounding_box": [0.1, 0.2, 0.05]
        });
        assert!(DetectedObject::from_value(&value).is_err());
    }

    #[test]
    fn test_non_numeric_bbox_rejected() {
        let value = json!({
            "object_id": 1,
            "class": "Truck",
            "attribute": [],
            "bounding_box": [0.1, "oops", 0.05, 0.05]
        });
        assert!(DetectedObject::from_value(&value).is_err());
    }

    #[test]
    fn test_record_roundtrip_preserves_unknown_fields() {
        let raw = json!({
            "image": { "image_id": 7, "image_name": "img_007.png", "sensor": "EO" },
            "scene_graph": {
                "objects": [{ "object_id": 0, "class": "MBT", "attribute": [],
                              "bounding_box": [0.5, 0.5, 0.1, 0.1], "confidence": 0.93 }],
                "triples": []
            }
        });
        let record: ImageRecord = serde_json::from_value(raw).unwrap();
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["image"]["sensor"], "EO");
        assert_eq!(back["scene_graph"]["objects"][0]["confidence"], 0.93);
    }
}
