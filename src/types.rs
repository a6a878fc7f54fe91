// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub taxonomy: TaxonomyConfig,
    pub prune: PruneConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

/// Class/attribute taxonomies the predicate rules are keyed on.
///
/// Unknown classes fall through to the generic spatial rules only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Hand-carried weapon classes. Excluded from the spatial axes and from
    /// the critical chains; objects of "holding".
    pub portables: Vec<String>,
    /// Door/window classes. Excluded from the spatial axes; subjects of
    /// "located in".
    pub openings: Vec<String>,
    /// Classes a person can ride. Matched against the last whitespace token
    /// of the object class (e.g. "Destroyed MBT" -> "MBT").
    pub vehicles: Vec<String>,
    /// Substring marking personnel classes (e.g. "Infantry", "Sniper Infantry").
    pub personnel_marker: String,
    /// The building class name.
    pub building_class: String,
    /// Primary attribute value marking an airborne object.
    pub flying_attribute: String,
    /// Leading attribute token of a single-story building ("One" in "One-story").
    pub single_story_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    /// Hard cap on triples per image. Critical chain edges are never removed,
    /// so an image whose chains alone exceed the cap stays oversized.
    pub max_triples: usize,
    /// Base RNG seed. Each image derives its own stream from seed + image_id;
    /// unset means non-reproducible OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Dataset root. The newest *.json under `<root>/json/` is processed.
    pub root_dir: String,
    /// File name for the ambiguity report.
    pub ambiguity_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            portables: vec![
                "Rifle".into(),
                "Machine Gun".into(),
                "Sniper Rifle".into(),
                "Grenade Launcher".into(),
                "MANPATS".into(),
                "MANPADS".into(),
            ],
            openings: vec!["Door".into(), "Window".into()],
            vehicles: vec![
                "MBT".into(),
                "Vehicle".into(),
                "Artillery".into(),
                "MLRS".into(),
                "LUV".into(),
                "Truck".into(),
            ],
            personnel_marker: "Infantry".into(),
            building_class: "Building".into(),
            flying_attribute: "Flying".into(),
            single_story_marker: "One".into(),
        }
    }
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            max_triples: 30,
            seed: None,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root_dir: "./Dataset".into(),
            ambiguity_file: "ambiguities.json".into(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "scene_graph_gen=info".into(),
        }
    }
}
