// src/config.rs

use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {path}"))?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to the built-in
    /// defaults (the reference taxonomy and a 30-triple budget).
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::Config;

    #[test]
    fn test_defaults_carry_reference_taxonomy() {
        let config = Config::default();
        assert!(config.taxonomy.portables.contains(&"Rifle".to_string()));
        assert!(config.taxonomy.openings.contains(&"Window".to_string()));
        assert!(config.taxonomy.vehicles.contains(&"MBT".to_string()));
        assert_eq!(config.taxonomy.personnel_marker, "Infantry");
        assert_eq!(config.prune.max_triples, 30);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("prune:\n  max_triples: 10\n").unwrap();
        assert_eq!(config.prune.max_triples, 10);
        assert_eq!(config.taxonomy.building_class, "Building");
    }
}
