// src/main.rs

mod assembler;
mod config;
mod critical_chain;
mod dataset;
mod geometry;
mod predicates;
mod processor;
mod pruner;
mod records;
mod types;

use anyhow::Result;
use chrono::Local;
use processor::SceneGraphProcessor;
use std::path::Path;
use tracing::info;
use types::Config;

fn main() -> Result<()> {
    let config = Config::load_or_default("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.level))
        .init();

    info!("Scene graph generation starting");
    info!(
        "Prune budget: {} triples, seed: {:?}",
        config.prune.max_triples, config.prune.seed
    );

    let dataset_root = std::env::var("SCENE_GRAPH_DATASET")
        .unwrap_or_else(|_| config.dataset.root_dir.clone());
    let input_path = dataset::find_latest_collection(Path::new(&dataset_root))?;

    let mut records = dataset::load_records(&input_path)?;
    info!(
        "Loaded {} image records from {}",
        records.len(),
        input_path.display()
    );

    let processor = SceneGraphProcessor::new(&config);
    let ambiguities = processor.process_collection(&mut records);

    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let graph_path = dataset::stamp_path(&input_path, &stamp);
    dataset::save_records(&graph_path, &records)?;

    let ambiguity_path = input_path
        .with_file_name(dataset::stamp_file_name(&config.dataset.ambiguity_file, &stamp));
    dataset::save_ambiguities(&ambiguity_path, &ambiguities)?;

    info!("✓ Done");
    Ok(())
}
