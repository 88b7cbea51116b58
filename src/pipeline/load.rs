// src/pipeline/load.rs

use crate::error::Result;
use crate::models::{Config, Episode};
use crate::services::{NumberResolver, load_catalog};
use crate::utils::report;

/// Load the persisted catalog in episode order.
pub fn load_episodes(config: &Config) -> Result<Vec<Episode>> {
    let resolver = NumberResolver::new(&config.numbering.chapter_word)?;
    load_catalog(
        &config.paths.data_dir,
        &config.paths.metadata_ext,
        &resolver,
    )
}

/// Load the catalog and list it on the log stream.
pub fn run_load(config: &Config) -> Result<Vec<Episode>> {
    report::header("Episode catalog");
    let episodes = load_episodes(config)?;

    for episode in &episodes {
        log::info!("    {} [{}]", episode.title, episode.file);
    }
    log::info!(
        "Loaded {} episodes from {}",
        episodes.len(),
        config.paths.data_dir.display()
    );

    Ok(episodes)
}
