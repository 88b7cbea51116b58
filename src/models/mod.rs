// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod episode;
mod selectors;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, NumberingConfig, PAGE_PLACEHOLDER, PathsConfig, ServerConfig,
    SiteConfig,
};
pub use episode::{Episode, EpisodeStub};
pub use selectors::{CompiledSelectors, SiteSelectors, parse_selector};
