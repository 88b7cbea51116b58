//! Service layer for the harvester.
//!
//! This module contains the building blocks of the crawl pipeline:
//! - Listing page enumeration (`ListingEnumerator`)
//! - Episode detail extraction (`DetailExtractor`)
//! - Sidecar and media persistence (`EpisodeWriter`)
//! - File naming (`canonical_names`) and episode numbering (`NumberResolver`)
//! - Catalog reconstruction (`load_catalog`)

pub mod catalog;
pub mod detail;
pub mod listing;
pub mod naming;
pub mod numbering;
pub mod persist;

pub use catalog::{load_catalog, read_sidecar};
pub use detail::{DetailExtractor, Extracted};
pub use listing::ListingEnumerator;
pub use naming::{CanonicalNames, canonical_names};
pub use numbering::NumberResolver;
pub use persist::{EpisodeWriter, MediaOutcome};
