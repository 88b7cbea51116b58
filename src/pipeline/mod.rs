//! Pipeline entry points.
//!
//! - `run_crawler`: Harvest listing pages into the data directory
//! - `run_load`: Rebuild the ordered catalog from persisted sidecars
//! - `run_server`: Present the catalog over HTTP

pub mod crawl;
pub mod load;
#[cfg(feature = "serve")]
pub mod serve;

pub use crawl::{CrawlOutcome, Crawler, EpisodeReport, run_crawler};
pub use load::{load_episodes, run_load};
#[cfg(feature = "serve")]
pub use serve::run_server;
