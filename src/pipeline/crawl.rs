// src/pipeline/crawl.rs

//! Episode crawling pipeline.
//!
//! Walks listing pages `1..=pages`; for every stub on a page, visits the
//! detail page and persists the episode. Failures are isolated per page and
//! per episode: [`CrawlOutcome::record`] is where each one is logged and
//! counted, and nothing short of an unusable data directory stops the run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{CompiledSelectors, Config, Episode, EpisodeStub};
use crate::services::{DetailExtractor, EpisodeWriter, ListingEnumerator, MediaOutcome};
use crate::utils::http::Fetch;
use crate::utils::report;

/// What happened to one episode stub.
#[derive(Debug)]
pub enum EpisodeReport {
    /// Sidecar written; media fetched, skipped or failed
    Persisted { episode: Episode, media: MediaOutcome },

    /// Detail page could not be fetched; nothing persisted
    DetailFailed(AppError),

    /// No file name could be derived; nothing persisted
    Unnamed { episode: Episode, error: AppError },

    /// Sidecar could not be written
    PersistFailed(AppError),

    /// Not started because the crawl was cancelled
    Cancelled,
}

/// Summary of a crawl run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Persisted episodes in page-then-position order
    pub episodes: Vec<Episode>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages_total: usize,
    pub pages_visited: usize,
    pub page_failures: usize,
    pub episode_total: usize,
    pub detail_failures: usize,
    pub unnamed: usize,
    pub persist_failures: usize,
    pub downloads: usize,
    pub bytes_downloaded: u64,
    pub skipped: usize,
    pub download_failures: usize,
    pub cancelled: usize,
}

impl CrawlOutcome {
    /// Apply the skip-and-log policy to one episode report.
    pub fn record(&mut self, report: EpisodeReport) {
        match report {
            EpisodeReport::Persisted { episode, media } => {
                match media {
                    MediaOutcome::Downloaded { path, bytes } => {
                        self.downloads += 1;
                        self.bytes_downloaded += bytes;
                        log::info!("=> Downloaded {} ({} bytes)", path.display(), bytes);
                    }
                    MediaOutcome::Skipped { path, bytes } => {
                        self.skipped += 1;
                        log::info!(
                            "File {} already exists ({} bytes), skipping",
                            path.display(),
                            bytes
                        );
                    }
                    MediaOutcome::Failed(error) => {
                        self.download_failures += 1;
                        log::error!("Download failed for '{}': {}", episode.title, error);
                    }
                }
                self.episodes.push(episode);
            }
            EpisodeReport::DetailFailed(error) => {
                self.detail_failures += 1;
                log::warn!("{error}; skipping episode");
            }
            EpisodeReport::Unnamed { episode, error } => {
                self.unnamed += 1;
                log::warn!("{error}; '{}' not persisted", episode.title);
            }
            EpisodeReport::PersistFailed(error) => {
                self.persist_failures += 1;
                log::error!("{error}");
            }
            EpisodeReport::Cancelled => self.cancelled += 1,
        }
    }

    /// Key/value lines for the end-of-run summary.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        let elapsed = self.finished_at - self.started_at;
        vec![
            (
                "Pages",
                format!(
                    "{} of {} visited, {} unavailable",
                    self.pages_visited, self.pages_total, self.page_failures
                ),
            ),
            (
                "Episodes",
                format!("{} found, {} persisted", self.episode_total, self.episodes.len()),
            ),
            (
                "Downloads",
                format!("{} ({} bytes)", self.downloads, self.bytes_downloaded),
            ),
            ("Skipped", self.skipped.to_string()),
            (
                "Failures",
                format!(
                    "{} detail, {} unnamed, {} sidecar, {} download",
                    self.detail_failures, self.unnamed, self.persist_failures, self.download_failures
                ),
            ),
            ("Cancelled", self.cancelled.to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ]
    }
}

/// Drives listing enumeration, detail extraction and persistence.
pub struct Crawler {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetch>,
    selectors: CompiledSelectors,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn Fetch>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let selectors = config.selectors.compile()?;
        Ok(Self {
            config,
            fetcher,
            selectors,
            cancel,
        })
    }

    /// Crawl listing pages `1..=pages`.
    ///
    /// Episodes within a page run at most `crawler.max_concurrent` at a
    /// time; reports are consumed in listing order.
    pub async fn run(&self, pages: u32) -> Result<CrawlOutcome> {
        let data_dir = &self.config.paths.data_dir;
        tokio::fs::create_dir_all(data_dir).await.map_err(|e| {
            AppError::config(format!(
                "Cannot create data directory {}: {e}",
                data_dir.display()
            ))
        })?;

        let listing =
            ListingEnumerator::new(self.fetcher.as_ref(), &self.config.site, &self.selectors)?;
        let concurrency = self.config.crawler.max_concurrent.max(1);

        let mut outcome = CrawlOutcome {
            started_at: Utc::now(),
            pages_total: pages as usize,
            ..CrawlOutcome::default()
        };

        for page in 1..=pages {
            if self.cancel.is_cancelled() {
                log::warn!("Crawl cancelled before page {page}");
                break;
            }
            log::info!("Page {page} of {pages}");
            outcome.pages_visited += 1;

            let listed = tokio::select! {
                _ = self.cancel.cancelled() => {
                    log::warn!("Crawl cancelled while fetching page {page}");
                    break;
                }
                listed = listing.enumerate(page) => listed,
            };
            let stubs = match listed {
                Ok(stubs) => stubs,
                Err(error) => {
                    outcome.page_failures += 1;
                    log::warn!("{error}; skipping page");
                    continue;
                }
            };

            let total = stubs.len();
            outcome.episode_total += total;

            let mut reports = stream::iter(stubs.into_iter().enumerate())
                .map(|(index, stub)| self.process_episode(index + 1, total, stub))
                .buffered(concurrency);

            while let Some(report) = reports.next().await {
                outcome.record(report);
            }
        }

        outcome.finished_at = Utc::now();
        Ok(outcome)
    }

    async fn process_episode(
        &self,
        position: usize,
        total: usize,
        stub: EpisodeStub,
    ) -> EpisodeReport {
        if self.cancel.is_cancelled() {
            return EpisodeReport::Cancelled;
        }
        log::info!("[{position}/{total}] scraping {}", stub.link);

        let extractor = DetailExtractor::new(
            self.fetcher.as_ref(),
            &self.selectors,
            &self.config.paths.metadata_ext,
        );
        let extracted = match extractor.extract(&stub.link, Episode::from_stub(&stub)).await {
            Ok(extracted) => extracted,
            Err(error) => return EpisodeReport::DetailFailed(error),
        };

        let episode = extracted.episode;
        if !episode.is_named() {
            let error = extracted
                .link_error
                .unwrap_or_else(|| AppError::UnnameableLink(episode.link.clone()));
            return EpisodeReport::Unnamed { episode, error };
        }

        let writer = EpisodeWriter::new(self.fetcher.as_ref(), &self.config.paths.data_dir);
        match writer.persist(&episode).await {
            Ok(media) => EpisodeReport::Persisted { episode, media },
            Err(error) => EpisodeReport::PersistFailed(error),
        }
    }
}

/// Run the episode crawler and log a summary.
pub async fn run_crawler(
    config: Arc<Config>,
    fetcher: Arc<dyn Fetch>,
    pages: u32,
    cancel: CancellationToken,
) -> Result<CrawlOutcome> {
    report::header("Crawling episode catalog");
    log::info!(
        "Listing {} pages into {}",
        pages,
        config.paths.data_dir.display()
    );

    let crawler = Crawler::new(config, fetcher, cancel)?;
    let outcome = crawler.run(pages).await?;

    report::summary("Crawl", &outcome.summary_items());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteConfig;
    use crate::utils::http::testing::ScriptedFetcher;
    use tempfile::TempDir;

    const BASE: &str = "https://cat.example.com";

    fn config(data_dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.site = SiteConfig {
            listing_url: format!("{BASE}/list?p={{page}}"),
            base_url: BASE.to_string(),
            pages: 2,
        };
        config.paths.data_dir = data_dir.to_path_buf();
        config
    }

    fn listing(slugs: &[&str]) -> String {
        let items: String = slugs
            .iter()
            .map(|slug| {
                format!(
                    r#"<a class="F-capsaImatge" href="/ep/{slug}/"><img src="/img/{slug}.jpg"></a>"#
                )
            })
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    fn detail(title: &str, media_file: &str) -> String {
        format!(
            r#"<html><body><h1>{title}</h1>
               <p class="entradeta">Programa {title}</p>
               <div class="R-operatiu"><a href="//media.example.com/mp3/{media_file}">mp3</a></div>
               </body></html>"#
        )
    }

    fn fetcher_with_two_pages() -> ScriptedFetcher {
        // Page 1 is missing entirely; page 2 lists three episodes, one of
        // which has no detail page.
        ScriptedFetcher::new()
            .with_page(&format!("{BASE}/list?p=2"), &listing(&["e3", "e2", "e1"]))
            .with_page(&format!("{BASE}/ep/e3/"), &detail("3 - Tres", "ep_003.mp3"))
            .with_page(&format!("{BASE}/ep/e1/"), &detail("1 - U", "ep_001.mp3"))
            .with_media("https://media.example.com/mp3/ep_003.mp3", b"three")
            .with_media("https://media.example.com/mp3/ep_001.mp3", b"one")
    }

    fn file_names(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let config = Arc::new(config(tmp.path()));
        let fetcher = Arc::new(fetcher_with_two_pages());
        let crawler = Crawler::new(config, fetcher.clone(), CancellationToken::new()).unwrap();

        let outcome = crawler.run(2).await.unwrap();

        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(outcome.page_failures, 1);
        assert_eq!(outcome.episode_total, 3);
        assert_eq!(outcome.detail_failures, 1);
        assert_eq!(outcome.downloads, 2);
        assert_eq!(outcome.bytes_downloaded, 8);
        assert_eq!(
            file_names(tmp.path()),
            vec!["ep_001.json", "ep_001.mp3", "ep_003.json", "ep_003.mp3"]
        );

        let titles: Vec<_> = outcome.episodes.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["3 - Tres", "1 - U"]);
        assert_eq!(outcome.episodes[0].image, format!("{BASE}/img/e3.jpg"));
    }

    #[tokio::test]
    async fn test_rerun_skips_existing_media() {
        let tmp = TempDir::new().unwrap();
        let config = Arc::new(config(tmp.path()));
        let fetcher = Arc::new(fetcher_with_two_pages());
        let crawler = Crawler::new(config, fetcher.clone(), CancellationToken::new()).unwrap();

        crawler.run(2).await.unwrap();
        let second = crawler.run(2).await.unwrap();

        assert_eq!(second.downloads, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(fetcher.download_calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_episodes_keep_listing_order() {
        let tmp = TempDir::new().unwrap();
        let mut config = config(tmp.path());
        config.crawler.max_concurrent = 4;
        let fetcher = Arc::new(fetcher_with_two_pages());
        let crawler = Crawler::new(Arc::new(config), fetcher, CancellationToken::new()).unwrap();

        let outcome = crawler.run(2).await.unwrap();

        let files: Vec<_> = outcome.episodes.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["ep_003.mp3", "ep_001.mp3"]);
    }

    #[tokio::test]
    async fn test_unnameable_link_is_not_persisted() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with_page(&format!("{BASE}/list?p=1"), &listing(&["x"]))
                .with_page(
                    &format!("{BASE}/ep/x/"),
                    r#"<h1>9 - Nou</h1><div class="R-operatiu"><a href="https://media.example.com/">x</a></div>"#,
                ),
        );
        let crawler =
            Crawler::new(Arc::new(config(tmp.path())), fetcher, CancellationToken::new()).unwrap();

        let outcome = crawler.run(1).await.unwrap();

        assert_eq!(outcome.unnamed, 1);
        assert!(outcome.episodes.is_empty());
        assert!(file_names(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(fetcher_with_two_pages());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let crawler = Crawler::new(Arc::new(config(tmp.path())), fetcher.clone(), cancel).unwrap();

        let outcome = crawler.run(2).await.unwrap();

        assert_eq!(outcome.pages_visited, 0);
        assert_eq!(fetcher.page_calls(), 0);
    }

    /// Cancels the crawl when a given page is requested.
    struct CancelOnRequest {
        inner: ScriptedFetcher,
        trigger: String,
        cancel: CancellationToken,
    }

    #[async_trait::async_trait]
    impl Fetch for CancelOnRequest {
        async fn get_text(&self, url: &str) -> Result<String> {
            if url == self.trigger {
                self.cancel.cancel();
            }
            self.inner.get_text(url).await
        }

        async fn download(&self, url: &str, dest: &mut tokio::fs::File) -> Result<u64> {
            self.inner.download(url, dest).await
        }
    }

    #[tokio::test]
    async fn test_cancel_mid_crawl_finishes_in_flight_episode() {
        let tmp = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let fetcher = Arc::new(CancelOnRequest {
            inner: ScriptedFetcher::new()
                .with_page(&format!("{BASE}/list?p=1"), &listing(&["e1", "e2"]))
                .with_page(&format!("{BASE}/list?p=2"), &listing(&["e3"]))
                .with_page(&format!("{BASE}/ep/e1/"), &detail("1 - U", "ep_001.mp3"))
                .with_page(&format!("{BASE}/ep/e2/"), &detail("2 - Dos", "ep_002.mp3"))
                .with_media("https://media.example.com/mp3/ep_001.mp3", b"one")
                .with_media("https://media.example.com/mp3/ep_002.mp3", b"two"),
            trigger: format!("{BASE}/ep/e1/"),
            cancel: cancel.clone(),
        });
        let crawler = Crawler::new(Arc::new(config(tmp.path())), fetcher.clone(), cancel).unwrap();

        let outcome = crawler.run(2).await.unwrap();

        assert_eq!(outcome.pages_visited, 1);
        assert_eq!(outcome.episode_total, 2);
        assert_eq!(outcome.episodes.len(), 1);
        assert_eq!(outcome.downloads, 1);
        assert_eq!(outcome.cancelled, 1);
        assert_eq!(file_names(tmp.path()), vec!["ep_001.json", "ep_001.mp3"]);
        assert_eq!(
            fetcher.inner.requested(),
            vec![
                format!("{BASE}/list?p=1"),
                format!("{BASE}/ep/e1/"),
                "https://media.example.com/mp3/ep_001.mp3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_unusable_data_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let fetcher = Arc::new(fetcher_with_two_pages());
        let crawler = Crawler::new(
            Arc::new(config(&blocker.join("data"))),
            fetcher,
            CancellationToken::new(),
        )
        .unwrap();

        let result = crawler.run(2).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_record_counts_media_outcomes() {
        let mut outcome = CrawlOutcome::default();
        outcome.record(EpisodeReport::Persisted {
            episode: Episode::default(),
            media: MediaOutcome::Failed(AppError::fetch("https://x", "boom")),
        });
        outcome.record(EpisodeReport::Cancelled);

        assert_eq!(outcome.download_failures, 1);
        assert_eq!(outcome.cancelled, 1);
        assert_eq!(outcome.episodes.len(), 1);
    }
}
