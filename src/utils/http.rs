// src/utils/http.rs

//! HTTP client utilities.
//!
//! Services talk to the network through the [`Fetch`] trait so the crawl
//! pipeline can run against canned pages in tests.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::redirect::Policy;
use scraper::Html;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Network access used by the crawl pipeline.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a page body as text. Non-success statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// Stream a resource into `dest`, returning the number of bytes written.
    ///
    /// Request and status failures are reported as [`AppError::Fetch`];
    /// failures while reading the body or writing the file as [`AppError::Io`].
    async fn download(&self, url: &str, dest: &mut File) -> Result<u64>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(redirect_policy(config.max_redirects))
        .build()?;
    Ok(client)
}

/// Follow `Location` targets as the server sent them.
///
/// `url` keeps existing percent-escapes intact when parsing, so the literal
/// request path survives the hop instead of being re-escaped. `previous()`
/// includes the original request, so it holds the hop count.
fn redirect_policy(max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(format!("too many redirects (> {max_redirects})"));
        }
        log::debug!("Following redirect to {}", attempt.url());
        attempt.follow()
    })
}

/// Parse an HTML document.
pub fn parse_html(text: &str) -> Html {
    Html::parse_document(text)
}

/// [`Fetch`] implementation backed by reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    download_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }

    async fn download(&self, url: &str, dest: &mut File) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(url, e))?;

        let mut body = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(std::io::Error::other)?;
            dest.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        dest.flush().await?;
        Ok(written)
    }
}
