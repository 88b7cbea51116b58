// src/services/detail.rs

//! Episode detail extraction.
//!
//! Visits one episode page and fills in the record's title, description,
//! media link and derived file names. Every field takes the first matching
//! element on the page; later matches are ignored.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CompiledSelectors, Episode};
use crate::services::naming::canonical_names;
use crate::utils::http::{Fetch, parse_html};
use crate::utils::resolve_url;

/// Result of extracting one detail page.
#[derive(Debug)]
pub struct Extracted {
    pub episode: Episode,

    /// Set when the media link exists but no file name could be derived
    pub link_error: Option<AppError>,
}

/// Fetches episode pages and extracts their fields.
pub struct DetailExtractor<'a> {
    fetcher: &'a dyn Fetch,
    selectors: &'a CompiledSelectors,
    metadata_ext: &'a str,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(
        fetcher: &'a dyn Fetch,
        selectors: &'a CompiledSelectors,
        metadata_ext: &'a str,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            metadata_ext,
        }
    }

    /// Fetch `url` and populate `episode` from it.
    pub async fn extract(&self, url: &str, episode: Episode) -> Result<Extracted> {
        let page_url = Url::parse(url).map_err(|e| AppError::detail_unavailable(url, e))?;
        let html = self
            .fetcher
            .get_text(url)
            .await
            .map_err(|e| AppError::detail_unavailable(url, e))?;
        Ok(extract_detail(
            &html,
            &page_url,
            self.selectors,
            self.metadata_ext,
            episode,
        ))
    }
}

/// Populate `episode` from a detail page's HTML.
pub fn extract_detail(
    html: &str,
    page_url: &Url,
    selectors: &CompiledSelectors,
    metadata_ext: &str,
    mut episode: Episode,
) -> Extracted {
    let document = parse_html(html);
    let mut link_error = None;

    if let Some(href) = first_match(&document, &selectors.detail_link)
        .and_then(|el| el.value().attr(&selectors.link_attr))
        .map(str::trim)
        .filter(|href| !href.is_empty())
    {
        episode.link = resolve_url(page_url, href);
        match canonical_names(&episode.link, metadata_ext) {
            Ok(names) => {
                episode.file = names.media_file;
                episode.metadata_file = names.metadata_file;
            }
            Err(e) => link_error = Some(e),
        }
    }

    if let Some(el) = first_match(&document, &selectors.detail_description) {
        episode.description = element_text(el);
    }

    if let Some(el) = first_match(&document, &selectors.detail_title) {
        episode.title = element_text(el);
    }

    Extracted {
        episode,
        link_error,
    }
}

/// All matches in document order, reduced to the first one.
fn first_match<'d>(document: &'d Html, selector: &Selector) -> Option<ElementRef<'d>> {
    document.select(selector).next()
}

/// Element text with surrounding whitespace trimmed; inner line breaks kept.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
