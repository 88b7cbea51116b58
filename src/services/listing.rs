// src/services/listing.rs

//! Listing page enumeration.
//!
//! Turns one catalog listing page into episode stubs: the detail page link
//! and the thumbnail of every matching item, in page order.

use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CompiledSelectors, EpisodeStub, SiteConfig};
use crate::utils::http::{Fetch, parse_html};
use crate::utils::resolve_url;

/// Fetches listing pages and yields their episode stubs.
pub struct ListingEnumerator<'a> {
    fetcher: &'a dyn Fetch,
    site: &'a SiteConfig,
    selectors: &'a CompiledSelectors,
    base_url: Url,
}

impl<'a> ListingEnumerator<'a> {
    pub fn new(
        fetcher: &'a dyn Fetch,
        site: &'a SiteConfig,
        selectors: &'a CompiledSelectors,
    ) -> Result<Self> {
        let base_url = Url::parse(&site.base_url)?;
        Ok(Self {
            fetcher,
            site,
            selectors,
            base_url,
        })
    }

    /// Fetch listing page `page` and return its stubs.
    ///
    /// Any fetch failure becomes [`AppError::PageUnavailable`]; the stubs of
    /// a page can only be produced again by fetching it again.
    pub async fn enumerate(&self, page: u32) -> Result<Vec<EpisodeStub>> {
        let url = self.site.page_url(page);
        let html = self
            .fetcher
            .get_text(&url)
            .await
            .map_err(|e| AppError::page_unavailable(page, &url, e))?;
        Ok(parse_listing(&html, self.selectors, &self.base_url))
    }
}

/// Extract the stubs from a listing page's HTML.
pub fn parse_listing(html: &str, selectors: &CompiledSelectors, base_url: &Url) -> Vec<EpisodeStub> {
    let document = parse_html(html);

    document
        .select(&selectors.listing_item)
        .filter_map(|item| {
            let href = item.value().attr(&selectors.link_attr)?.trim();
            if href.is_empty() {
                return None;
            }
            let image = item
                .select(&selectors.listing_image)
                .next()
                .and_then(|img| img.value().attr(&selectors.image_attr))
                .map(|src| resolve_url(base_url, src.trim()))
                .unwrap_or_default();

            Some(EpisodeStub {
                link: resolve_url(base_url, href),
                image,
            })
        })
        .collect()
}
