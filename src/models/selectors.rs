// src/models/selectors.rs

//! CSS selectors for scraping listing and detail pages.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors describing the catalog site's markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSelectors {
    /// Selector for each thumbnail link on a listing page
    #[serde(default = "defaults::listing_item")]
    pub listing_item: String,

    /// Selector for the thumbnail image inside a listing item
    #[serde(default = "defaults::listing_image")]
    pub listing_image: String,

    /// Selector for the element carrying the media link on a detail page
    #[serde(default = "defaults::detail_link")]
    pub detail_link: String,

    /// Selector for the descriptive block on a detail page
    #[serde(default = "defaults::detail_description")]
    pub detail_description: String,

    /// Selector for the heading on a detail page
    #[serde(default = "defaults::detail_title")]
    pub detail_title: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// HTML attribute name for extracting image sources (usually "src")
    #[serde(default = "defaults::image_attr")]
    pub image_attr: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            listing_item: defaults::listing_item(),
            listing_image: defaults::listing_image(),
            detail_link: defaults::detail_link(),
            detail_description: defaults::detail_description(),
            detail_title: defaults::detail_title(),
            link_attr: defaults::link_attr(),
            image_attr: defaults::image_attr(),
        }
    }
}

impl SiteSelectors {
    /// Parse every selector once, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            listing_item: parse_selector(&self.listing_item)?,
            listing_image: parse_selector(&self.listing_image)?,
            detail_link: parse_selector(&self.detail_link)?,
            detail_description: parse_selector(&self.detail_description)?,
            detail_title: parse_selector(&self.detail_title)?,
            link_attr: self.link_attr.clone(),
            image_attr: self.image_attr.clone(),
        })
    }
}

/// Parsed form of [`SiteSelectors`].
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub listing_item: Selector,
    pub listing_image: Selector,
    pub detail_link: Selector,
    pub detail_description: Selector,
    pub detail_title: Selector,
    pub link_attr: String,
    pub image_attr: String,
}

/// Parse a CSS selector string.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn listing_item() -> String {
        ".F-capsaImatge".into()
    }
    pub fn listing_image() -> String {
        "img".into()
    }
    pub fn detail_link() -> String {
        ".R-operatiu a".into()
    }
    pub fn detail_description() -> String {
        ".entradeta".into()
    }
    pub fn detail_title() -> String {
        "h1".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }
    pub fn image_attr() -> String {
        "src".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector(".R-operatiu a").is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }

    #[test]
    fn test_default_selectors_compile() {
        assert!(SiteSelectors::default().compile().is_ok());
    }
}
