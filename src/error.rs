// src/error.rs

//! Unified error handling for the harvester.
//!
//! Infrastructure failures wrap their source crates; the domain variants
//! describe what went wrong for one page or one episode so the crawl
//! pipeline can decide, in one place, whether to skip and continue.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Listing page could not be fetched
    #[error("Listing page {page} unavailable ({url}): {message}")]
    PageUnavailable {
        page: u32,
        url: String,
        message: String,
    },

    /// Episode detail page could not be fetched
    #[error("Detail page unavailable ({url}): {message}")]
    DetailUnavailable { url: String, message: String },

    /// No file name can be derived from a media link
    #[error("Cannot derive a file name from link '{0}'")]
    UnnameableLink(String),

    /// No ordering number in title or description
    #[error("No episode number found in '{title}'")]
    NotResolvable { title: String },

    /// Sidecar metadata could not be written
    #[error("Failed to persist {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    /// Media request failed or returned a non-success status
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Media body could not be copied to disk
    #[error("Failed to copy into {path}: {message}")]
    Copy { path: PathBuf, message: String },

    /// Sidecar file could not be read or parsed
    #[error("Malformed sidecar {path}: {message}")]
    MalformedSidecar { path: PathBuf, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn page_unavailable(page: u32, url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::PageUnavailable {
            page,
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn detail_unavailable(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::DetailUnavailable {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn persistence(path: &Path, message: impl fmt::Display) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn copy(path: &Path, message: impl fmt::Display) -> Self {
        Self::Copy {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn malformed_sidecar(path: &Path, message: impl fmt::Display) -> Self {
        Self::MalformedSidecar {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_unavailable_message() {
        let err = AppError::page_unavailable(3, "https://example.com/?p=3", "timed out");
        assert_eq!(
            err.to_string(),
            "Listing page 3 unavailable (https://example.com/?p=3): timed out"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
