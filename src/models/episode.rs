//! Episode record and listing stub.

use serde::{Deserialize, Serialize};

/// A harvested episode, persisted as one sidecar file plus one media file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Episode {
    /// Heading of the detail page, often starting with the episode number
    pub title: String,

    /// Introductory text of the detail page
    pub description: String,

    /// Absolute URL of the media file
    pub link: String,

    /// Absolute URL of the thumbnail, taken from the listing page
    pub image: String,

    /// Local media file name, the last path segment of `link`
    pub file: String,

    /// Local sidecar file name; never serialized
    #[serde(skip)]
    pub metadata_file: String,
}

impl Episode {
    /// Start a record from a listing stub; only the thumbnail is known.
    pub fn from_stub(stub: &EpisodeStub) -> Self {
        Self {
            image: stub.image.clone(),
            ..Self::default()
        }
    }

    /// Whether both local file names have been derived.
    pub fn is_named(&self) -> bool {
        !self.file.is_empty() && !self.metadata_file.is_empty()
    }
}

/// An episode discovered on a listing page, before its detail page is visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeStub {
    /// Absolute URL of the detail page
    pub link: String,

    /// Absolute URL of the thumbnail
    pub image: String,
}
