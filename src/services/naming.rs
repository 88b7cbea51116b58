//! Canonical local file names derived from a media link.

use url::Url;

use crate::error::{AppError, Result};

/// Local names for one episode's media file and sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalNames {
    /// Last path segment of the link, extension included
    pub media_file: String,

    /// Media file name up to its first `.`, plus the metadata extension
    pub metadata_file: String,
}

/// Derive the media and sidecar file names for `link`.
///
/// The media name is the link's last path segment (percent-decoded); the
/// sidecar name is everything before its first `.` followed by
/// `.{metadata_ext}`.
pub fn canonical_names(link: &str, metadata_ext: &str) -> Result<CanonicalNames> {
    let unnameable = || AppError::UnnameableLink(link.to_string());

    let url = Url::parse(link).map_err(|_| unnameable())?;
    let raw = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(unnameable)?;

    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    // An escaped separator must not smuggle a directory into the name.
    let media_file = decoded
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string();
    if media_file.is_empty() || media_file == "." || media_file == ".." {
        return Err(unnameable());
    }

    let stem = media_file.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        return Err(unnameable());
    }
    let metadata_file = format!("{stem}.{}", metadata_ext.trim_start_matches('.'));

    Ok(CanonicalNames {
        media_file,
        metadata_file,
    })
}
