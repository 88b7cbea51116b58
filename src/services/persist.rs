// src/services/persist.rs

//! Episode persistence.
//!
//! Each episode becomes a JSON sidecar plus its media file, both stored
//! flat in the data directory:
//!
//! ```text
//! {data_dir}/
//! ├── en_guardia_012.json   # sidecar, rewritten on every run
//! └── en_guardia_012.mp3    # media, fetched only when missing or empty
//! ```
//!
//! The exists-and-non-empty check is not atomic with the download that
//! follows it. Two runs sharing a data directory may both fetch the same
//! file.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Episode;
use crate::utils::http::Fetch;

/// What happened to an episode's media file.
#[derive(Debug)]
pub enum MediaOutcome {
    /// The file was fetched
    Downloaded { path: PathBuf, bytes: u64 },

    /// A non-empty file was already present; no request was made
    Skipped { path: PathBuf, bytes: u64 },

    /// Fetch or copy failed; an empty or partial file may remain
    Failed(AppError),
}

/// Writes sidecars and media files into one data directory.
pub struct EpisodeWriter<'a> {
    fetcher: &'a dyn Fetch,
    data_dir: &'a Path,
}

impl<'a> EpisodeWriter<'a> {
    pub fn new(fetcher: &'a dyn Fetch, data_dir: &'a Path) -> Self {
        Self { fetcher, data_dir }
    }

    /// Persist one episode.
    ///
    /// Sidecar failures are returned as errors. Media failures are reported
    /// through [`MediaOutcome::Failed`] since the sidecar is already written.
    pub async fn persist(&self, episode: &Episode) -> Result<MediaOutcome> {
        if !episode.is_named() {
            return Err(AppError::UnnameableLink(episode.link.clone()));
        }

        let sidecar = self.data_dir.join(&episode.metadata_file);
        self.write_sidecar(&sidecar, episode)
            .await
            .map_err(|e| AppError::persistence(&sidecar, e))?;
        log::debug!("Wrote sidecar {}", sidecar.display());

        let media = self.data_dir.join(&episode.file);
        Ok(self.fetch_media(&episode.link, media).await)
    }

    /// Write the sidecar through a temporary file, replacing any previous one.
    async fn write_sidecar(&self, path: &Path, episode: &Episode) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(episode)?;

        let tmp = temp_path(path);
        let mut file = File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn fetch_media(&self, link: &str, path: PathBuf) -> MediaOutcome {
        if let Some(bytes) = existing_size(&path).await {
            return MediaOutcome::Skipped { path, bytes };
        }

        let mut file = match File::create(&path).await {
            Ok(file) => file,
            Err(e) => return MediaOutcome::Failed(AppError::copy(&path, e)),
        };

        match self.fetcher.download(link, &mut file).await {
            Ok(bytes) => MediaOutcome::Downloaded { path, bytes },
            Err(AppError::Io(e)) => MediaOutcome::Failed(AppError::copy(&path, e)),
            Err(e @ AppError::Fetch { .. }) => MediaOutcome::Failed(e),
            Err(e) => MediaOutcome::Failed(AppError::fetch(link, e)),
        }
    }
}

/// Size of a regular, non-empty file at `path`.
async fn existing_size(path: &Path) -> Option<u64> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    (meta.is_file() && meta.len() > 0).then_some(meta.len())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
