// src/services/catalog.rs

//! Catalog loading.
//!
//! Rebuilds the episode list from the sidecars under a data directory and
//! orders it by episode number.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{AppError, Result};
use crate::models::Episode;
use crate::services::numbering::NumberResolver;

/// Load every sidecar under `dir`, ordered by episode number.
///
/// Unreadable or unparsable sidecars are logged and skipped. Episodes
/// without a number come last, in directory-walk order.
pub fn load_catalog(dir: &Path, metadata_ext: &str, resolver: &NumberResolver) -> Result<Vec<Episode>> {
    let ext = metadata_ext.trim_start_matches('.');
    let mut keyed = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(AppError::Io(e.into())),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != ext) {
            continue;
        }

        match read_sidecar(path) {
            Ok(episode) => {
                let number = resolver.resolve(&episode).ok();
                if number.is_none() {
                    log::debug!("No episode number for {}", path.display());
                }
                keyed.push((number, episode));
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    // Stable: unnumbered episodes keep their walk order.
    keyed.sort_by_key(|(number, _)| match number {
        Some(n) => (false, *n),
        None => (true, 0),
    });

    Ok(keyed.into_iter().map(|(_, episode)| episode).collect())
}

/// Read one sidecar file.
pub fn read_sidecar(path: &Path) -> Result<Episode> {
    let content =
        std::fs::read_to_string(path).map_err(|e| AppError::malformed_sidecar(path, e))?;
    serde_json::from_str(&content).map_err(|e| AppError::malformed_sidecar(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::persist::EpisodeWriter;
    use crate::utils::http::testing::ScriptedFetcher;
    use tempfile::TempDir;

    fn resolver() -> NumberResolver {
        NumberResolver::new("Capítol").unwrap()
    }

    fn write_sidecar(dir: &Path, name: &str, title: &str, description: &str) {
        let episode = Episode {
            title: title.to_string(),
            description: description.to_string(),
            file: format!("{name}.mp3"),
            ..Episode::default()
        };
        std::fs::write(
            dir.join(format!("{name}.json")),
            serde_json::to_vec_pretty(&episode).unwrap(),
        )
        .unwrap();
    }

    fn titles(episodes: &[Episode]) -> Vec<&str> {
        episodes.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_orders_by_number_with_unresolved_last() {
        let tmp = TempDir::new().unwrap();
        write_sidecar(tmp.path(), "a", "5 - Cinc", "");
        write_sidecar(tmp.path(), "b", "Especial", "sense número");
        write_sidecar(tmp.path(), "c", "1 - U", "");
        write_sidecar(tmp.path(), "d", "El tres", "Capítol 3 de la sèrie");

        let episodes = load_catalog(tmp.path(), "json", &resolver()).unwrap();

        assert_eq!(titles(&episodes), vec!["1 - U", "El tres", "5 - Cinc", "Especial"]);
    }

    #[test]
    fn test_unresolved_keep_walk_order() {
        let tmp = TempDir::new().unwrap();
        write_sidecar(tmp.path(), "z", "Zeta", "");
        write_sidecar(tmp.path(), "a", "Alfa", "");
        write_sidecar(tmp.path(), "m", "2 - Dos", "");

        let episodes = load_catalog(tmp.path(), "json", &resolver()).unwrap();

        assert_eq!(titles(&episodes), vec!["2 - Dos", "Alfa", "Zeta"]);
    }

    #[test]
    fn test_malformed_and_foreign_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write_sidecar(tmp.path(), "ok", "7 - Set", "");
        std::fs::write(tmp.path().join("broken.json"), b"{ not json").unwrap();
        std::fs::write(tmp.path().join("list.json"), b"[1, 2, 3]").unwrap();
        std::fs::write(tmp.path().join("ok.mp3"), b"audio").unwrap();

        let episodes = load_catalog(tmp.path(), "json", &resolver()).unwrap();

        assert_eq!(titles(&episodes), vec!["7 - Set"]);
    }

    #[test]
    fn test_walks_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("2023");
        std::fs::create_dir(&nested).unwrap();
        write_sidecar(&nested, "old", "3 - Tres", "");
        write_sidecar(tmp.path(), "new", "4 - Quatre", "");

        let episodes = load_catalog(tmp.path(), ".json", &resolver()).unwrap();

        assert_eq!(titles(&episodes), vec!["3 - Tres", "4 - Quatre"]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_catalog(&tmp.path().join("nope"), "json", &resolver());
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[tokio::test]
    async fn test_round_trip_through_writer() {
        let tmp = TempDir::new().unwrap();
        let original = Episode {
            title: "9 - Nou \"cometes\"".to_string(),
            description: "Capítol 9: l'últim\nàudio".to_string(),
            link: "https://media.example.com/a/ep_009.mp3".to_string(),
            image: "https://img.example.com/9.jpg".to_string(),
            file: "ep_009.mp3".to_string(),
            metadata_file: "ep_009.json".to_string(),
        };
        std::fs::write(tmp.path().join("ep_009.mp3"), b"audio").unwrap();

        let fetcher = ScriptedFetcher::new();
        EpisodeWriter::new(&fetcher, tmp.path())
            .persist(&original)
            .await
            .unwrap();

        let loaded = load_catalog(tmp.path(), "json", &resolver()).unwrap();

        assert_eq!(loaded.len(), 1);
        let expected = Episode {
            metadata_file: String::new(),
            ..original
        };
        assert_eq!(loaded[0], expected);
    }
}
