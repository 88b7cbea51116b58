//! Episode number resolution.
//!
//! Recovers an ordering key from an episode's free-text fields: a number at
//! the start of the title, or failing that a "<word> <digits>" phrase in
//! the description.

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::Episode;

/// Extracts episode numbers from titles and descriptions.
#[derive(Debug, Clone)]
pub struct NumberResolver {
    chapter: Regex,
}

impl NumberResolver {
    /// Build a resolver for descriptions that mention `chapter_word <n>`.
    pub fn new(chapter_word: &str) -> Result<Self> {
        let pattern = format!(r"{} (\d+)", regex::escape(chapter_word.trim()));
        let chapter = Regex::new(&pattern)
            .map_err(|e| AppError::config(format!("Invalid chapter word '{chapter_word}': {e}")))?;
        Ok(Self { chapter })
    }

    /// Resolve the episode number; the title wins over the description.
    pub fn resolve(&self, episode: &Episode) -> Result<u64> {
        leading_number(&episode.title)
            .or_else(|| self.chapter_number(&episode.description))
            .ok_or_else(|| AppError::NotResolvable {
                title: episode.title.clone(),
            })
    }

    fn chapter_number(&self, description: &str) -> Option<u64> {
        let caps = self.chapter.captures(description)?;
        caps.get(1)?
            .as_str()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
    }
}

/// Strictly positive integer at the start of `text`, ignoring leading whitespace.
fn leading_number(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse::<u64>().ok().filter(|n| *n > 0)
}
