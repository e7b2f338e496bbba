//! Release tag filtering.
//!
//! Registries publish many tags that are not installable releases: mutable
//! aliases (`latest`), pre-releases, per-architecture duplicates of the
//! multi-arch tag, and branch builds. [`TagFilter`] keeps only the tags that
//! are worth ranking.

use crate::config::FilterConfig;
use std::fmt;


/// Why a tag was not considered a release candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The mutable `latest` alias.
    Latest,
    /// Contains a pre-release or unstable-channel word.
    ExcludedWord(String),
    /// Contains the development word and the repository has no exception.
    Development,
    /// Ends with an architecture suffix such as `-amd64`.
    ArchitectureSuffix(String),
    /// Does not start with a digit (after an optional `v`).
    NotVersionLike,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "mutable alias"),
            Self::ExcludedWord(word) => write!(f, "contains '{}'", word),
            Self::Development => write!(f, "development build"),
            Self::ArchitectureSuffix(suffix) => write!(f, "architecture variant '{}'", suffix),
            Self::NotVersionLike => write!(f, "not version-like"),
        }
    }
}

/// Classifies raw tags as release candidates or noise.
#[derive(Debug, Clone)]
pub struct TagFilter {
    excluded_words: Vec<String>,
    dev_word: String,
    dev_allowed_repositories: Vec<String>,
    arch_suffixes: Vec<String>,
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl TagFilter {
    /// Builds a filter from configuration. Words are matched case-insensitively.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            excluded_words: config
                .excluded_words
                .iter()
                .map(|w| w.to_ascii_lowercase())
                .collect(),
            dev_word: config.dev_word.to_ascii_lowercase(),
            dev_allowed_repositories: config.dev_allowed_repositories.clone(),
            arch_suffixes: config.arch_suffixes.clone(),
        }
    }

    /// Returns the first rule that rejects `tag`, or `None` if it is a candidate.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagpin::filter::{Rejection, TagFilter};
    ///
    /// let filter = TagFilter::default();
    /// assert_eq!(filter.rejection("latest", "redis"), Some(Rejection::Latest));
    /// assert_eq!(filter.rejection("0.4.18-develop", "readarr"), None);
    /// assert_eq!(filter.rejection("0.4.18-develop", "sonarr"), Some(Rejection::Development));
    /// ```
    pub fn rejection(&self, tag: &str, repository: &str) -> Option<Rejection> {
        if tag == "latest" {
            return Some(Rejection::Latest);
        }

        let lowered = tag.to_ascii_lowercase();
        if let Some(word) = self.excluded_words.iter().find(|w| lowered.contains(w.as_str())) {
            return Some(Rejection::ExcludedWord(word.clone()));
        }

        if !self.dev_word.is_empty()
            && lowered.contains(&self.dev_word)
            && !self.dev_allowed_repositories.iter().any(|r| r == repository)
        {
            return Some(Rejection::Development);
        }

        if let Some(suffix) = self.arch_suffixes.iter().find(|s| tag.ends_with(s.as_str())) {
            return Some(Rejection::ArchitectureSuffix(suffix.clone()));
        }

        if !is_version_like(tag) {
            return Some(Rejection::NotVersionLike);
        }

        None
    }

    /// Returns true if `tag` is a release candidate for `repository`.
    pub fn accepts(&self, tag: &str, repository: &str) -> bool {
        self.rejection(tag, repository).is_none()
    }

    /// Keeps the release candidates, preserving input order.
    pub fn filter<'a, T: AsRef<str>>(&self, tags: &'a [T], repository: &str) -> Vec<&'a T> {
        tags.iter()
            .filter(|tag| match self.rejection(tag.as_ref(), repository) {
                Some(reason) => {
                    tracing::trace!(tag = tag.as_ref(), repository, %reason, "tag rejected");
                    false
                }
                None => true,
            })
            .collect()
    }
}

/// Returns true when the tag starts with a digit, ignoring one leading `v`.
pub fn is_version_like(tag: &str) -> bool {
    tag.strip_prefix('v')
        .unwrap_or(tag)
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}
