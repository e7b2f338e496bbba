//! Registry tag sources.
//!
//! Each registry API is a [`TagSource`]: given a namespace and repository it
//! returns every tag it can list. Paging is expressed once, as the [`Pages`]
//! iterator, and each client only knows how to fetch one page and where the
//! next one lives.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fmt;

mod dockerhub;
mod ghcr;

pub use dockerhub::DockerHubClient;
pub use ghcr::GhcrClient;


/// A tag as returned by a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    /// The tag name, verbatim.
    pub name: String,
    /// When the tag was last pushed, if the registry reports it.
    pub last_pushed: Option<DateTime<Utc>>,
}

impl RawTag {
    /// Creates a tag without push metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_pushed: None,
        }
    }

    /// Attaches a push timestamp.
    pub fn pushed_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_pushed = Some(at);
        self
    }
}

impl AsRef<str> for RawTag {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RawTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Lists the tags of one repository on one registry.
pub trait TagSource {
    /// Fetches the tag list. Any failed request fails the whole fetch.
    fn fetch_tags(&self, namespace: &str, repository: &str) -> Result<Vec<RawTag>>;
}

/// One page of a tag listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub tags: Vec<RawTag>,
    /// Where the next page lives, if there is one.
    pub next: Option<String>,
}

/// Lazily fetches tag batches by following continuation URLs.
///
/// Iteration ends when a page has no continuation, when `max_pages` pages
/// have been fetched, or after the first error (which is yielded).
pub struct Pages<F> {
    next: Option<String>,
    fetched: usize,
    max_pages: Option<usize>,
    fetch_page: F,
}

impl<F> Pages<F>
where
    F: FnMut(&str) -> Result<Page>,
{
    /// Starts paging at `start`.
    pub fn new(start: impl Into<String>, fetch_page: F) -> Self {
        Self {
            next: Some(start.into()),
            fetched: 0,
            max_pages: None,
            fetch_page,
        }
    }

    /// Stops after `max_pages` pages.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Drains every page into one list, failing on the first error.
    pub fn collect_tags(self) -> Result<Vec<RawTag>> {
        let mut all_tags = Vec::new();
        for batch in self {
            all_tags.extend(batch?);
        }
        Ok(all_tags)
    }
}

impl<F> Iterator for Pages<F>
where
    F: FnMut(&str) -> Result<Page>,
{
    type Item = Result<Vec<RawTag>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.max_pages.is_some_and(|max| self.fetched >= max) {
            return None;
        }
        let url = self.next.take()?;
        self.fetched += 1;

        match (self.fetch_page)(&url) {
            Ok(page) => {
                tracing::debug!(
                    url = %url,
                    page = self.fetched,
                    tags = page.tags.len(),
                    "fetched tag page"
                );
                self.next = page.next;
                Some(Ok(page.tags))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
