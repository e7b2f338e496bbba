//! Docker Hub tag listing.
//!
//! `GET /v2/namespaces/{namespace}/repositories/{repo}/tags?page_size=N`
//! returns `{"next": url|null, "results": [{"name", "tag_last_pushed"}]}`.
//! Hub lists the most recently pushed tags first, so only the first few pages
//! are fetched.

use super::{Page, Pages, RawTag, TagSource};
use crate::client::Client;
use crate::config::DockerHub as DockerHubConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TagsPage {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    results: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
    #[serde(default)]
    tag_last_pushed: Option<String>,
}

impl From<TagEntry> for RawTag {
    fn from(entry: TagEntry) -> Self {
        let last_pushed = entry
            .tag_last_pushed
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        RawTag {
            name: entry.name,
            last_pushed,
        }
    }
}

/// Tag source for Docker Hub.
#[derive(Debug, Clone)]
pub struct DockerHubClient {
    client: Client,
    base_url: String,
    page_size: usize,
    max_pages: usize,
}

impl DockerHubClient {
    /// Creates a client from the Docker Hub settings.
    pub fn new(client: Client, config: &DockerHubConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }

    /// URL of the first tag page for a repository.
    pub fn tags_url(&self, namespace: &str, repository: &str) -> String {
        format!(
            "{}/v2/namespaces/{}/repositories/{}/tags?page_size={}",
            self.base_url, namespace, repository, self.page_size
        )
    }

    /// Returns the lazy page sequence for a repository.
    pub fn pages(
        &self,
        namespace: &str,
        repository: &str,
    ) -> Pages<impl FnMut(&str) -> Result<Page> + '_> {
        Pages::new(self.tags_url(namespace, repository), move |url: &str| {
            let (page, _): (TagsPage, _) = self.client.get_json(url, &[], None)?;
            Ok(Page {
                tags: page.results.into_iter().map(RawTag::from).collect(),
                next: page
                    .next
                    .filter(|next| !next.is_empty())
                    .map(|next| Client::resolve_link(&self.base_url, &next)),
            })
        })
        .with_max_pages(self.max_pages)
    }
}

impl TagSource for DockerHubClient {
    fn fetch_tags(&self, namespace: &str, repository: &str) -> Result<Vec<RawTag>> {
        self.pages(namespace, repository).collect_tags()
    }
}
