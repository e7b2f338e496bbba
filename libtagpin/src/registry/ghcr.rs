//! GitHub Container Registry tag listing.
//!
//! GHCR needs a bearer token even for public images. An anonymous token is
//! requested from `/token?scope=repository:{owner}/{repo}:pull`, then the
//! distribution API `/v2/{owner}/{repo}/tags/list` is paged through its
//! `Link` headers. GHCR listings are short, so no page cap applies.

use super::{Page, Pages, RawTag, TagSource};
use crate::auth::{Credentials, TokenResponse, pull_scope};
use crate::client::Client;
use crate::config::Ghcr as GhcrConfig;
use crate::error::{Result, TagpinError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TagsList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Tag source for ghcr.io.
#[derive(Debug, Clone)]
pub struct GhcrClient {
    client: Client,
    base_url: String,
}

impl GhcrClient {
    /// Creates a client from the GHCR settings.
    pub fn new(client: Client, config: &GhcrConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    /// Requests an anonymous pull token for the repository.
    pub fn anonymous_token(&self, owner: &str, repository: &str) -> Result<Credentials> {
        let url = format!("{}/token", self.base_url);
        let scope = pull_scope(owner, repository);

        let (token, _): (TokenResponse, _) = self
            .client
            .get_json(&url, &[("scope", scope.as_str())], None)
            .map_err(|e| match e {
                TagpinError::Network { .. } | TagpinError::Authentication { .. } => e,
                other => TagpinError::authentication(
                    format!("Failed to obtain token for {}: {}", scope, other),
                    None,
                ),
            })?;

        Ok(token.into_credentials())
    }

    /// URL of the first tag page for a repository.
    pub fn tags_url(&self, owner: &str, repository: &str) -> String {
        format!("{}/v2/{}/{}/tags/list", self.base_url, owner, repository)
    }

    /// Returns the lazy page sequence, authenticated with `credentials`.
    pub fn pages<'a>(
        &'a self,
        owner: &str,
        repository: &str,
        credentials: &'a Credentials,
    ) -> Pages<impl FnMut(&str) -> Result<Page> + 'a> {
        Pages::new(self.tags_url(owner, repository), move |url: &str| {
            let (list, next): (TagsList, _) = self.client.get_json(url, &[], Some(credentials))?;
            Ok(Page {
                tags: list
                    .tags
                    .unwrap_or_default()
                    .into_iter()
                    .map(RawTag::new)
                    .collect(),
                next: next.map(|target| Client::resolve_link(&self.base_url, &target)),
            })
        })
    }
}

impl TagSource for GhcrClient {
    fn fetch_tags(&self, owner: &str, repository: &str) -> Result<Vec<RawTag>> {
        let credentials = self.anonymous_token(owner, repository)?;
        self.pages(owner, repository, &credentials).collect_tags()
    }
}
