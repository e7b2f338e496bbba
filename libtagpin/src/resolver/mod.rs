//! Latest-tag resolution.
//!
//! [`Resolver`] classifies an image reference, fetches the registry's tag
//! list, drops non-release tags, parses the rest and picks one according to
//! the configured [`Strategy`]. The selected tag is returned exactly as the
//! registry spells it.

use crate::client::{Client, ClientConfig};
use crate::config::{Config, Mirror, Strategy};
use crate::error::{Result, TagpinError};
use crate::filter::TagFilter;
use crate::reference::{ImageReference, ImageSource};
use crate::registry::{DockerHubClient, GhcrClient, RawTag, TagSource};
use crate::version::{Version, VersionParser};

#[cfg(test)]
mod tests;

/// A release tag together with its parsed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub tag: RawTag,
    pub version: Version,
}

/// Outcome of resolving one image reference.
#[derive(Debug)]
pub enum Resolution {
    /// The selected tag, verbatim from the registry.
    Latest(String),
    /// Tags were fetched but none survived filtering and parsing.
    NoCandidates {
        /// Number of raw tags the registry returned.
        fetched: usize,
    },
    /// The reference was invalid or the registry could not be queried.
    Failed(TagpinError),
}

impl Resolution {
    /// The selected tag, if any.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Latest(tag) => Some(tag),
            _ => None,
        }
    }

    /// Converts into the selected tag, discarding the failure reason.
    pub fn into_tag(self) -> Option<String> {
        match self {
            Self::Latest(tag) => Some(tag),
            _ => None,
        }
    }
}

/// Anything that can resolve a reference to its latest tag.
pub trait Resolve {
    fn resolve(&self, reference: &str) -> Resolution;
}

/// Resolves image references against Docker Hub and GHCR.
pub struct Resolver {
    dockerhub: Box<dyn TagSource>,
    ghcr: Box<dyn TagSource>,
    filter: TagFilter,
    parser: VersionParser,
    mirrors: Vec<Mirror>,
    strategy: Strategy,
}

impl Resolver {
    /// Creates a resolver that talks to the registries named in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::with_config(ClientConfig::from(&config.network))?;
        let dockerhub = DockerHubClient::new(client.clone(), &config.dockerhub);
        let ghcr = GhcrClient::new(client, &config.ghcr);

        Self::with_sources(config, Box::new(dockerhub), Box::new(ghcr))
    }

    /// Creates a resolver with explicit tag sources.
    pub fn with_sources(
        config: &Config,
        dockerhub: Box<dyn TagSource>,
        ghcr: Box<dyn TagSource>,
    ) -> Result<Self> {
        Ok(Self {
            dockerhub,
            ghcr,
            filter: TagFilter::from_config(&config.filter),
            parser: VersionParser::with_patterns(&config.version.strip_patterns)?,
            mirrors: config.mirrors.clone(),
            strategy: config.resolver.strategy,
        })
    }

    /// Classifies a reference string. Never fails: anything unrecognized is
    /// treated as a Docker Hub `namespace/repository`.
    pub fn classify(&self, reference: &str) -> ImageSource {
        match reference.parse::<ImageReference>() {
            Ok(parsed) => ImageSource::classify(parsed.base(), &self.mirrors),
            Err(_) => ImageSource::classify(reference.trim(), &self.mirrors),
        }
    }

    /// Fetches the raw tag list for a classified source.
    pub fn fetch_tags(&self, source: &ImageSource) -> Result<Vec<RawTag>> {
        let tag_source = match source {
            ImageSource::DockerHub { .. } => &self.dockerhub,
            ImageSource::Ghcr { .. } => &self.ghcr,
        };
        tag_source.fetch_tags(source.namespace(), source.repository())
    }

    /// Filters and parses raw tags, preserving registry order.
    pub fn candidates(&self, tags: &[RawTag], repository: &str) -> Vec<Candidate> {
        self.filter
            .filter(tags, repository)
            .into_iter()
            .filter_map(|tag| {
                let version = self.parser.parse(&tag.name);
                if version.is_none() {
                    tracing::trace!(tag = %tag.name, "tag is not a recognized version");
                }
                version.map(|version| Candidate {
                    tag: tag.clone(),
                    version,
                })
            })
            .collect()
    }

    /// Picks a candidate according to the configured strategy.
    pub fn select<'a>(&self, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
        match self.strategy {
            Strategy::HighestVersion => highest_version(candidates),
            Strategy::MostRecent => most_recent(candidates).or_else(|| highest_version(candidates)),
        }
    }

    /// Resolves a reference, reporting why nothing was found when it fails.
    pub fn resolve_reference(&self, reference: &str) -> Resolution {
        if let Err(e) = reference.parse::<ImageReference>() {
            return Resolution::Failed(e);
        }

        let source = self.classify(reference);
        let tags = match self.fetch_tags(&source) {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(reference, %source, error = %e, "failed to fetch tags");
                return Resolution::Failed(e);
            }
        };

        let candidates = self.candidates(&tags, source.repository());
        match self.select(&candidates) {
            Some(best) => {
                tracing::info!(
                    reference,
                    %source,
                    fetched = tags.len(),
                    candidates = candidates.len(),
                    tag = %best.tag.name,
                    "resolved latest tag"
                );
                Resolution::Latest(best.tag.name.clone())
            }
            None => {
                tracing::info!(reference, %source, fetched = tags.len(), "no release candidates");
                Resolution::NoCandidates {
                    fetched: tags.len(),
                }
            }
        }
    }

    /// Returns the latest release tag for a reference, or `None`.
    pub fn resolve_latest(&self, reference: &str) -> Option<String> {
        self.resolve_reference(reference).into_tag()
    }

    /// Fetches and ranks every candidate for a reference, highest first.
    pub fn ranked_candidates(&self, reference: &str) -> Result<(ImageSource, Vec<Candidate>)> {
        reference.parse::<ImageReference>()?;
        let source = self.classify(reference);
        let tags = self.fetch_tags(&source)?;
        let mut candidates = self.candidates(&tags, source.repository());
        candidates.sort_by(|a, b| b.version.cmp(&a.version));
        Ok((source, candidates))
    }
}

impl Resolve for Resolver {
    fn resolve(&self, reference: &str) -> Resolution {
        self.resolve_reference(reference)
    }
}

/// The candidate with the highest version. Equal versions keep the earliest.
pub fn highest_version(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(b) if b.version >= candidate.version => Some(b),
        _ => Some(candidate),
    })
}

/// The most recently pushed candidate. Candidates without a push time are
/// ignored; equal push times fall back to version order.
pub fn most_recent(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates
        .iter()
        .filter(|c| c.tag.last_pushed.is_some())
        .fold(None, |best, candidate| match best {
            Some(b)
                if (b.tag.last_pushed, &b.version)
                    >= (candidate.tag.last_pushed, &candidate.version) =>
            {
                Some(b)
            }
            _ => Some(candidate),
        })
}
