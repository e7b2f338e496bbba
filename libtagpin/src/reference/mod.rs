//! Image reference parsing and registry classification.
//!
//! An [`ImageReference`] keeps the reference text exactly as written in the
//! document so it can be substituted verbatim later. [`ImageSource`] says
//! which registry API holds the authoritative tag list for it.

use crate::config::Mirror;
use crate::error::{Result, TagpinError};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

const GHCR_PREFIX: &str = "ghcr.io/";
const DOCKER_HUB_HOSTS: [&str; 3] = ["docker.io/", "index.docker.io/", "registry-1.docker.io/"];
const DOCKER_HUB_OFFICIAL_NAMESPACE: &str = "library";

/// An image reference split into its base, tag and digest.
///
/// The base never contains the tag separator: `ghcr.io/acme/widget:1.0` has
/// base `ghcr.io/acme/widget` and tag `1.0`. A registry port
/// (`registry:5000/app`) stays part of the base.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    base: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl FromStr for ImageReference {
    type Err = TagpinError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TagpinError::validation("Image reference cannot be empty"));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TagpinError::validation(format!(
                "Image reference cannot contain whitespace: '{}'",
                s
            )));
        }

        let (name, digest) = match s.split_once('@') {
            Some((name, digest)) => (name, Some(digest.to_string())),
            None => (s, None),
        };

        // A colon after the last slash separates the tag; earlier colons are ports.
        let last_slash = name.rfind('/').map_or(0, |i| i + 1);
        let (base, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&name[..split], Some(name[split + 1..].to_string()))
            }
            None => (name, None),
        };

        if base.is_empty() || base.ends_with('/') {
            return Err(TagpinError::validation(format!(
                "Invalid image reference: '{}'",
                s
            )));
        }
        if tag.as_deref() == Some("") {
            return Err(TagpinError::validation(format!(
                "Image reference has an empty tag: '{}'",
                s
            )));
        }

        Ok(Self {
            base: base.to_string(),
            tag,
            digest,
        })
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

impl ImageReference {
    /// The reference without tag or digest.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The current tag, if present.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The pinned digest, if present.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Returns `base:tag`, dropping any digest.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagpin::ImageReference;
    ///
    /// let reference: ImageReference = "ghcr.io/acme/widget:1.0".parse().unwrap();
    /// assert_eq!(reference.with_tag("1.1"), "ghcr.io/acme/widget:1.1");
    /// ```
    pub fn with_tag(&self, tag: &str) -> String {
        format!("{}:{}", self.base, tag)
    }
}

/// The registry API that lists tags for an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Docker Hub, `namespace/repository`.
    DockerHub {
        namespace: String,
        repository: String,
    },
    /// GitHub Container Registry, `owner/repository`.
    Ghcr { owner: String, repository: String },
}

impl ImageSource {
    /// Classifies a reference base. The first matching rule wins:
    ///
    /// 1. `ghcr.io/<owner>/<repo>` is a GHCR image.
    /// 2. A base under a known mirror prefix is the mirror's Docker Hub namespace.
    /// 3. Anything else is read as a Docker Hub `namespace/repository`; a single
    ///    segment is an official image in `library`.
    ///
    /// Classification never fails; unknown hosts fall through to rule 3.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagpin::config::Config;
    /// use libtagpin::reference::ImageSource;
    ///
    /// let mirrors = Config::default().mirrors;
    /// assert_eq!(
    ///     ImageSource::classify("lscr.io/linuxserver/sonarr", &mirrors),
    ///     ImageSource::DockerHub {
    ///         namespace: "linuxserver".to_string(),
    ///         repository: "sonarr".to_string(),
    ///     }
    /// );
    /// ```
    pub fn classify(base: &str, mirrors: &[Mirror]) -> Self {
        if let Some(rest) = base.strip_prefix(GHCR_PREFIX)
            && let Some((owner, repository)) = rest.split_once('/')
            && !owner.is_empty()
            && !repository.is_empty()
        {
            return Self::Ghcr {
                owner: owner.to_string(),
                repository: repository.to_string(),
            };
        }

        if let Some((mirror, repository)) = mirrors
            .iter()
            .find_map(|m| base.strip_prefix(m.prefix.as_str()).map(|rest| (m, rest)))
            && !repository.is_empty()
        {
            return Self::DockerHub {
                namespace: mirror.namespace.clone(),
                repository: repository.to_string(),
            };
        }

        let path = DOCKER_HUB_HOSTS
            .iter()
            .find_map(|host| base.strip_prefix(host))
            .unwrap_or(base);

        match path.split_once('/') {
            Some((namespace, repository)) => Self::DockerHub {
                namespace: namespace.to_string(),
                repository: repository.to_string(),
            },
            None => Self::DockerHub {
                namespace: DOCKER_HUB_OFFICIAL_NAMESPACE.to_string(),
                repository: path.to_string(),
            },
        }
    }

    /// The Docker Hub namespace or GHCR owner.
    pub fn namespace(&self) -> &str {
        match self {
            Self::DockerHub { namespace, .. } => namespace,
            Self::Ghcr { owner, .. } => owner,
        }
    }

    /// The repository name within the namespace.
    pub fn repository(&self) -> &str {
        match self {
            Self::DockerHub { repository, .. } | Self::Ghcr { repository, .. } => repository,
        }
    }

    /// Short registry label for messages.
    pub fn registry_name(&self) -> &'static str {
        match self {
            Self::DockerHub { .. } => "docker hub",
            Self::Ghcr { .. } => "ghcr",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.registry_name(),
            self.namespace(),
            self.repository()
        )
    }
}
