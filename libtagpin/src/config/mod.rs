//! Library configuration.
//!
//! Defaults are serialized into the builder first, then an optional YAML file
//! is merged on top, then `TAGPIN_*` environment variables (`__` separates
//! nesting levels, e.g. `TAGPIN_NETWORK__TIMEOUT=10`).

use crate::error::{Result, TagpinError};
use config::{Config as ConfigRs, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Settings read as lists from the environment.
const LIST_KEYS: &[&str] = &[
    "filter.excluded_words",
    "filter.dev_allowed_repositories",
    "filter.arch_suffixes",
    "version.strip_patterns",
];

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub dockerhub: DockerHub,
    #[serde(default)]
    pub ghcr: Ghcr,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub version: VersionConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<Mirror>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            dockerhub: DockerHub::default(),
            ghcr: Ghcr::default(),
            filter: FilterConfig::default(),
            version: VersionConfig::default(),
            resolver: ResolverConfig::default(),
            mirrors: default_mirrors(),
        }
    }
}

impl Config {
    /// Parses a `Config` from a YAML string, on top of the defaults.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(Self::defaults_source()?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional YAML file plus environment overrides.
    ///
    /// A missing `path` yields the defaults (still subject to environment
    /// overrides). A `path` that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigRs::builder().add_source(Self::defaults_source()?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        builder = builder.add_source(Self::environment(None));

        Self::from_builder(builder, path)
    }

    /// `TAGPIN_*` overrides. List settings take comma-separated values,
    /// e.g. `TAGPIN_FILTER__EXCLUDED_WORDS=alpha,beta`.
    ///
    /// `source` replaces the process environment when given.
    fn environment(source: Option<config::Map<String, String>>) -> Environment {
        LIST_KEYS.iter().fold(
            Environment::with_prefix("TAGPIN")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .try_parsing(true)
                .source(source),
            |env, key| env.with_list_parse_key(key),
        )
    }

    fn defaults_source() -> Result<ConfigRs> {
        ConfigRs::try_from(&Config::default()).map_err(|e| {
            TagpinError::config_with_source("Failed to serialize default configuration", None, e)
        })
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                TagpinError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Per-request timeout in seconds.
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tagpin/{}", env!("CARGO_PKG_VERSION"))
}

/// Docker Hub tag API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DockerHub {
    #[serde(default = "default_dockerhub_url")]
    pub url: String,

    #[serde(default = "default_dockerhub_page_size")]
    pub page_size: usize,

    /// Pages fetched per repository. The newest tags are on the first pages.
    #[serde(default = "default_dockerhub_max_pages")]
    pub max_pages: usize,
}

impl Default for DockerHub {
    fn default() -> Self {
        Self {
            url: default_dockerhub_url(),
            page_size: default_dockerhub_page_size(),
            max_pages: default_dockerhub_max_pages(),
        }
    }
}

fn default_dockerhub_url() -> String {
    "https://hub.docker.com".to_string()
}

fn default_dockerhub_page_size() -> usize {
    100
}

fn default_dockerhub_max_pages() -> usize {
    3
}

/// GitHub Container Registry settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ghcr {
    #[serde(default = "default_ghcr_url")]
    pub url: String,
}

impl Default for Ghcr {
    fn default() -> Self {
        Self {
            url: default_ghcr_url(),
        }
    }
}

fn default_ghcr_url() -> String {
    "https://ghcr.io".to_string()
}

/// Tag filter rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterConfig {
    #[serde(default = "default_excluded_words")]
    pub excluded_words: Vec<String>,

    #[serde(default = "default_dev_word")]
    pub dev_word: String,

    /// Repositories whose stable channel is tagged with the development word.
    #[serde(default = "default_dev_allowed_repositories")]
    pub dev_allowed_repositories: Vec<String>,

    #[serde(default = "default_arch_suffixes")]
    pub arch_suffixes: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_words: default_excluded_words(),
            dev_word: default_dev_word(),
            dev_allowed_repositories: default_dev_allowed_repositories(),
            arch_suffixes: default_arch_suffixes(),
        }
    }
}

fn default_excluded_words() -> Vec<String> {
    ["alpha", "beta", "rc", "nightly", "unstable", "edge"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_dev_word() -> String {
    "dev".to_string()
}

fn default_dev_allowed_repositories() -> Vec<String> {
    vec!["readarr".to_string()]
}

fn default_arch_suffixes() -> Vec<String> {
    ["-amd64", "-arm64", "-armhf"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Version parser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VersionConfig {
    /// Extra suffix regexes tried after the built-in fallbacks.
    #[serde(default)]
    pub strip_patterns: Vec<String>,
}

/// How the resolver picks a tag among the candidates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Highest parsed version.
    #[default]
    HighestVersion,
    /// Most recently pushed tag, where the registry reports push times.
    MostRecent,
}

/// Resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResolverConfig {
    #[serde(default)]
    pub strategy: Strategy,
}

/// A registry host that republishes a Docker Hub namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mirror {
    /// Reference prefix including the trailing slash, e.g. `lscr.io/linuxserver/`.
    pub prefix: String,
    /// Docker Hub namespace holding the authoritative tags.
    pub namespace: String,
}

fn default_mirrors() -> Vec<Mirror> {
    vec![Mirror {
        prefix: "lscr.io/linuxserver/".to_string(),
        namespace: "linuxserver".to_string(),
    }]
}
