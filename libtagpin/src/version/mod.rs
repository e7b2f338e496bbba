//! Tag version parsing and ordering.
//!
//! Registry tags are parsed into a [`Version`] following public version
//! ordering rules (epoch, numeric release segments, pre-, post- and
//! dev-release qualifiers, local segment). Vendor tags that do not parse
//! as-is are retried after stripping known suffixes, see [`VersionParser`].

use crate::error::{Result, TagpinError};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;


static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:
            [-_.]?
            (?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)
            [-_.]?
            (?P<pre_n>[0-9]+)?
        )?
        (?:
            (?:-(?P<post_n1>[0-9]+))
            |
            (?:[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)
        )?
        (?:
            [-_.]?
            (?P<dev_l>dev)
            [-_.]?
            (?P<dev_n>[0-9]+)?
        )?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .expect("version pattern is valid")
});

/// Pre-release phase, ordered alpha < beta < rc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "alpha" | "a" => Self::Alpha,
            "beta" | "b" => Self::Beta,
            _ => Self::Rc,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::Rc => "rc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum LocalSegment {
    Alpha(String),
    Numeric(u64),
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PhaseKey {
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Release,
}

/// A parsed, totally-ordered version.
///
/// Equality follows ordering: `1.0` equals `1.0.0`, and a leading `v` on the
/// source tag is insignificant.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

impl Version {
    /// Numeric release segments, e.g. `[1, 43, 0, 10492]`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Pre-release qualifier, if any.
    pub fn pre(&self) -> Option<(PreRelease, u64)> {
        self.pre
    }

    /// Post-release number, if any.
    pub fn post(&self) -> Option<u64> {
        self.post
    }

    fn trimmed_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|segment| *segment != 0)
            .map_or(0, |i| i + 1);
        &self.release[..end]
    }

    fn phase_key(&self) -> PhaseKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PhaseKey::DevOnly,
            (Some((phase, n)), _, _) => PhaseKey::Pre(phase, n),
            _ => PhaseKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        self.dev.map_or(DevKey::Release, DevKey::Dev)
    }
}

fn parse_number(value: Option<regex::Match<'_>>) -> Option<u64> {
    match value {
        Some(m) => m.as_str().parse().ok(),
        None => Some(0),
    }
}

impl FromStr for Version {
    type Err = TagpinError;

    /// Strict parse of a version string, without any vendor fallbacks.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TagpinError::validation(format!("Invalid version: {}", s));
        let caps = VERSION_PATTERN.captures(s.trim()).ok_or_else(invalid)?;

        let epoch = match caps.name("epoch") {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };

        let release = caps["release"]
            .split('.')
            .map(|segment| segment.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let pre = match caps.name("pre_l") {
            Some(label) => Some((
                PreRelease::from_label(label.as_str()),
                parse_number(caps.name("pre_n")).ok_or_else(invalid)?,
            )),
            None => None,
        };

        let post = if let Some(n) = caps.name("post_n1") {
            Some(n.as_str().parse().map_err(|_| invalid())?)
        } else if caps.name("post_l").is_some() {
            Some(parse_number(caps.name("post_n2")).ok_or_else(invalid)?)
        } else {
            None
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(parse_number(caps.name("dev_n")).ok_or_else(invalid)?),
            None => None,
        };

        let local = caps.name("local").map(|m| {
            m.as_str()
                .split(['-', '_', '.'])
                .map(|segment| match segment.parse::<u64>() {
                    Ok(n) => LocalSegment::Numeric(n),
                    Err(_) => LocalSegment::Alpha(segment.to_ascii_lowercase()),
                })
                .collect()
        });

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.phase_key().cmp(&other.phase_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((phase, n)) = self.pre {
            write!(f, "{}{}", phase.as_str(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if let Some(local) = &self.local {
            let segments: Vec<String> = local
                .iter()
                .map(|segment| match segment {
                    LocalSegment::Alpha(s) => s.clone(),
                    LocalSegment::Numeric(n) => n.to_string(),
                })
                .collect();
            write!(f, "+{}", segments.join("."))?;
        }
        Ok(())
    }
}

/// A named suffix that is stripped from a tag before retrying the parse.
#[derive(Debug, Clone)]
pub struct SuffixPattern {
    name: String,
    pattern: Regex,
}

impl SuffixPattern {
    /// Compiles a suffix pattern. The pattern should be anchored with `$`.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            TagpinError::validation_with_source(format!("Invalid suffix pattern '{}'", pattern), e)
        })?;
        Ok(Self {
            name: name.into(),
            pattern,
        })
    }

    /// The name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Removes the suffix, returning `None` if the tag does not end with it.
    pub fn strip<'a>(&self, tag: &'a str) -> Option<&'a str> {
        let m = self.pattern.find(tag)?;
        (m.end() == tag.len() && m.start() > 0).then(|| &tag[..m.start()])
    }
}

/// Parses registry tags into versions.
///
/// A tag is first parsed as-is (after dropping one leading `v`). If that
/// fails, each fallback suffix is tried in order against the same input and
/// the first successful parse wins. The built-in chain strips a trailing
/// hexadecimal build hash (`-121068a07`) and a trailing `-develop`.
#[derive(Debug, Clone)]
pub struct VersionParser {
    fallbacks: Vec<SuffixPattern>,
}

impl Default for VersionParser {
    fn default() -> Self {
        Self {
            fallbacks: vec![
                SuffixPattern::new("build-hash", r"-[0-9a-f]+$").expect("valid built-in pattern"),
                SuffixPattern::new("develop", r"-develop$").expect("valid built-in pattern"),
            ],
        }
    }
}

impl VersionParser {
    /// Creates a parser with the built-in fallback chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with extra suffix patterns appended after the built-ins.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagpin::version::VersionParser;
    ///
    /// let parser = VersionParser::with_patterns(&["-ls[0-9]+$".to_string()]).unwrap();
    /// assert!(parser.parse("4.0.14.2939-ls294").is_some());
    /// ```
    pub fn with_patterns(patterns: &[String]) -> Result<Self> {
        let mut parser = Self::default();
        for pattern in patterns {
            parser.push(SuffixPattern::new(pattern.clone(), pattern)?);
        }
        Ok(parser)
    }

    /// Appends a fallback suffix to the end of the chain.
    pub fn push(&mut self, suffix: SuffixPattern) {
        self.fallbacks.push(suffix);
    }

    /// Parses a tag, returning `None` when no attempt in the chain succeeds.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagpin::version::VersionParser;
    ///
    /// let parser = VersionParser::new();
    /// assert_eq!(parser.parse("v1.2.3"), parser.parse("1.2.3"));
    /// assert!(parser.parse("0.4.18-develop").is_some());
    /// assert!(parser.parse("main").is_none());
    /// ```
    pub fn parse(&self, tag: &str) -> Option<Version> {
        let tag = tag.strip_prefix('v').unwrap_or(tag);
        if let Ok(version) = tag.parse() {
            return Some(version);
        }
        self.fallbacks.iter().find_map(|suffix| {
            let stripped = suffix.strip(tag)?;
            let version = stripped.parse().ok()?;
            tracing::trace!(tag, suffix = suffix.name(), "parsed after stripping suffix");
            Some(version)
        })
    }
}

/// Parses a tag with the built-in fallback chain.
pub fn parse(tag: &str) -> Option<Version> {
    static PARSER: LazyLock<VersionParser> = LazyLock::new(VersionParser::new);
    PARSER.parse(tag)
}
