//! Compose document rewriting.
//!
//! The document is treated as plain text: image references are found by
//! matching `image:` lines, and updates are exact substitutions of the
//! reference value on those lines. Indentation, quoting, comments, line
//! endings and every other line are left untouched.

use crate::error::{Result, TagpinError};
use crate::reference::ImageReference;
use crate::resolver::{Resolution, Resolve};
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;


static IMAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:-\s+)?image:\s*(?P<open>["']?)(?P<value>[^\s"'#]+)(?P<close>["']?)\s*(?:#.*)?$"#,
    )
    .expect("image line pattern is valid")
});

/// Why a reference was left alone without asking a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Pinned by digest.
    Digest,
    /// No tag to compare against.
    Untagged,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest => write!(f, "pinned by digest"),
            Self::Untagged => write!(f, "no tag"),
        }
    }
}

/// What happened to one reference during an update.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The tag was replaced.
    Updated { from: String, to: String },
    /// The current tag is already the latest.
    Unchanged,
    Skipped(SkipReason),
    /// The registry had no release tags.
    NoCandidates { fetched: usize },
    /// The registry could not be queried.
    Failed(TagpinError),
}

/// The outcome for one extracted reference.
#[derive(Debug)]
pub struct ImageUpdate {
    pub reference: ImageReference,
    pub outcome: UpdateOutcome,
}

impl ImageUpdate {
    pub fn is_updated(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::Updated { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            UpdateOutcome::NoCandidates { .. } | UpdateOutcome::Failed(_)
        )
    }
}

/// Byte range of the reference value on an `image:` line.
fn image_value(line: &str) -> Option<Range<usize>> {
    let caps = IMAGE_LINE.captures(line)?;
    if caps.name("open")?.as_str() != caps.name("close")?.as_str() {
        return None;
    }
    caps.name("value").map(|m| m.range())
}

/// Splits a line into its content and its terminator.
fn split_line_ending(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\n', '\r']);
    (content, &line[content.len()..])
}

/// Extracts image references in document order, without duplicates.
///
/// Values that do not parse as references are ignored.
///
/// # Examples
///
/// ```
/// use libtagpin::document::extract_references;
///
/// let refs = extract_references("services:\n  app:\n    image: redis:7.0\n");
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].tag(), Some("7.0"));
/// ```
pub fn extract_references(document: &str) -> Vec<ImageReference> {
    let mut references: Vec<ImageReference> = Vec::new();

    for line in document.lines() {
        let Some(range) = image_value(line) else {
            continue;
        };
        match line[range].parse::<ImageReference>() {
            Ok(reference) if !references.contains(&reference) => references.push(reference),
            Ok(_) => {}
            Err(e) => tracing::debug!(line, error = %e, "ignoring image line"),
        }
    }

    references
}

/// Replaces the tag of `old` wherever it is the whole value of an `image:` line.
///
/// A reference that does not appear verbatim leaves the document unchanged.
pub fn rewrite(document: &str, old: &ImageReference, new_tag: &str) -> String {
    let old_value = old.to_string();
    let new_value = old.with_tag(new_tag);

    document
        .split_inclusive('\n')
        .map(|line| {
            let (content, ending) = split_line_ending(line);
            match image_value(content) {
                Some(range) if content[range.clone()] == old_value => {
                    format!(
                        "{}{}{}{}",
                        &content[..range.start],
                        new_value,
                        &content[range.end..],
                        ending
                    )
                }
                _ => line.to_string(),
            }
        })
        .collect()
}

/// Decides what to do with one reference.
pub fn plan_update(reference: &ImageReference, resolver: &impl Resolve) -> UpdateOutcome {
    if reference.digest().is_some() {
        return UpdateOutcome::Skipped(SkipReason::Digest);
    }
    let Some(current) = reference.tag() else {
        return UpdateOutcome::Skipped(SkipReason::Untagged);
    };

    match resolver.resolve(&reference.to_string()) {
        Resolution::Latest(tag) if tag == current => UpdateOutcome::Unchanged,
        Resolution::Latest(tag) => UpdateOutcome::Updated {
            from: current.to_string(),
            to: tag,
        },
        Resolution::NoCandidates { fetched } => UpdateOutcome::NoCandidates { fetched },
        Resolution::Failed(e) => UpdateOutcome::Failed(e),
    }
}

/// Resolves every reference in `document` and pins each to its latest tag.
///
/// Returns the rewritten document and one [`ImageUpdate`] per extracted
/// reference. Failures are recorded in the updates, never raised.
pub fn update_document(document: &str, resolver: &impl Resolve) -> (String, Vec<ImageUpdate>) {
    update_document_with(document, resolver, |_| {})
}

/// Like [`update_document`], calling `on_update` as each reference finishes.
pub fn update_document_with(
    document: &str,
    resolver: &impl Resolve,
    mut on_update: impl FnMut(&ImageUpdate),
) -> (String, Vec<ImageUpdate>) {
    extract_references(document).into_iter().fold(
        (document.to_string(), Vec::new()),
        |(document, mut updates), reference| {
            let outcome = plan_update(&reference, resolver);
            let document = match &outcome {
                UpdateOutcome::Updated { to, .. } => rewrite(&document, &reference, to),
                _ => document,
            };

            let update = ImageUpdate { reference, outcome };
            on_update(&update);
            updates.push(update);
            (document, updates)
        },
    )
}

/// Reads a document from disk.
pub fn load_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        TagpinError::io("Failed to read document", path.display().to_string(), e)
    })
}

/// Writes a document back to disk.
pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| {
        TagpinError::io("Failed to write document", path.display().to_string(), e)
    })
}
