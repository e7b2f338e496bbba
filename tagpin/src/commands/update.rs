//! `tagpin update`: pin every image in a compose file.

use crate::context::{AppContext, VerbosityLevel};
use crate::format::OutputFormatter;
use libtagpin::document::{self, ImageUpdate, UpdateOutcome};
use libtagpin::{Resolution, Resolve, Resolver};
use std::fmt;
use std::path::Path;
use std::process::ExitCode;

/// Counts reported after an update run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_updates(updates: &[ImageUpdate]) -> Self {
        updates.iter().fold(Self::default(), |mut summary, update| {
            match update.outcome {
                _ if update.is_updated() => summary.updated += 1,
                _ if update.is_failure() => summary.failed += 1,
                UpdateOutcome::Skipped(_) => summary.skipped += 1,
                _ => summary.unchanged += 1,
            }
            summary
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} unchanged, {} skipped, {} failed",
            self.updated, self.unchanged, self.skipped, self.failed
        )
    }
}

/// Shows a spinner while each reference is resolved.
struct WithSpinner<'a, R> {
    inner: &'a R,
    formatter: &'a dyn OutputFormatter,
}

impl<R: Resolve> Resolve for WithSpinner<'_, R> {
    fn resolve(&self, reference: &str) -> Resolution {
        let spinner = self.formatter.spinner(&format!("Resolving {}", reference));
        let resolution = self.inner.resolve(reference);
        spinner.finish_and_clear();
        resolution
    }
}

/// Prints the outcome for one reference.
pub fn report(update: &ImageUpdate, formatter: &dyn OutputFormatter, verbosity: VerbosityLevel) {
    let reference = &update.reference;
    match &update.outcome {
        UpdateOutcome::Updated { from, to } => {
            formatter.success(&format!("{}: {} -> {}", reference.base(), from, to))
        }
        UpdateOutcome::Unchanged => {
            if verbosity >= VerbosityLevel::Verbose {
                formatter.info(&format!("{} is up to date", reference));
            }
        }
        UpdateOutcome::Skipped(reason) => {
            formatter.warning(&format!("Skipping {}: {}", reference, reason))
        }
        UpdateOutcome::NoCandidates { fetched } => formatter.warning(&format!(
            "No release tag found for {} ({} tags fetched)",
            reference, fetched
        )),
        UpdateOutcome::Failed(e) => {
            formatter.error(&format!("Failed to resolve {}: {}", reference, e))
        }
    }
}

/// Rewrites `path` in place unless `dry_run` is set.
///
/// Only reading or writing the document can fail; per-image problems are
/// reported and counted.
pub fn run_update(
    path: &Path,
    dry_run: bool,
    resolver: &impl Resolve,
    formatter: &dyn OutputFormatter,
    verbosity: VerbosityLevel,
) -> libtagpin::Result<Summary> {
    let original = document::load_document(path)?;
    let resolver = WithSpinner {
        inner: resolver,
        formatter,
    };

    let (updated, updates) = document::update_document_with(&original, &resolver, |update| {
        report(update, formatter, verbosity)
    });
    let summary = Summary::from_updates(&updates);

    if updated == original {
        tracing::debug!(path = %path.display(), "document unchanged");
    } else if dry_run {
        formatter.info(&format!("Dry run: {} not written", path.display()));
    } else {
        document::write_document(path, &updated)?;
        tracing::info!(path = %path.display(), updated = summary.updated, "document written");
    }

    Ok(summary)
}

/// Handle the update command
pub fn handle_update(ctx: &AppContext, path: &Path, dry_run: bool) -> ExitCode {
    let formatter = ctx.formatter();

    let resolver = match Resolver::new(&ctx.config) {
        Ok(resolver) => resolver,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    match run_update(path, dry_run, &resolver, formatter.as_ref(), ctx.verbosity) {
        Ok(summary) => {
            formatter.info(&summary.to_string());
            ExitCode::SUCCESS
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
