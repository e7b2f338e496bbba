use crate::context::AppContext;
use crate::format::{self, Formattable, OutputFormat};
use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use libtagpin::{Candidate, Resolver};
use serde::Serialize;
use std::process::ExitCode;
use tabled::Tabled;

/// One ranked release candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TagRow {
    /// Tag name, as published
    #[tabled(rename = "TAG")]
    pub tag: String,

    /// Normalized version
    #[tabled(rename = "VERSION")]
    pub version: String,

    /// Last push (relative format)
    #[tabled(rename = "PUSHED")]
    #[serde(skip)]
    pub pushed: String,

    /// Raw push timestamp for machine-readable output
    #[tabled(skip)]
    #[serde(rename = "pushed", skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl TagRow {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            tag: candidate.tag.name.clone(),
            version: candidate.version.to_string(),
            pushed: candidate
                .tag
                .last_pushed
                .map(|at| at.humanize())
                .unwrap_or_else(|| "-".to_string()),
            pushed_at: candidate.tag.last_pushed,
        }
    }
}

impl Formattable for TagRow {
    fn format_pretty(&self) -> String {
        self.tag.clone()
    }
}

/// Converts ranked candidates to rows, keeping at most `limit`.
pub fn tag_rows(candidates: &[Candidate], limit: Option<usize>) -> Vec<TagRow> {
    candidates
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(TagRow::from_candidate)
        .collect()
}

/// Handle the tags command (list ranked release candidates for an image)
pub fn handle_tags(
    ctx: &AppContext,
    reference: &str,
    format: OutputFormat,
    limit: Option<usize>,
) -> ExitCode {
    let formatter = ctx.formatter();

    let resolver = match Resolver::new(&ctx.config) {
        Ok(resolver) => resolver,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let spinner = formatter.spinner(&format!("Fetching tags for {}", reference));
    let ranked = resolver.ranked_candidates(reference);
    spinner.finish_and_clear();

    let (source, candidates) = match ranked {
        Ok(ranked) => ranked,
        Err(e) => {
            formatter.error(&format!("Failed to list tags for {}: {}", reference, e));
            return ExitCode::FAILURE;
        }
    };

    let rows = tag_rows(&candidates, limit);

    match format {
        OutputFormat::Pretty => {
            if rows.is_empty() {
                println!("No release tags found for {}.", source);
                return ExitCode::SUCCESS;
            }
            use tabled::{Table, settings::Style};
            let table = Table::new(&rows).with(Style::empty()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::Yaml => match format::format_output_vec(&rows, format) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                formatter.error(&e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;
