use crate::context::AppContext;
use crate::format::{self, Formattable, OutputFormat};
use libtagpin::{Resolution, Resolve, Resolver};
use serde::Serialize;
use std::process::ExitCode;

/// Resolution result for one reference, as printed by `tagpin resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImage {
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolvedImage {
    pub fn new(reference: &str, resolution: Resolution) -> Self {
        let (latest, error) = match resolution {
            Resolution::Latest(tag) => (Some(tag), None),
            Resolution::NoCandidates { fetched } => (
                None,
                Some(format!("no release tag among {} tags", fetched)),
            ),
            Resolution::Failed(e) => (None, Some(e.to_string())),
        };
        Self {
            reference: reference.to_string(),
            latest,
            error,
        }
    }
}

impl Formattable for ResolvedImage {
    fn format_pretty(&self) -> String {
        match (&self.latest, &self.error) {
            (Some(tag), _) => format!("{} -> {}", self.reference, tag),
            (None, Some(error)) => format!("{} -> ({})", self.reference, error),
            (None, None) => self.reference.clone(),
        }
    }
}

/// Resolves each reference in order.
pub fn resolve_all(references: &[String], resolver: &impl Resolve) -> Vec<ResolvedImage> {
    references
        .iter()
        .map(|reference| ResolvedImage::new(reference, resolver.resolve(reference)))
        .collect()
}

/// Handle the resolve command
///
/// Exits non-zero when any reference could not be resolved.
pub fn handle_resolve(ctx: &AppContext, references: &[String], format: OutputFormat) -> ExitCode {
    let formatter = ctx.formatter();

    let resolver = match Resolver::new(&ctx.config) {
        Ok(resolver) => resolver,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let results = resolve_all(references, &resolver);

    match format::format_output_vec(&results, format) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            formatter.error(&e);
            return ExitCode::FAILURE;
        }
    }

    if results.iter().all(|r| r.latest.is_some()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
