//! Tagpin - Container Image Tag Pinning Library
//!
//! Tagpin finds the newest released tag of a container image and pins
//! compose-style documents to it.
//!
//! # Quick Start
//!
//! ```no_run
//! use libtagpin::{Config, Resolver};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::new(&Config::default())?;
//!
//!     // Ask the registry for the newest release tag
//!     if let Some(tag) = resolver.resolve_latest("ghcr.io/acme/widget:1.0") {
//!         println!("latest: {}", tag);
//!     }
//!
//!     // Pin every image in a compose file
//!     let path = std::path::Path::new("docker-compose.yml");
//!     let document = libtagpin::document::load_document(path)?;
//!     let (updated, _) = libtagpin::update_document(&document, &resolver);
//!     libtagpin::document::write_document(path, &updated)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # How a tag is chosen
//!
//! 1. The reference is classified: `ghcr.io/` images are listed through the
//!    GHCR registry API, known mirrors (such as `lscr.io/linuxserver/`) and
//!    everything else through the Docker Hub tag API.
//! 2. Every tag is fetched, following pagination.
//! 3. Mutable aliases, pre-releases, development builds and per-architecture
//!    tags are dropped ([`TagFilter`]).
//! 4. The rest are parsed as versions, tolerating vendor suffixes such as
//!    build hashes ([`VersionParser`]), and the highest wins.
//!
//! # Main Types
//!
//! - [`Resolver`] - Resolves references to their latest release tag
//! - [`ImageReference`] - Image reference parsing
//! - [`Version`] - Comparable release version
//! - [`Config`] - Registry endpoints, filter rules and strategy

#![warn(clippy::all)]

/// Returns the libtagpin crate version.
///
/// # Examples
///
/// ```
/// let version = libtagpin::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// Re-export commonly used types for convenience
pub use config::{Config, Strategy};
pub use document::{ImageUpdate, UpdateOutcome, extract_references, rewrite, update_document};
pub use error::{Result, TagpinError};
pub use filter::TagFilter;
pub use reference::{ImageReference, ImageSource};
pub use registry::{RawTag, TagSource};
pub use resolver::{Candidate, Resolution, Resolve, Resolver};
pub use version::{Version, VersionParser};

pub mod document;
pub mod error;
pub mod filter;
pub mod reference;
pub mod resolver;
pub mod version;

// Registry plumbing, public for callers that need their own tag sources
#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod client;
pub mod config;
#[doc(hidden)]
pub mod registry;
