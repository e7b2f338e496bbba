//! Basic usage example for the tagpin library.
//!
//! Resolves the latest release tag for a few well-known images and shows the
//! ranked candidates for one of them.
//!
//! Run with: cargo run --example basic_usage

use libtagpin::{Config, Resolution, Resolve, Resolver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Tagpin Library - Basic Usage Example\n");

    let resolver = Resolver::new(&Config::default())?;

    let references = [
        "redis:7.0",
        "lscr.io/linuxserver/sonarr:4.0.0",
        "ghcr.io/home-assistant/home-assistant:2024.1.0",
    ];

    for reference in references {
        println!("{} -> {}", reference, resolver.classify(reference));
        match resolver.resolve(reference) {
            Resolution::Latest(tag) => println!("  ✓ latest release: {}", tag),
            Resolution::NoCandidates { fetched } => {
                println!("  ⚠ none of {} tags look like a release", fetched)
            }
            Resolution::Failed(e) => println!("  ✗ {}", e),
        }
    }

    println!("\nTop candidates for redis:");
    let (_, candidates) = resolver.ranked_candidates("redis:7.0")?;
    for candidate in candidates.iter().take(5) {
        println!("  {} ({})", candidate.tag, candidate.version);
    }

    Ok(())
}
