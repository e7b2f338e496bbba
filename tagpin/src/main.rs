use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, prelude::*};

mod commands;
mod context;
mod format;

/// Tagpin - Container Image Tag Pinning
///
/// Pins every image in a compose file to its newest released tag.
#[derive(Parser, Debug)]
#[command(name = "tagpin")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    color: String,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "TAGPIN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pin every image in a compose file to its latest release tag
    Update {
        /// Compose file to rewrite
        #[arg(default_value = "docker-compose.yml")]
        file: PathBuf,
        /// Show the planned changes without writing the file
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the latest release tag for image references
    Resolve {
        /// Image references (e.g. ghcr.io/acme/widget:1.0)
        #[arg(required = true)]
        references: Vec<String>,
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// List the release candidates for an image, highest first
    Tags {
        /// Image reference
        reference: String,
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Limit number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Display version information
    Version,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbosity: context::VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = context::VerbosityLevel::from_count(cli.verbose);
    init_tracing(verbosity);

    match cli.command {
        Commands::Version => {
            commands::version::print_version();
            return ExitCode::SUCCESS;
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    // Precedence: defaults > config file > env vars > CLI flags
    let ctx = match context::AppContext::build(
        cli.config.as_deref(),
        format::ColorChoice::from(cli.color.as_str()),
        verbosity,
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            format::create_formatter(format::ColorChoice::from(cli.color.as_str()))
                .error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Update { file, dry_run } => commands::update::handle_update(&ctx, &file, dry_run),
        Commands::Resolve { references, format } => {
            let fmt = format::OutputFormat::from(format.as_str());
            commands::resolve::handle_resolve(&ctx, &references, fmt)
        }
        Commands::Tags {
            reference,
            format,
            limit,
        } => {
            let fmt = format::OutputFormat::from(format.as_str());
            commands::tags::handle_tags(&ctx, &reference, fmt, limit)
        }
        Commands::Version | Commands::Completion { .. } => ExitCode::SUCCESS,
    }
}
