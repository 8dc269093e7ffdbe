//! Spritesort: batch sprite classification and filing.
//!
//! Spritesort walks a directory tree of sprite images, asks a multimodal
//! model what each one depicts, sanitizes the free-text reply into a
//! filesystem-safe label, and copies the image into a letter-bucketed
//! output tree under a collision-free name.
//!
//! # Modules
//!
//! - [`api`]: classification client, rate limiting, and retry policy
//! - [`organize`]: directory walking, label sanitization, placement
//! - [`credentials`]: ordered API key resolution
//! - [`error`]: error types for spritesort operations

pub mod api;
pub mod credentials;
pub mod error;
pub mod organize;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use api::client::{ClassifierClient, ClassifierConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use api::limit::RateLimiter;
use api::retry::RetryPolicy;
use organize::{OrganizeOptions, OrganizeReport};

pub use error::SpritesortError;

/// The spritesort CLI application.
#[derive(Parser)]
#[command(name = "spritesort")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Classify every sprite under SOURCE and copy it into DEST buckets.
    Organize(OrganizeArgs),
}

/// Arguments for the organize subcommand.
#[derive(clap::Args)]
struct OrganizeArgs {
    /// Source directory: single-letter subdirectories and/or loose PNGs.
    source: PathBuf,

    /// Destination root for the letter buckets.
    dest: PathBuf,

    /// Model identifier sent to the gateway.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request quota in requests per minute.
    #[arg(long, default_value_t = 15)]
    rpm: u32,

    /// Attempts per image, counting the first.
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Local untracked secrets file (JSON).
    #[arg(long, default_value = "secret_keys.json")]
    secrets: PathBuf,

    /// Skip buckets that sort before this letter (e.g. 'm' to skip a-l).
    #[arg(long)]
    start_at: Option<char>,
}

/// Run the spritesort CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), SpritesortError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Organize(args)) => run_organize(args),
        None => {
            println!("spritesort {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Batch sprite classification and filing.");
            println!();
            println!("Run 'spritesort --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the organize subcommand.
fn run_organize(args: OrganizeArgs) -> Result<(), SpritesortError> {
    if !args.source.is_dir() {
        return Err(SpritesortError::SourceNotFound { path: args.source });
    }

    if let Some(letter) = args.start_at {
        if !letter.is_ascii_alphabetic() {
            return Err(SpritesortError::InvalidOptions {
                message: format!("--start-at must be a letter, got '{letter}'"),
            });
        }
    }

    let sources = credentials::default_sources(&args.secrets);
    let api_key = credentials::resolve_api_key(&sources)?;

    let classifier = ClassifierClient::new(ClassifierConfig {
        base_url: args.base_url,
        model: args.model,
        api_key,
    });
    let policy = RetryPolicy::with_max_attempts(args.retries);
    let mut limiter = RateLimiter::from_quota(args.rpm);

    let options = OrganizeOptions {
        source_root: args.source,
        dest_root: args.dest,
        start_at: args.start_at.map(|c| c.to_ascii_lowercase()),
    };

    let report = organize::run(&classifier, &policy, &mut limiter, &options)?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &OrganizeReport) {
    println!(
        "Done: {} processed, {} copied, {} fallback label(s), {} skipped",
        report.processed, report.copied, report.fallbacks, report.skipped
    );
}
