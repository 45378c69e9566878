//! TrailDB CLI
//!
//! Command-line tools for inspecting finalized trail databases.
//!
//! # Commands
//!
//! - `inspect` - Display database metadata and per-field lexicon sizes
//! - `dump` - Print decoded events, per trail
//! - `lexicon` - Enumerate one field's lexicon
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// TrailDB command-line database tools.
#[derive(Parser)]
#[command(name = "tdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display database metadata and per-field lexicon sizes
    Inspect {
        /// Database base name (with or without the .tdb extension)
        db: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print decoded events, per trail
    Dump {
        /// Database base name (with or without the .tdb extension)
        db: String,

        /// Dump only this trail id
        #[arg(short, long)]
        trail: Option<u32>,

        /// Maximum number of events to print per trail
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Enumerate one field's lexicon
    Lexicon {
        /// Database base name (with or without the .tdb extension)
        db: String,

        /// Field name to enumerate
        #[arg(short, long)]
        field: String,

        /// Maximum number of values to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { db, format } => {
            commands::inspect::run(&db, &format)?;
        }
        Commands::Dump { db, trail, limit } => {
            commands::dump::run(&db, trail, limit)?;
        }
        Commands::Lexicon { db, field, limit } => {
            commands::lexicon::run(&db, &field, limit)?;
        }
        Commands::Version => {
            println!("TrailDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("TrailDB Core v{}", traildb_core::VERSION);
        }
    }

    Ok(())
}
