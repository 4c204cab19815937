//! MobileDB CLI
//!
//! Command-line tools for MobileDB store files.
//!
//! # Commands
//!
//! - `inspect` - Display record counts and timestamps of a store file
//! - `verify` - Check every line of a store file
//! - `dump` - Print the records of a store file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// MobileDB command-line store tools.
#[derive(Parser)]
#[command(name = "mobiledb")]
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
    /// Display store file statistics
    Inspect {
        /// Path to the store file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify store file integrity
    Verify {
        /// Path to the store file
        file: PathBuf,
    },

    /// Dump store records for debugging
    Dump {
        /// Path to the store file
        file: PathBuf,

        /// Maximum number of records to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip this many records first
        #[arg(short, long, default_value = "0")]
        offset: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { file, format } => {
            commands::inspect::run(&file, &format)?;
        }
        Commands::Verify { file } => {
            commands::verify::run(&file)?;
        }
        Commands::Dump {
            file,
            limit,
            offset,
            format,
        } => {
            commands::dump::run(&file, limit, offset, &format)?;
        }
        Commands::Version => {
            println!("MobileDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("MobileDB Core v{}", mobiledb_core::VERSION);
        }
    }

    Ok(())
}
