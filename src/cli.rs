// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-sentinel",
    version = "0.1.0",
    about = "A CLI tool to check website availability, singly or in bulk",
    long_about = "site-sentinel checks whether URLs are reachable by probing them through CORS \
                  proxies with an opaque direct-probe fallback. Feed it one URL or a whole \
                  spreadsheet column and export the results as a CSV report."
)]
pub struct Cli {
    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (check, batch)
//
// Each variant represents a different subcommand the user can run
// The fields inside each variant become the arguments for that subcommand
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the availability of a single URL
    ///
    /// Example: site-sentinel check example.com
    Check {
        /// The URL to check (scheme optional - https:// is assumed)
        ///
        /// This is a positional argument (required, no flag needed)
        url: String,

        /// Output the result in JSON format instead of a summary card
        ///
        /// This is an optional flag: --json
        #[arg(long)]
        json: bool,
    },

    /// Check every URL listed in a tabular (CSV) file
    ///
    /// Example: site-sentinel batch sites.csv --output report.csv
    Batch {
        /// CSV file containing the URLs (the URL column is auto-detected
        /// from headers named url/site/website/link)
        file: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Write the results to a CSV report at this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// How many URLs to check concurrently per chunk
        ///
        /// Kept small on purpose: the third-party proxies rate-limit
        /// aggressive callers
        #[arg(long, default_value_t = 3)]
        chunk_size: usize,

        /// Pause between chunks, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}
