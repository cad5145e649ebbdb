// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Dispatch to the appropriate subcommand handler
// 3. Print results (card, table, or JSON) and optionally export a CSV report
// 4. Exit with proper code (0 = all online, 1 = offline found, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - probe, resolution chain, batch driver
mod cli; // src/cli.rs - command-line parsing
mod sheet; // src/sheet/ - CSV import and report export

// Import items we need from our modules
use checker::{
    run_batch, BatchEvent, BatchOptions, CancelToken, CheckResult, CheckStatus, Resolver,
};
use cli::{Cli, Commands};

use clap::Parser; // Parser trait enables the parse() method
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Diagnostics (RUST_LOG=debug) go to stderr so they never mix with the
    // table or JSON output on stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Run our application logic and capture the exit code
    // std::process::exit() terminates the program with the given code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = every checked URL is online
//   Ok(1) = at least one URL is offline
//   Ok(2) = internal error
//   Err = unexpected error
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    // Match on which subcommand was used
    match cli.command {
        Commands::Check { url, json } => handle_single_check(&url, json).await,
        Commands::Batch {
            file,
            json,
            output,
            chunk_size,
            delay_ms,
        } => handle_batch_check(&file, json, output.as_deref(), chunk_size, delay_ms).await,
    }
}

// Handles the 'check' subcommand: one URL, one verdict
async fn handle_single_check(url: &str, json: bool) -> Result<i32> {
    let resolver = Resolver::new()?;

    if !json {
        println!("🔍 Checking {}...", url);
    }

    let result = resolver.resolve(url).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_single_result(&result);
    }

    Ok(if result.is_online() { 0 } else { 1 })
}

// Handles the 'batch' subcommand
//
// Flow: import URLs from the file -> run the paced batch (streaming progress
// lines as items finish) -> print the table or JSON -> optionally export CSV
async fn handle_batch_check(
    file: &Path,
    json: bool,
    output: Option<&Path>,
    chunk_size: usize,
    delay_ms: u64,
) -> Result<i32> {
    // Import is all-or-nothing: a malformed file aborts before any checking
    let urls = sheet::read_url_file(file)?;

    if urls.is_empty() {
        // Warnings go to stderr; with --json stdout must stay a valid
        // JSON document (here: an empty result list)
        eprintln!("⚠️  No URLs found in {}", file.display());
        if json {
            println!("[]");
        }
        return Ok(0);
    }

    if !json {
        println!("📄 Loaded {} URL(s) from {}", urls.len(), file.display());
        println!("\n🌐 Checking in chunks of {}...\n", chunk_size.max(1));
    }

    let resolver = Arc::new(Resolver::new()?);
    let cancel = CancelToken::new();

    // Ctrl-C stops the run between chunks; whatever finished is still
    // reported and exported
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n⛔ Stopping after the current chunk...");
                cancel.cancel();
            }
        });
    }

    let options = BatchOptions {
        chunk_size,
        inter_chunk_delay: Duration::from_millis(delay_ms),
    };
    let total = urls.len();

    // The driver is generic over "how to resolve one URL" - here we plug in
    // the real resolver, shared across the chunk's concurrent tasks
    let resolve_fn = {
        let resolver = resolver.clone();
        move |url: String| {
            let resolver = resolver.clone();
            async move { resolver.resolve(&url).await }
        }
    };

    let results = run_batch(urls, options, cancel.clone(), resolve_fn, |event| {
        if json {
            return; // keep stdout clean for the JSON document
        }
        match event {
            BatchEvent::ItemStarted { .. } => {}
            BatchEvent::ItemCompleted { result, .. } => {
                println!(
                    "   {} {} ({}) in {}ms",
                    format_status(&result.status),
                    result.url,
                    result.display_code(),
                    result.elapsed_ms
                );
            }
            BatchEvent::Progress {
                completed,
                total,
                percent,
            } => {
                println!("📊 Progress: {}/{} ({:.0}%)", completed, total, percent);
            }
        }
    })
    .await;

    if cancel.is_cancelled() && results.len() < total {
        // stderr, like the Ctrl-C notice itself: stdout carries only the
        // table or the JSON document
        eprintln!(
            "\n⛔ Run cancelled: {} of {} URL(s) completed",
            results.len(),
            total
        );
    }

    if json {
        // Serialize results to JSON and print
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!();
        print_table(&results);
    }

    if let Some(path) = output {
        sheet::write_report(path, &results)?;
        let note = format!("💾 Report written to {}", path.display());
        if json {
            eprintln!("{note}");
        } else {
            println!("{note}");
        }
    }

    // Count how many URLs are offline to pick the exit code
    let offline_count = results.iter().filter(|r| !r.is_online()).count();

    if offline_count > 0 {
        Ok(1) // Exit code 1 = offline URLs found
    } else {
        Ok(0) // Exit code 0 = all good
    }
}

// Prints one result as a small card
fn print_single_result(result: &CheckResult) {
    match result.status {
        CheckStatus::Online => println!("\n✅ Site operational"),
        CheckStatus::Offline => println!("\n❌ Site unavailable"),
    }

    println!("   URL:     {}", result.url);
    println!("   Code:    {}", result.display_code());
    println!("   Time:    {}ms", result.elapsed_ms);
    println!("   Checked: {}", result.timestamp);

    if result.is_opaque {
        println!("   ⚠️  Verified via restricted (opaque) probing - real status code unknown");
    }
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &[CheckResult]) {
    // Print table header
    println!(
        "{:<50} {:<12} {:<18} {:<10} {:<10}",
        "URL", "STATUS", "CODE", "TIME", "CHECKED"
    );
    println!("{}", "=".repeat(102));

    // Print each result
    for result in results {
        // Truncate URL if too long for display
        let url_display = truncate_url(&result.url, 47);

        println!(
            "{:<50} {:<12} {:<18} {:<10} {:<10}",
            url_display,
            format_status(&result.status),
            result.display_code(),
            format!("{}ms", result.elapsed_ms),
            result.timestamp
        );
    }

    println!();

    // Print summary
    let online_count = results.iter().filter(|r| r.is_online()).count();
    let offline_count = results.len() - online_count;
    let opaque_count = results.iter().filter(|r| r.is_opaque).count();

    println!("📊 Summary:");
    println!("   ✅ Online: {}", online_count);
    println!("   ❌ Offline: {}", offline_count);
    if opaque_count > 0 {
        println!("   🔒 Restricted (status unknown): {}", opaque_count);
    }
    println!("   📋 Total: {}", results.len());
}

// Shortens a URL to at most `max_chars` characters (plus an ellipsis)
//
// Counts characters, not bytes: slicing a fixed byte index would panic in
// the middle of a multi-byte character, e.g. an internationalized domain
// name pasted into the sheet.
fn truncate_url(url: &str, max_chars: usize) -> String {
    match url.char_indices().nth(max_chars) {
        Some((boundary, _)) => format!("{}...", &url[..boundary]),
        None => url.to_string(),
    }
}

// Formats the status enum as a short labelled string
fn format_status(status: &CheckStatus) -> String {
    match status {
        CheckStatus::Online => "✅ Online".to_string(),
        CheckStatus::Offline => "❌ Offline".to_string(),
    }
}
