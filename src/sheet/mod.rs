// src/sheet/mod.rs
// =============================================================================
// This module is the tabular-file collaborator around the checking core.
//
// Submodules:
// - import: Reads a CSV file and extracts the URL column from it
// - export: Writes finished results back out as a CSV report
//
// The core never touches files: it receives plain URL strings from here and
// hands back CheckResult records for export.
// =============================================================================

mod export;
mod import;

pub use export::write_report;
pub use import::read_url_file;
