// src/checker/mod.rs
// =============================================================================
// This module contains the availability-checking core.
//
// Submodules:
// - probe: One bounded-time HTTP attempt, classified as connected or not
// - resolve: The ordered fallback chain (primary proxy -> backup proxy ->
//   opaque direct probe) producing a CheckResult per URL
// - batch: Chunked, paced, concurrent execution of many resolutions
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod batch;
mod probe;
mod resolve;

// Re-export public items from submodules
// This lets users write `checker::run_batch()` instead of
// `checker::batch::run_batch()`
pub use batch::{run_batch, BatchEvent, BatchOptions, CancelToken};
pub use resolve::{CheckResult, CheckStatus, Resolver, RESTRICTED_SUCCESS_CODE};
