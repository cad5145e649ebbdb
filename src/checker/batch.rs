// src/checker/batch.rs
// =============================================================================
// This module drives many URL checks as one paced batch.
//
// How it works:
// 1. Split the input list into contiguous chunks (default: 3 URLs)
// 2. Before every chunk after the first, sleep a fixed delay (default: 1s)
//    so we don't trip the third-party proxies' rate limits
// 3. Within a chunk, resolve every URL concurrently
// 4. After each chunk, report overall progress as a percentage
//
// Ordering guarantee: each concurrent task returns its own (index, result)
// pair and this driver - the single owner of the item list - slots them back
// in, so output order always matches input order no matter which check
// finishes first. No shared mutable state between tasks.
//
// Cancellation: a CancelToken is checked between chunks. In-flight probes
// drain through their own timeouts; completed results (a prefix of the
// input, in order) are still returned.
//
// Rust concepts:
// - Generics over closures: The driver takes the resolve function as a
//   parameter, so tests can run it without any network
// - futures::future::join_all: Run a chunk's checks concurrently
// - Arc<AtomicBool>: A cheap, cloneable cancellation flag
// =============================================================================

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::checker::resolve::CheckResult;

// Pacing knobs for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// How many URLs are resolved concurrently per chunk
    pub chunk_size: usize,
    /// Pause inserted before every chunk after the first
    pub inter_chunk_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            inter_chunk_delay: Duration::from_millis(1000),
        }
    }
}

// A cloneable flag for stopping a batch between chunks
//
// All clones share the same flag, so any holder (e.g. a Ctrl-C handler)
// can cancel the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// Progress notifications emitted while a batch runs
//
// ItemStarted fires before an item's check is dispatched (its transient
// "checking" state), ItemCompleted when its result lands, and Progress after
// every chunk with the overall completion percentage.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    ItemStarted {
        index: usize,
    },
    ItemCompleted {
        index: usize,
        result: CheckResult,
    },
    Progress {
        completed: usize,
        total: usize,
        percent: f64,
    },
}

// Per-item lifecycle while the batch is in flight. Lives only for the
// duration of one run, never persisted.
#[derive(Debug, Clone)]
enum ItemState {
    Pending,
    Checking,
    Done(CheckResult),
}

#[derive(Debug, Clone)]
struct BatchItem {
    url: String,
    state: ItemState,
}

// Runs a batch of URL checks in rate-limited chunks
//
// Parameters:
//   urls: the URLs to check, in the order results should come back
//   options: chunk size and inter-chunk pacing
//   cancel: checked between chunks; cancelling returns the completed prefix
//   resolve_fn: maps one URL to its CheckResult (in production this is
//               Resolver::resolve; tests pass a stub)
//   on_event: observer for per-item and per-chunk progress
//
// Returns: completed CheckResults in input order. Each URL is attempted
// exactly once end-to-end - retry policy lives inside the resolver's tiers,
// never here.
pub async fn run_batch<F, Fut>(
    urls: Vec<String>,
    options: BatchOptions,
    cancel: CancelToken,
    resolve_fn: F,
    mut on_event: impl FnMut(BatchEvent),
) -> Vec<CheckResult>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = CheckResult>,
{
    let total = urls.len();
    let chunk_size = options.chunk_size.max(1);

    let mut items: Vec<BatchItem> = urls
        .into_iter()
        .map(|url| BatchItem {
            url,
            state: ItemState::Pending,
        })
        .collect();

    let mut completed = 0;
    let mut start = 0;

    while start < total {
        if cancel.is_cancelled() {
            tracing::debug!(completed, total, "batch cancelled between chunks");
            break;
        }

        // Pacing: every chunk after the first waits its turn
        if start > 0 {
            tokio::time::sleep(options.inter_chunk_delay).await;
        }

        let end = (start + chunk_size).min(total);
        tracing::debug!(start, end, total, "dispatching chunk");

        // Mark the whole chunk as checking before dispatch, so observers
        // see per-item progress, then build one future per item. Each
        // future yields its own (index, result) pair.
        let mut chunk_futures = Vec::with_capacity(end - start);
        for index in start..end {
            items[index].state = ItemState::Checking;
            on_event(BatchEvent::ItemStarted { index });

            let fut = resolve_fn(items[index].url.clone());
            chunk_futures.push(async move { (index, fut.await) });
        }

        // Run the chunk concurrently and slot results back by index
        for (index, result) in futures::future::join_all(chunk_futures).await {
            on_event(BatchEvent::ItemCompleted {
                index,
                result: result.clone(),
            });
            items[index].state = ItemState::Done(result);
        }

        completed += end - start;
        let percent = (completed as f64 / total as f64) * 100.0;
        on_event(BatchEvent::Progress {
            completed,
            total,
            percent,
        });

        start = end;
    }

    // Collect finished results in input order; on cancellation the
    // still-Pending tail is simply dropped
    items
        .into_iter()
        .filter_map(|item| match item.state {
            ItemState::Done(result) => Some(result),
            ItemState::Pending | ItemState::Checking => None,
        })
        .collect()
}
