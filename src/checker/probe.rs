// src/checker/probe.rs
// =============================================================================
// This module performs a single bounded-time HTTP probe.
//
// Key functionality:
// - Makes one GET request against an endpoint (a proxy URL or the target)
// - Enforces a caller-supplied timeout by dropping the in-flight request
// - Classifies the outcome: "got an HTTP response" vs "no connection at all"
//
// The critical rule lives here: receiving a 404 or 500 is a CONNECTION, not a
// network failure. Only transport-level problems (DNS, refused, timeout)
// count as NoConnection. A naive checker that lumps them together reports
// perfectly-reachable sites as dead.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Enums: To represent probe modes and outcomes
// - tokio::time::timeout: To bound how long we wait for a response
// =============================================================================

use anyhow::Result;
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;

// How the probe is allowed to look at the response
//
// Transparent: we read the real status code (the endpoint cooperates, e.g. a
// CORS proxy relaying the target's response to us).
// Opaque: we deliberately treat the response as unreadable - the only signal
// is whether the request completed at all. This mirrors a browser's no-cors
// fetch, where a completed request proves the host is alive even though the
// status is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    Transparent,
    Opaque,
}

// The classified result of one probe attempt
//
// Connected means "the remote answered with SOME HTTP response" - including
// 4xx and 5xx. NoConnection means "nobody answered" (timeout, DNS failure,
// connection refused, TLS failure, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected {
        /// Whether the response had a 2xx status
        http_ok: bool,
        /// The numeric status code; None in opaque mode, where the status
        /// is deliberately not inspected
        http_status: Option<u16>,
    },
    NoConnection,
}

// Issues probes through a shared HTTP client
//
// The client is cheap to clone (internally reference-counted), so one Prober
// serves any number of concurrent probes.
pub struct Prober {
    client: Client,
}

impl Prober {
    // Creates a prober with a reusable HTTP client
    //
    // No client-level timeout is set here: each probe call supplies its own
    // deadline, and different tiers use different ones.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5)) // Follow up to 5 redirects
            .build()?;

        Ok(Self { client })
    }

    // Performs one bounded-time GET against `endpoint`
    //
    // Parameters:
    //   endpoint: the full URL to request (proxy URL or the target itself)
    //   mode: Transparent (status readable) or Opaque (completion-only)
    //   deadline: how long to wait before giving up
    //
    // Returns: ProbeOutcome - never an error. Every transport failure,
    // including the timeout itself, collapses into NoConnection. Retry
    // policy belongs to the caller, not here.
    pub async fn probe(&self, endpoint: &str, mode: ProbeMode, deadline: Duration) -> ProbeOutcome {
        let request = self.client.get(endpoint).send();

        // Wrapping the send in tokio's timeout aborts the request when the
        // deadline passes: the future is dropped, which tears down the
        // in-flight connection.
        match timeout(deadline, request).await {
            Ok(Ok(response)) => match mode {
                ProbeMode::Transparent => {
                    let status = response.status();
                    tracing::debug!(endpoint, status = status.as_u16(), "probe connected");
                    ProbeOutcome::Connected {
                        http_ok: status.is_success(),
                        http_status: Some(status.as_u16()),
                    }
                }
                ProbeMode::Opaque => {
                    // The request completed, which is all we are allowed to
                    // observe in opaque mode. The status stays unread.
                    tracing::debug!(endpoint, "opaque probe completed");
                    ProbeOutcome::Connected {
                        http_ok: true,
                        http_status: None,
                    }
                }
            },
            Ok(Err(error)) => {
                // Transport-level failure: DNS, refused, TLS, reset, ...
                tracing::debug!(endpoint, %error, "probe failed to connect");
                ProbeOutcome::NoConnection
            }
            Err(_) => {
                // The deadline elapsed before any response arrived
                tracing::debug!(endpoint, ?deadline, "probe timed out");
                ProbeOutcome::NoConnection
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Option<u16> for the status?
//    - In opaque mode there is no observable status code by definition
//    - Option makes "no status available" explicit instead of using a
//      magic number like 0
//
// 2. What does tokio::time::timeout do?
//    - Races a future against a timer
//    - Ok(inner) = the future finished in time (inner is ITS result)
//    - Err(_) = the timer won; the future is dropped, cancelling the request
//    - That's why we match on two layers of Result above
//
// 3. Why does probe() not return Result?
//    - A failed probe is a perfectly normal, expected outcome
//    - Encoding it as data (NoConnection) keeps the fallback logic in the
//      resolver simple: no error plumbing, just values
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Spawns a tiny local HTTP server that answers every request with the
    // given status line, and returns its URL. Keeps the tests deterministic -
    // no internet access needed.
    async fn spawn_http_server(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    // Read (and discard) the request before answering
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;

                    let response = format!(
                        "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}/")
    }

    // Returns a URL on which nothing is listening (bind, grab the port,
    // drop the listener), so connections are refused immediately.
    async fn refused_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_transparent_success() {
        let endpoint = spawn_http_server("200 OK").await;
        let prober = Prober::new().unwrap();

        let outcome = prober
            .probe(&endpoint, ProbeMode::Transparent, Duration::from_secs(5))
            .await;

        assert_eq!(
            outcome,
            ProbeOutcome::Connected {
                http_ok: true,
                http_status: Some(200),
            }
        );
    }

    #[tokio::test]
    async fn test_transparent_http_error_is_still_connected() {
        // A 404 means the remote ANSWERED - it must never look like a
        // network failure
        let endpoint = spawn_http_server("404 Not Found").await;
        let prober = Prober::new().unwrap();

        let outcome = prober
            .probe(&endpoint, ProbeMode::Transparent, Duration::from_secs(5))
            .await;

        assert_eq!(
            outcome,
            ProbeOutcome::Connected {
                http_ok: false,
                http_status: Some(404),
            }
        );
    }

    #[tokio::test]
    async fn test_transparent_server_error_is_still_connected() {
        let endpoint = spawn_http_server("500 Internal Server Error").await;
        let prober = Prober::new().unwrap();

        let outcome = prober
            .probe(&endpoint, ProbeMode::Transparent, Duration::from_secs(5))
            .await;

        assert_eq!(
            outcome,
            ProbeOutcome::Connected {
                http_ok: false,
                http_status: Some(500),
            }
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_no_connection() {
        let endpoint = refused_endpoint().await;
        let prober = Prober::new().unwrap();

        let outcome = prober
            .probe(&endpoint, ProbeMode::Transparent, Duration::from_secs(5))
            .await;

        assert_eq!(outcome, ProbeOutcome::NoConnection);
    }

    #[tokio::test]
    async fn test_opaque_completion_counts_as_connected_without_status() {
        // Even a 500 counts as success in opaque mode: the request
        // completed, so the host is alive - that's all we may observe
        let endpoint = spawn_http_server("500 Internal Server Error").await;
        let prober = Prober::new().unwrap();

        let outcome = prober
            .probe(&endpoint, ProbeMode::Opaque, Duration::from_secs(5))
            .await;

        assert_eq!(
            outcome,
            ProbeOutcome::Connected {
                http_ok: true,
                http_status: None,
            }
        );
    }

    #[tokio::test]
    async fn test_opaque_refused_is_no_connection() {
        let endpoint = refused_endpoint().await;
        let prober = Prober::new().unwrap();

        let outcome = prober
            .probe(&endpoint, ProbeMode::Opaque, Duration::from_secs(5))
            .await;

        assert_eq!(outcome, ProbeOutcome::NoConnection);
    }

    #[tokio::test]
    async fn test_timeout_is_no_connection() {
        // A server that accepts the connection but never responds
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            // Hold the socket open without writing anything
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let prober = Prober::new().unwrap();
        let outcome = prober
            .probe(
                &format!("http://{addr}/"),
                ProbeMode::Transparent,
                Duration::from_millis(200),
            )
            .await;

        assert_eq!(outcome, ProbeOutcome::NoConnection);
    }
}
