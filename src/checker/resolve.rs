// src/checker/resolve.rs
// =============================================================================
// This module resolves one URL into a final availability verdict.
//
// The ordered fallback chain:
// 1. Tier A: primary CORS proxy (transparent, 10s timeout)
// 2. Tier B: backup CORS proxy (transparent, 10s timeout) - only if Tier A
//    failed at the NETWORK level (a 404 from Tier A is final!)
// 3. Tier C: opaque probe straight at the target (5s timeout) - only if both
//    proxies were unreachable. This rescues sites that block proxies but are
//    perfectly alive (think large social networks).
//
// Any HTTP response from a proxy tier ends the chain: 2xx -> Online, other
// codes -> Offline with the real numeric code. Only when no proxy connects
// do we fall through to the opaque probe, whose success is reported with a
// special "restricted" marker because the real status stays unknown.
//
// Rust concepts:
// - Struct composition: Resolver owns a Prober and a config
// - Instant/Duration: For elapsed-time measurement
// - serde derives: So results can be rendered as JSON
// =============================================================================

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::checker::probe::{ProbeMode, ProbeOutcome, Prober};

/// Code reported when only the opaque probe succeeded: the target is
/// reachable, but its real status code is unknowable through that path.
pub const RESTRICTED_SUCCESS_CODE: &str = "200 (Restricted)";

/// Code reported when every tier failed at the transport level.
pub const TIMEOUT_DNS_CODE: &str = "TIMEOUT/DNS";

/// Fallback code for a connection without a readable status. Shouldn't
/// happen on the transparent path, but the type system allows it.
pub const UNKNOWN_ERROR_CODE: &str = "ERR";

// Default proxy endpoints. `{url}` is replaced with the percent-encoded
// target; `{now}` with a millisecond timestamp (cache buster - the backup
// proxy caches aggressively without it).
const PRIMARY_PROXY_TEMPLATE: &str = "https://corsproxy.io/?{url}";
const BACKUP_PROXY_TEMPLATE: &str = "https://api.allorigins.win/raw?url={url}&timestamp={now}";

// Normalizes a raw URL string
//
// Users paste things like "example.com" - we trim whitespace and prepend
// https:// unless a scheme is already present. URLs that already start with
// http:// or https:// pass through untouched.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

// A proxy endpoint described as a URL template
//
// Keeping the template as data (instead of hardcoding request building)
// lets tests point tiers at local servers.
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    template: String,
}

impl ProxyEndpoint {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    // Builds the concrete proxy URL for a target
    //
    // The target is percent-encoded so it survives as a query value
    // (the equivalent of encodeURIComponent).
    pub fn url_for(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        self.template
            .replace("{url}", &encoded)
            .replace("{now}", &chrono::Utc::now().timestamp_millis().to_string())
    }
}

// Tunable knobs of the resolution chain
//
// Defaults match the production behavior; tests override them to point at
// local listeners and to shrink the pacing delay.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub primary: ProxyEndpoint,
    pub backup: ProxyEndpoint,
    /// Timeout for each transparent proxy tier
    pub proxy_timeout: Duration,
    /// Timeout for the opaque direct tier
    pub direct_timeout: Duration,
    /// Pause between Tier A failing and Tier B starting, so we don't
    /// hammer two proxies back to back
    pub inter_tier_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary: ProxyEndpoint::new(PRIMARY_PROXY_TEMPLATE),
            backup: ProxyEndpoint::new(BACKUP_PROXY_TEMPLATE),
            proxy_timeout: Duration::from_secs(10),
            direct_timeout: Duration::from_secs(5),
            inter_tier_delay: Duration::from_millis(200),
        }
    }
}

// The final verdict for one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Online,
    Offline,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Online => write!(f, "Online"),
            CheckStatus::Offline => write!(f, "Offline"),
        }
    }
}

// Everything we know about one completed check
//
// `code` is a best-effort diagnostic string: a numeric HTTP status from a
// proxy tier, the restricted-success marker, or TIMEOUT/DNS. It is not
// guaranteed machine-parseable across tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The normalized URL that was checked
    pub url: String,
    pub status: CheckStatus,
    pub code: String,
    /// Wall time spent across all tiers, in milliseconds
    #[serde(rename = "time")]
    pub elapsed_ms: u64,
    /// Local wall-clock time of the check (HH:MM:SS)
    pub timestamp: String,
    /// True only when the verdict came from the opaque fallback tier,
    /// meaning the real status code is unknown
    pub is_opaque: bool,
}

impl CheckResult {
    pub fn is_online(&self) -> bool {
        self.status == CheckStatus::Online
    }

    // The code as it should be shown to users and written to exports:
    // opaque results always render the restricted-success marker, never
    // any internal value.
    pub fn display_code(&self) -> &str {
        if self.is_opaque {
            RESTRICTED_SUCCESS_CODE
        } else {
            &self.code
        }
    }
}

// Runs the full fallback chain for single URLs
pub struct Resolver {
    prober: Prober,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new() -> Result<Self> {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        Ok(Self {
            prober: Prober::new()?,
            config,
        })
    }

    // Resolves one raw URL into a CheckResult
    //
    // This function never fails: every network problem is folded into the
    // result record. Callers only ever see completed CheckResults.
    pub async fn resolve(&self, raw_url: &str) -> CheckResult {
        let url = normalize_url(raw_url);
        let started = Instant::now();

        // Tier A: primary proxy
        let mut proxy_outcome = self
            .prober
            .probe(
                &self.config.primary.url_for(&url),
                ProbeMode::Transparent,
                self.config.proxy_timeout,
            )
            .await;

        // Tier B: backup proxy - only when Tier A failed at the network
        // level. An HTTP error from Tier A is an answer, not a failure.
        if proxy_outcome == ProbeOutcome::NoConnection {
            tracing::debug!(%url, "primary proxy unreachable, trying backup");
            tokio::time::sleep(self.config.inter_tier_delay).await;
            proxy_outcome = self
                .prober
                .probe(
                    &self.config.backup.url_for(&url),
                    ProbeMode::Transparent,
                    self.config.proxy_timeout,
                )
                .await;
        }

        let (status, code, is_opaque) = match proxy_outcome {
            ProbeOutcome::Connected {
                http_ok,
                http_status,
            } => {
                // A proxy connected: its response is final, whatever the code
                let code = http_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string());
                let status = if http_ok {
                    CheckStatus::Online
                } else {
                    CheckStatus::Offline
                };
                (status, code, false)
            }
            ProbeOutcome::NoConnection => {
                // Tier C: both proxies unreachable (or blocked by the
                // provider) - probe the target directly in opaque mode.
                tracing::debug!(%url, "both proxies unreachable, trying opaque direct probe");
                match self
                    .prober
                    .probe(&url, ProbeMode::Opaque, self.config.direct_timeout)
                    .await
                {
                    ProbeOutcome::Connected { .. } => {
                        (CheckStatus::Online, RESTRICTED_SUCCESS_CODE.to_string(), true)
                    }
                    ProbeOutcome::NoConnection => {
                        (CheckStatus::Offline, TIMEOUT_DNS_CODE.to_string(), false)
                    }
                }
            }
        };

        CheckResult {
            url,
            status,
            code,
            elapsed_ms: started.elapsed().as_millis() as u64,
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            is_opaque,
        }
    }
}
