use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use super::{QueryRequest, QueryService, snapshot_path};
use crate::error::FetchError;
use crate::types::{Category, OverpassResponse};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Result of fetching one category. `response` is `None` when every attempt
/// failed.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub category: Category,
    pub response: Option<OverpassResponse>,
    pub attempts: u32,
}

impl FetchOutcome {
    pub fn failed(&self) -> bool {
        self.response.is_none()
    }
}

/// Runs queries with a bounded retry loop and optionally keeps the raw
/// responses on disk.
pub struct Fetcher<'a, S: QueryService + ?Sized> {
    service: &'a S,
    policy: RetryPolicy,
    snapshot_dir: Option<PathBuf>,
}

impl<'a, S: QueryService + ?Sized> Fetcher<'a, S> {
    pub fn new(service: &'a S, policy: RetryPolicy) -> Self {
        Self {
            service,
            policy,
            snapshot_dir: None,
        }
    }

    /// Write each successful response to `<dir>/<category>.json`.
    pub fn with_snapshots(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches and parses one category. Never fails: exhausted retries come
    /// back as an outcome without a response.
    pub fn fetch(&self, category: Category, query: &str) -> FetchOutcome {
        let request = QueryRequest { category, query };
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            info!("Fetching {category} (attempt {attempt}/{max_attempts})");
            match self.attempt(&request) {
                Ok((body, response)) => {
                    if let Some(remark) = &response.remark {
                        warn!("Server remark for {category}: {remark}");
                    }
                    info!(
                        "Fetched {category}: {} elements",
                        response.elements.len()
                    );
                    self.save_snapshot(category, &body);
                    return FetchOutcome {
                        category,
                        response: Some(response),
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    if let FetchError::Status { status: 429, .. } = &e {
                        warn!("Rate limited while fetching {category}");
                    }
                    warn!("Attempt {attempt}/{max_attempts} for {category} failed: {e}");
                    if attempt < max_attempts && !self.policy.backoff.is_zero() {
                        std::thread::sleep(self.policy.backoff);
                    }
                }
            }
        }

        warn!("Giving up on {category} after {max_attempts} attempts");
        FetchOutcome {
            category,
            response: None,
            attempts: max_attempts,
        }
    }

    fn attempt(
        &self,
        request: &QueryRequest<'_>,
    ) -> Result<(String, OverpassResponse), FetchError> {
        let body = self.service.execute(request)?;
        let response = serde_json::from_str(&body)?;
        Ok((body, response))
    }

    fn save_snapshot(&self, category: Category, body: &str) {
        let Some(dir) = &self.snapshot_dir else {
            return;
        };
        let path = snapshot_path(dir, category);
        match write_snapshot(&path, body) {
            Ok(()) => info!("Saved raw {category} response to {}", path.display()),
            Err(e) => warn!("Could not save {}: {e}", path.display()),
        }
    }
}

/// One-shot form of [`Fetcher::fetch`].
pub fn fetch_with_retry<S: QueryService + ?Sized>(
    service: &S,
    policy: RetryPolicy,
    category: Category,
    query: &str,
    snapshot_dir: Option<&Path>,
) -> FetchOutcome {
    let mut fetcher = Fetcher::new(service, policy);
    if let Some(dir) = snapshot_dir {
        fetcher = fetcher.with_snapshots(dir);
    }
    fetcher.fetch(category, query)
}

/// Writes the whole server document, re-indented. Keys the response model
/// does not know about are kept.
fn write_snapshot(path: &Path, body: &str) -> std::io::Result<()> {
    let json = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(document) => serde_json::to_string_pretty(&document)?,
        Err(_) => body.to_string(),
    };
    fs::write(path, json)
}
