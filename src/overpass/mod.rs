mod client;
mod fetch;
mod query;

use std::time::Duration;

pub use client::*;
pub use fetch::*;
pub use query::*;
use ureq::Agent;

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Client-side request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking Overpass API client.
#[derive(Clone)]
pub struct OverpassClient {
    url: String,
    agent: Agent,
}

impl Default for OverpassClient {
    fn default() -> Self {
        OverpassClient::new(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }
}

impl OverpassClient {
    pub fn new(url: &str, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let agent: Agent = config.into();
        OverpassClient {
            agent,
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }
}
