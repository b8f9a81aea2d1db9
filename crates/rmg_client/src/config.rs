use std::time::Duration;

use rmg_core::{Error, Result};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variables consulted for the backend URL, in order.
pub const API_URL_VARS: &[&str] = &["RMG_API_URL", "NEXT_PUBLIC_API_URL"];

/// Per-endpoint deadlines. Slow endpoints (ingestion, AI calls) get more room.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    pub health: Duration,
    pub sources: Duration,
    pub news: Duration,
    pub fetch_news: Duration,
    pub headlines: Duration,
    pub trending: Duration,
    pub insights: Duration,
    pub analyze: Duration,
    pub sentiment: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(15),
            sources: Duration::from_secs(15),
            news: Duration::from_secs(30),
            fetch_news: Duration::from_secs(120),
            headlines: Duration::from_secs(30),
            trending: Duration::from_secs(60),
            insights: Duration::from_secs(90),
            analyze: Duration::from_secs(60),
            sentiment: Duration::from_secs(30),
        }
    }
}

impl Timeouts {
    /// Same deadline for every endpoint.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            health: timeout,
            sources: timeout,
            news: timeout,
            fetch_news: timeout,
            headlines: timeout,
            trending: timeout,
            insights: timeout,
            analyze: timeout,
            sentiment: timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeouts: Timeouts::default(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let base_url = API_URL_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(&base_url)
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeouts: Timeouts::default(),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::Config(format!(
                "unsupported scheme '{}' in API URL {}",
                other, raw
            )))
        }
    }
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(format!("{} cannot be used as a base URL", raw)));
    }
    Ok(url)
}
