use std::env;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_PAGE_SIZE: u32 = 6;
const DEFAULT_DEBOUNCE_MS: u64 = 350;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = lookup("API_KEY").filter(|key| !key.trim().is_empty());

        let page_size = match lookup("PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("PAGE_SIZE must be a positive integer, got {raw:?}"))?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be greater than zero");
        }

        let debounce_ms = match lookup("SEARCH_DEBOUNCE_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SEARCH_DEBOUNCE_MS must be an integer, got {raw:?}"))?,
            None => DEFAULT_DEBOUNCE_MS,
        };

        Ok(Self {
            api_url,
            api_key,
            page_size,
            search_debounce: Duration::from_millis(debounce_ms),
        })
    }

    /// Defaults pointing at a given server; used when no environment applies.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}
