use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_START_URL: &str = "https://www.crozilla-nekretnine.com/immobilien/haus-kaufen/";
pub const DEFAULT_ALLOWED_DOMAIN: &str = "www.crozilla-nekretnine.com";

/// Crawl settings owned by the surrounding system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrawlConfig {
    /// First search-results page
    pub start_url: String,
    /// Destination handed to the export sink; never read by the extractor
    pub connection_string: String,
    /// Label attached to every export of this crawl
    pub crawl_id: String,
    /// Maximum number of search-results pages to walk
    pub page_limit: Option<usize>,
    pub request_timeout_secs: u64,
    /// Hosts (and their subdomains) the crawler may follow; empty allows all
    pub allowed_domains: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            connection_string: "EXAMPLE_CONNECTION_STRING".to_string(),
            crawl_id: "DEFAULT".to_string(),
            page_limit: None,
            request_timeout_secs: 30,
            allowed_domains: vec![DEFAULT_ALLOWED_DOMAIN.to_string()],
        }
    }
}

impl CrawlConfig {
    /// Defaults overridden by `CROZILLA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("CROZILLA_URL") {
            config.start_url = url;
        }
        if let Some(connection_string) = lookup("CROZILLA_CONNECTION_STRING") {
            config.connection_string = connection_string;
        }
        if let Some(crawl_id) = lookup("CROZILLA_CRAWL_ID") {
            config.crawl_id = crawl_id;
        }
        if let Some(limit) = lookup("CROZILLA_PAGE_LIMIT") {
            let limit = limit
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid CROZILLA_PAGE_LIMIT: {limit:?}"))?;
            config.page_limit = Some(limit);
        }
        if let Some(timeout) = lookup("CROZILLA_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid CROZILLA_TIMEOUT_SECS: {timeout:?}"))?;
        }
        if let Some(domains) = lookup("CROZILLA_ALLOWED_DOMAINS") {
            config.allowed_domains = domains
                .split(',')
                .map(str::trim)
                .filter(|domain| !domain.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }
}
