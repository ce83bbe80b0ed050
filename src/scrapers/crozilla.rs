use crate::error::ParseResult;
use crate::models::ListingRecord;
use crate::scrapers::extract::{extract_listing, NumberFormat};
use crate::scrapers::pagination::SearchPage;
use crate::scrapers::table::TableReader;
use crate::scrapers::traits::ScraperTrait;
use crate::scrapers::types::CrawlConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub listings: Vec<ListingRecord>,
    pub search_pages: usize,
    pub failed_pages: usize,
}

/// Crozilla crawler: walks the search results and parses every listing page
pub struct CrozillaScraper {
    client: Client,
    config: CrawlConfig,
    number_format: NumberFormat,
}

impl CrozillaScraper {
    /// Create a new scraper with the default search URL
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlConfig::default())
    }

    pub fn with_config(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(config, client))
    }

    /// Use a prebuilt client, e.g. one with custom proxy or TLS settings
    pub fn with_client(config: CrawlConfig, client: Client) -> Self {
        Self {
            client,
            config,
            number_format: NumberFormat::GERMAN,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Follows `›` links from the start page until none is left, a page
    /// repeats, or the page limit is hit. Failed pages are logged and counted.
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let start = Url::parse(&self.config.start_url)
            .with_context(|| format!("Invalid start URL: {}", self.config.start_url))?;
        info!("starting: {}", start);

        let mut queue = VecDeque::from([start]);
        let mut visited = HashSet::new();
        let mut report = CrawlReport::default();

        while let Some(page_url) = queue.pop_front() {
            if let Some(limit) = self.config.page_limit {
                if report.search_pages >= limit {
                    info!("Reached page limit of {}", limit);
                    break;
                }
            }
            if !visited.insert(page_url.clone()) {
                debug!("Already visited {}", page_url);
                continue;
            }

            let mut page = match self.fetch_search_page(&page_url).await {
                Ok(page) => page,
                Err(err) => {
                    warn!("Failed search page {}: {:#}", page_url, err);
                    report.failed_pages += 1;
                    continue;
                }
            };
            report.search_pages += 1;
            page.retain_allowed(&self.config.allowed_domains);
            info!("Found {} listings on {}", page.listings.len(), page_url);

            for listing_url in &page.listings {
                match self.fetch_listing(listing_url).await {
                    Ok(listing) => {
                        debug!("Parsed listing {} ({})", listing.crozilla_id, listing.url);
                        report.listings.push(listing);
                    }
                    Err(err) => {
                        warn!("Skipping listing {}: {:#}", listing_url, err);
                        report.failed_pages += 1;
                    }
                }
            }

            if let Some(next_page) = page.next_page {
                queue.push_back(next_page);
            }
        }

        info!(
            "Crawl finished: {} listings from {} search pages, {} failed pages",
            report.listings.len(),
            report.search_pages,
            report.failed_pages
        );
        Ok(report)
    }

    async fn fetch_search_page(&self, url: &Url) -> Result<SearchPage> {
        let html = self.fetch(url).await?;
        SearchPage::from_html(&html, url).context("Failed to parse search page")
    }

    async fn fetch_listing(&self, url: &Url) -> Result<ListingRecord> {
        let html = self.fetch(url).await?;
        parse_listing_page(&html, url.as_str(), &self.number_format)
            .context("Failed to parse listing page")
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }
}

#[async_trait]
impl ScraperTrait for CrozillaScraper {
    async fn scrape(&self) -> Result<Vec<ListingRecord>> {
        Ok(self.crawl().await?.listings)
    }

    fn source_name(&self) -> &'static str {
        "Crozilla"
    }
}

/// Parses one listing page into its record.
///
/// Only a missing title or broker fails the page.
pub fn parse_listing_page(
    html: &str,
    url: &str,
    number_format: &NumberFormat,
) -> ParseResult<ListingRecord> {
    let document = Html::parse_document(html);
    let reader = TableReader::new(&document)?;
    Ok(extract_listing(reader.fields(), url, number_format))
}
