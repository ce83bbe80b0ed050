use crate::models::ListingRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for listing sources
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Walk the source and return every listing that parsed
    async fn scrape(&self) -> Result<Vec<ListingRecord>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
