use crozilla_scout::export::write_export;
use crozilla_scout::scrapers::{CrawlConfig, CrozillaScraper, ScraperTrait};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = CrawlConfig::from_env()?;
    let scraper = CrozillaScraper::with_config(config)?;

    info!("🏠 Crozilla Scout - {} crawler", scraper.source_name());
    info!("==========================================");
    info!("Crawl id: {}", scraper.config().crawl_id);

    let report = scraper.crawl().await?;

    info!(
        "✅ Scraped {} listings from {} search pages ({} pages skipped)",
        report.listings.len(),
        report.search_pages,
        report.failed_pages
    );

    for (i, listing) in report.listings.iter().enumerate() {
        println!("{}. {} ({} {})", i + 1, listing.title, listing.price, listing.currency);
        println!(
            "   {} {}, {} Zimmer, {} m²",
            listing.property_type,
            listing.transaction_type,
            listing.rooms,
            listing.living_area
        );
        println!("   {} {} {}", listing.zip_code, listing.city, listing.district);
        println!("   ID: {}", listing.crozilla_id);
        println!("   URL: {}", listing.url);
        println!();
    }

    write_export(scraper.config(), &report.listings).await?;

    Ok(())
}
