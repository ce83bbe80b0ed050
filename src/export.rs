use crate::models::ListingRecord;
use crate::scrapers::CrawlConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One crawl's listings, labelled with the crawl id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingExport {
    pub crawl_id: String,
    pub exported_at: DateTime<Utc>,
    pub listings: Vec<ListingRecord>,
}

/// Writes `<dir>/<crawl_id>.json` plus one file per listing under
/// `<dir>/<crawl_id>/`, where `<dir>` is the configured connection string.
/// Returns the path of the combined file.
pub async fn write_export(config: &CrawlConfig, listings: &[ListingRecord]) -> Result<PathBuf> {
    let root = Path::new(&config.connection_string);
    let crawl_id = file_stem(&config.crawl_id).unwrap_or_else(|| "crawl".to_string());

    tokio::fs::create_dir_all(root)
        .await
        .with_context(|| format!("Failed to create {}", root.display()))?;

    let export = ListingExport {
        crawl_id: config.crawl_id.clone(),
        exported_at: Utc::now(),
        listings: listings.to_vec(),
    };
    let combined = root.join(format!("{}.json", crawl_id));
    tokio::fs::write(&combined, serde_json::to_string_pretty(&export)?)
        .await
        .with_context(|| format!("Failed to write {}", combined.display()))?;
    info!("💾 Saved {} listings to {}", listings.len(), combined.display());

    let listing_dir = root.join(&crawl_id);
    tokio::fs::create_dir_all(&listing_dir).await?;
    let mut used_names = HashSet::new();
    for (i, listing) in listings.iter().enumerate() {
        let mut name = listing_file_name(listing).unwrap_or_else(|| format!("listing_{}", i));
        if !used_names.insert(name.clone()) {
            let unique = format!("{}_{}", name, i);
            warn!("Duplicate listing file name {}, writing {} instead", name, unique);
            used_names.insert(unique.clone());
            name = unique;
        }
        let path = listing_dir.join(format!("{}.json", name));
        tokio::fs::write(&path, serde_json::to_string_pretty(listing)?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    info!(
        "💾 Saved {} individual listing files to {}",
        listings.len(),
        listing_dir.display()
    );

    Ok(combined)
}

/// Crozilla id, or the last URL segment when the page had none
fn listing_file_name(listing: &ListingRecord) -> Option<String> {
    file_stem(&listing.crozilla_id).or_else(|| {
        listing
            .url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(file_stem)
    })
}

fn file_stem(raw: &str) -> Option<String> {
    let stem: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    (!stem.is_empty()).then_some(stem)
}
