pub mod crozilla;
pub mod extract;
pub mod pagination;
pub mod table;
pub mod traits;
pub mod types;

pub use crozilla::{parse_listing_page, CrawlReport, CrozillaScraper};
pub use extract::{extract_listing, NumberFormat};
pub use pagination::SearchPage;
pub use table::{decompose_address, Address, FieldTable, TableReader};
pub use traits::ScraperTrait;
pub use types::CrawlConfig;
