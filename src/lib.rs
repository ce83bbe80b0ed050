pub mod error;
pub mod export;
pub mod models;
pub mod scrapers;

pub use error::{ParseError, ParseResult};
pub use models::{ListingRecord, TransactionType};
