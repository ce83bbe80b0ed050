use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Kauf,
    Miete,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kauf => "KAUF",
            Self::Miete => "MIETE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed Crozilla listing page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub crozilla_id: String,
    pub title: String,
    pub url: String,
    pub broker: String,
    pub broker_url: String,
    pub image_src: String,
    pub price: Decimal,
    pub currency: String,
    pub living_area: Decimal,
    pub area: Decimal,
    pub rooms: Decimal,
    pub bathrooms: Decimal,
    pub year_built: Decimal,
    #[serde(rename = "type")]
    pub property_type: String,
    pub transaction_type: TransactionType,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub district: String,
    pub federal_state: String,
    pub country: String,
    pub features: Vec<String>,
    pub balcony: bool,
    pub garden: bool,
    pub kitchen: bool,
    pub cellar: bool,
}
