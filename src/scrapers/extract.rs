use crate::models::{ListingRecord, TransactionType};
use crate::scrapers::table::FieldTable;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const CURRENCY: &str = "EUR";
pub const COUNTRY: &str = "Kroatien";

const LABEL_ID: &str = "Crozilla ID";
const LABEL_PRICE: &str = "Preis";
const LABEL_LIVING_AREA: &str = "Wohnfläche";
const LABEL_LAND_AREA: &str = "Grundstück";
const LABEL_ROOMS: &str = "Zimmer";
const LABEL_BATHROOMS: &str = "Anzahl Badezimmer";
const LABEL_YEAR_BUILT: &str = "Baujahr";
const LABEL_AD_TYPE: &str = "Anzeigetyp";
const LABEL_AMENITIES: &str = "Ausstattung";

const BUY_SUFFIX: &str = "kaufen";

/// Decimal and thousands separators used by the listing site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub thousands_separator: char,
}

impl NumberFormat {
    /// `1.234,56`
    pub const GERMAN: Self = Self {
        decimal_separator: ',',
        thousands_separator: '.',
    };

    pub fn parse(&self, raw: &str) -> Option<Decimal> {
        let normalized: String = raw
            .chars()
            .filter(|c| *c != self.thousands_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        Decimal::from_str(normalized.trim()).ok()
    }

    /// Unparseable input counts as zero.
    pub fn parse_or_zero(&self, raw: &str) -> Decimal {
        self.parse(raw).unwrap_or(Decimal::ZERO)
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::GERMAN
    }
}

/// Builds the record for one listing page from its field table
pub fn extract_listing(fields: &FieldTable, url: &str, format: &NumberFormat) -> ListingRecord {
    let amenities = fields.get(LABEL_AMENITIES);

    ListingRecord {
        crozilla_id: fields.get(LABEL_ID).to_string(),
        title: fields.get("title").to_string(),
        url: url.to_string(),
        broker: fields.get("broker").to_string(),
        broker_url: fields.get("broker_url").to_string(),
        image_src: fields.get("image_src").to_string(),
        price: extract_price(fields, format),
        currency: CURRENCY.to_string(),
        living_area: extract_area(fields.get(LABEL_LIVING_AREA), format),
        area: extract_area(fields.get(LABEL_LAND_AREA), format),
        rooms: format.parse_or_zero(fields.get(LABEL_ROOMS)),
        bathrooms: format.parse_or_zero(fields.get(LABEL_BATHROOMS)),
        year_built: format.parse_or_zero(fields.get(LABEL_YEAR_BUILT)),
        property_type: extract_type(fields.get(LABEL_AD_TYPE)),
        transaction_type: extract_transaction_type(fields.get(LABEL_AD_TYPE)),
        address: fields.get("address").to_string(),
        zip_code: fields.get("zip_code").to_string(),
        city: fields.get("city").to_string(),
        district: fields.get("district").to_string(),
        federal_state: fields.get("region").to_string(),
        country: COUNTRY.to_string(),
        features: split_features(amenities),
        balcony: has_balcony(amenities),
        garden: has_garden(amenities),
        kitchen: has_kitchen(amenities),
        cellar: has_cellar(amenities),
    }
}

fn extract_price(fields: &FieldTable, format: &NumberFormat) -> Decimal {
    format.parse_or_zero(&fields.get(LABEL_PRICE).replace('€', ""))
}

fn extract_area(raw: &str, format: &NumberFormat) -> Decimal {
    format.parse_or_zero(&raw.replace(['m', '²'], ""))
}

/// `Haus kaufen` is a sale, anything else is a rental.
pub fn extract_transaction_type(ad_type: &str) -> TransactionType {
    if ad_type.trim().ends_with(BUY_SUFFIX) {
        TransactionType::Kauf
    } else {
        TransactionType::Miete
    }
}

/// Ad type without its trailing transaction word, uppercased.
pub fn extract_type(ad_type: &str) -> String {
    let ad_type = ad_type.trim();
    ad_type
        .rsplit_once(' ')
        .map_or(ad_type, |(category, _)| category)
        .to_uppercase()
}

/// Splits on `", "`; an empty string yields `[""]`.
pub fn split_features(amenities: &str) -> Vec<String> {
    amenities.split(", ").map(str::to_string).collect()
}

fn has_balcony(amenities: &str) -> bool {
    amenities.contains("Terrasse") || amenities.contains("Balkon")
}

fn has_garden(amenities: &str) -> bool {
    amenities.contains("Swimmingpool")
        || amenities.to_lowercase().contains("garten")
        || amenities.contains("Garte/-mitbeutzug")
}

fn has_kitchen(amenities: &str) -> bool {
    amenities.contains("Küche")
}

fn has_cellar(amenities: &str) -> bool {
    amenities.contains("Keller")
}
