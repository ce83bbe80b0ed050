use crate::error::{ParseError, ParseResult};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

const ROW_SELECTOR: &str = r#"[class="ct-u-displayTableRow"]"#;
const TITLE_SELECTOR: &str = r#"[class="ct-fw-300 obj-headline"]"#;
const BROKER_SELECTOR: &str = r#"[class*="advertiser-name"]"#;
const DESCRIPTION_SELECTOR: &str = r#"p[class="ct-u-marginBottom20"]"#;
const IMAGE_SELECTOR: &str = r#"meta[property="og:image"]"#;
const ADDRESS_SELECTOR: &str = "#two > span";

/// Free-text URL pattern: scheme optional, `www.` prefixes and bare `domain.tld/` forms.
static RE_BROKER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b((?:https?://|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)(?:[^\s()<>]+|\(([^\s()<>]+|(\([^\s()<>]+\)))*\))+(?:\(([^\s()<>]+|(\([^\s()<>]+\)))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’]))"#,
    )
    .unwrap()
});
static RE_ZIP_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4,8}").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Label/value pairs of one listing page plus the synthetic keys
/// (`title`, `broker`, `broker_url`, `image_src`, `address`, `region`,
/// `city`, `district`, `zip_code`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTable {
    fields: HashMap<String, String>,
}

impl FieldTable {
    /// Stored value for `key`, or `""` when the page never provided it.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}

/// Address split into its positional parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub zip_code: String,
    pub region: String,
    pub city: String,
    pub district: String,
}

/// Splits `"<region> [<zip>]: <city>: <district>"`.
///
/// Segments past the third are ignored and missing ones come back empty.
pub fn decompose_address(address: &str) -> Address {
    let mut parts = address.split(':');
    let head = parts.next().unwrap_or_default();

    let (zip_code, region) = match RE_ZIP_CODE.find(head) {
        Some(zip) => (
            zip.as_str().to_string(),
            head.replace(zip.as_str(), "").trim().to_string(),
        ),
        None => (String::new(), head.trim().to_string()),
    };

    let mut next_part = || parts.next().map(str::trim).unwrap_or_default().to_string();
    let city = next_part();
    let district = next_part();

    Address {
        zip_code,
        region,
        city,
        district,
    }
}

/// Reads the label/value rows and side fields of one listing page
pub struct TableReader {
    fields: FieldTable,
}

impl TableReader {
    /// Fails only when the title or broker name is missing; every other
    /// section is best-effort.
    pub fn new(document: &Html) -> ParseResult<Self> {
        let mut fields = FieldTable::default();

        let row_selector = create_selector(ROW_SELECTOR)?;
        for row in document.select(&row_selector) {
            match read_row(row) {
                Some((label, value)) => fields.insert(label, value),
                None => {
                    trace!("Skipping incomplete table row: {}", row.html());
                }
            }
        }

        let title = first_text(document, TITLE_SELECTOR)?
            .ok_or(ParseError::MissingElement("title"))?;
        fields.insert("title", title.trim());

        let broker = first_text(document, BROKER_SELECTOR)?
            .ok_or(ParseError::MissingElement("broker"))?;
        fields.insert("broker", collapse_whitespace(broker.trim()));

        let description = all_text(document, DESCRIPTION_SELECTOR)?.join(" ");
        if let Some(broker_url) = find_url(&description) {
            fields.insert("broker_url", broker_url);
        }

        let image_selector = create_selector(IMAGE_SELECTOR)?;
        if let Some(image_src) = document
            .select(&image_selector)
            .find_map(|meta| meta.value().attr("content"))
        {
            fields.insert("image_src", image_src);
        }

        let address = collapse_whitespace(&all_text(document, ADDRESS_SELECTOR)?.join(" "))
            .trim()
            .to_string();
        let parts = decompose_address(&address);
        fields.insert("address", address);
        fields.insert("zip_code", parts.zip_code);
        fields.insert("region", parts.region);
        fields.insert("city", parts.city);
        fields.insert("district", parts.district);

        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }
}

pub(crate) fn create_selector(css: &str) -> ParseResult<Selector> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.into()))
}

/// Text nodes that are direct children of `element`.
pub(crate) fn own_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
}

fn child_elements<'a>(
    element: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

/// First text under `span` children of the `nth` `div` child of a row.
fn cell_text(row: ElementRef<'_>, nth: usize) -> Option<&str> {
    let cell = child_elements(row, "div").nth(nth)?;
    child_elements(cell, "span").flat_map(own_text).next()
}

fn read_row(row: ElementRef<'_>) -> Option<(String, String)> {
    let label = cell_text(row, 0)?.replace(':', "").trim().to_string();
    let value = cell_text(row, 1)?
        .replace(['\n', '\t'], "")
        .trim()
        .to_string();
    Some((label, value))
}

fn first_text<'a>(document: &'a Html, css: &str) -> ParseResult<Option<&'a str>> {
    let selector = create_selector(css)?;
    Ok(document.select(&selector).flat_map(own_text).next())
}

fn all_text<'a>(document: &'a Html, css: &str) -> ParseResult<Vec<&'a str>> {
    let selector = create_selector(css)?;
    Ok(document.select(&selector).flat_map(own_text).collect())
}

fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").into_owned()
}

fn find_url(text: &str) -> Option<&str> {
    RE_BROKER_URL.find(text).map(|found| found.as_str())
}
