use crate::error::ParseResult;
use crate::scrapers::table::{create_selector, own_text};
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

const RESULT_LINK_SELECTOR: &str = r#"[class*="ct-itemProducts"] > a[href]"#;
const PAGER_LINK_SELECTOR: &str = "a[href]";
const NEXT_PAGE_ARROW: &str = "›";

/// Links harvested from one search-results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub listings: Vec<Url>,
    pub next_page: Option<Url>,
}

impl SearchPage {
    pub fn from_html(body: &str, page_url: &Url) -> ParseResult<Self> {
        Self::parse(&Html::parse_document(body), page_url)
    }

    /// Resolves every listing link and the `›` pager link against `page_url`.
    pub fn parse(document: &Html, page_url: &Url) -> ParseResult<Self> {
        let result_selector = create_selector(RESULT_LINK_SELECTOR)?;
        let listings = document
            .select(&result_selector)
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| resolve(page_url, href))
            .collect();

        let pager_selector = create_selector(PAGER_LINK_SELECTOR)?;
        let next_page = document
            .select(&pager_selector)
            .find(|link| own_text(*link).any(|text| text == NEXT_PAGE_ARROW))
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| resolve(page_url, href));

        Ok(Self {
            listings,
            next_page,
        })
    }

    /// Drops listing and next-page links that leave `allowed_domains`.
    pub fn retain_allowed(&mut self, allowed_domains: &[String]) {
        self.listings.retain(|url| {
            let allowed = is_allowed(url, allowed_domains);
            if !allowed {
                debug!("Skipping off-site listing link {}", url);
            }
            allowed
        });
        if let Some(next_page) = self.next_page.take() {
            if is_allowed(&next_page, allowed_domains) {
                self.next_page = Some(next_page);
            } else {
                debug!("Skipping off-site next page link {}", next_page);
            }
        }
    }
}

/// An empty list allows every host; otherwise the host must equal an
/// allowed domain or be a subdomain of one.
pub fn is_allowed(url: &Url, allowed_domains: &[String]) -> bool {
    if allowed_domains.is_empty() {
        return true;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    allowed_domains.iter().any(|domain| {
        host.eq_ignore_ascii_case(domain)
            || host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
    })
}

fn resolve(page_url: &Url, href: &str) -> Option<Url> {
    match page_url.join(href) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!("Skipping unresolvable link {:?} on {}: {}", href, page_url, err);
            None
        }
    }
}
