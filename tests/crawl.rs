use crozilla_scout::scrapers::{CrawlConfig, CrozillaScraper, ScraperTrait};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn listing_page(id: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="ct-fw-300 obj-headline">Objekt {id}</h1>
        <div class="advertiser-name">Makler {id}</div>
        <div class="ct-u-displayTableRow"><div><span>Crozilla ID:</span></div><div><span>{id}</span></div></div>
        <div class="ct-u-displayTableRow"><div><span>Preis:</span></div><div><span>100.000 €</span></div></div>
        </body></html>"#
    )
}

fn search_page(listings: &[&str], next_page: Option<&str>) -> String {
    let links: String = listings
        .iter()
        .map(|href| format!(r#"<div class="ct-itemProducts"><a href="{href}">Objekt</a></div>"#))
        .collect();
    let pager = next_page
        .map(|href| format!(r#"<a href="{href}">›</a>"#))
        .unwrap_or_default();
    format!("<html><body>{links}{pager}</body></html>")
}

/// Two search pages whose `›` links point at each other, one broken listing
/// and one off-site listing link.
fn site() -> HashMap<String, String> {
    let mut pages = HashMap::new();
    pages.insert(
        "/search/1".to_string(),
        search_page(
            &["/listing/a", "/listing/broken", "https://offsite.example/listing/x"],
            Some("/search/2"),
        ),
    );
    pages.insert(
        "/search/2".to_string(),
        search_page(&["/listing/b"], Some("/search/1")),
    );
    pages.insert("/search/last".to_string(), search_page(&["/listing/a"], None));
    pages.insert("/listing/a".to_string(), listing_page("A"));
    pages.insert("/listing/b".to_string(), listing_page("B"));
    pages.insert(
        "/listing/broken".to_string(),
        "<html><body><div class=\"advertiser-name\">Makler</div></body></html>".to_string(),
    );
    pages
}

/// Serves `pages` over plain HTTP/1.1; unknown paths get a 404.
async fn serve(pages: HashMap<String, String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let pages = Arc::new(pages);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let pages = pages.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = match pages.get(path) {
                    Some(body) => ("200 OK", body.as_str()),
                    None => ("404 Not Found", ""),
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

fn scraper(addr: SocketAddr, start_path: &str, page_limit: Option<usize>) -> CrozillaScraper {
    let config = CrawlConfig {
        start_url: format!("http://{addr}{start_path}"),
        page_limit,
        allowed_domains: vec!["127.0.0.1".to_string()],
        ..CrawlConfig::default()
    };
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    CrozillaScraper::with_client(config, client)
}

fn ids(listings: &[crozilla_scout::ListingRecord]) -> Vec<&str> {
    listings.iter().map(|listing| listing.crozilla_id.as_str()).collect()
}

#[tokio::test]
async fn test_crawl_stops_on_cyclic_next_link() {
    let addr = serve(site()).await;

    let report = scraper(addr, "/search/1", None).crawl().await.unwrap();

    assert_eq!(report.search_pages, 2);
    assert_eq!(ids(&report.listings), vec!["A", "B"]);
    // the broken listing fails alone; the off-site link is never fetched
    assert_eq!(report.failed_pages, 1);
}

#[tokio::test]
async fn test_crawl_respects_page_limit() {
    let addr = serve(site()).await;

    let report = scraper(addr, "/search/1", Some(1)).crawl().await.unwrap();

    assert_eq!(report.search_pages, 1);
    assert_eq!(ids(&report.listings), vec!["A"]);
    assert_eq!(report.failed_pages, 1);
}

#[tokio::test]
async fn test_crawl_stops_without_next_link() {
    let addr = serve(site()).await;

    let report = scraper(addr, "/search/last", None).crawl().await.unwrap();

    assert_eq!(report.search_pages, 1);
    assert_eq!(ids(&report.listings), vec!["A"]);
    assert_eq!(report.failed_pages, 0);
}

#[tokio::test]
async fn test_missing_search_page_is_counted() {
    let addr = serve(site()).await;

    let report = scraper(addr, "/search/missing", None).crawl().await.unwrap();

    assert_eq!(report.search_pages, 0);
    assert!(report.listings.is_empty());
    assert_eq!(report.failed_pages, 1);
}

#[tokio::test]
async fn test_scrape_returns_listings() {
    let addr = serve(site()).await;
    let scraper = scraper(addr, "/search/1", None);

    let listings = scraper.scrape().await.unwrap();

    assert_eq!(scraper.source_name(), "Crozilla");
    assert_eq!(ids(&listings), vec!["A", "B"]);
}
