//! Per-category pagination traversal
//!
//! Walks one category's listing pages: fetch, extract every item block, follow
//! the next-page link. A fetch failure mid-traversal ends that category early
//! and keeps what was already extracted; extraction failures skip single items
//! without stopping the page loop.

use crate::model::{BookRecord, CategoryRef};
use crate::scraper::extract::Extractor;
use crate::scraper::fetcher::{fetch_page, FetchError};
use crate::scraper::pacing::Pacer;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// How one category's traversal ended
#[derive(Debug, Default)]
pub struct TraversalOutcome {
    /// Pages fetched successfully
    pub pages_fetched: u32,

    /// Item blocks skipped because field extraction failed
    pub extract_failures: usize,

    /// True when a fetch failure cut the traversal short
    pub partial: bool,

    /// The failure that ended the traversal, when partial
    pub error: Option<FetchError>,
}

/// One parsed listing page, fully owned so nothing borrows the DOM
struct ParsedListing {
    records: Vec<BookRecord>,
    extract_failures: usize,
    item_count: usize,
    next_page: Option<Url>,
}

/// Walks a category until its pages are exhausted
///
/// Terminates when a page yields zero item blocks, no next-page link is
/// present, the page budget runs out, or a fetch fails (partial outcome).
/// The pacer bounds the request rate between page fetches.
pub async fn traverse_category(
    client: &Client,
    pacer: &mut Pacer,
    extractor: &Extractor,
    category: &CategoryRef,
    page_budget: Option<u32>,
) -> (Vec<BookRecord>, TraversalOutcome) {
    let mut records = Vec::new();
    let mut outcome = TraversalOutcome::default();
    let mut current_url = category.url.clone();

    loop {
        if let Some(budget) = page_budget {
            if outcome.pages_fetched >= budget {
                tracing::debug!(category = %category.name, budget, "page budget exhausted");
                break;
            }
        }

        pacer.wait_turn().await;

        let page = match fetch_page(client, &current_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    category = %category.name,
                    url = %current_url,
                    error = %e,
                    "page fetch failed, ending category traversal"
                );
                outcome.partial = true;
                outcome.error = Some(e);
                break;
            }
        };
        outcome.pages_fetched += 1;

        let parsed = parse_listing(extractor, &page.body, &page.url, &category.name);
        records.extend(parsed.records);
        outcome.extract_failures += parsed.extract_failures;

        if parsed.item_count == 0 {
            tracing::debug!(category = %category.name, url = %page.url, "page yielded no items");
            break;
        }

        match parsed.next_page {
            Some(next) => current_url = next,
            None => break,
        }
    }

    tracing::info!(
        category = %category.name,
        pages = outcome.pages_fetched,
        records = records.len(),
        failures = outcome.extract_failures,
        partial = outcome.partial,
        "category traversal finished"
    );

    (records, outcome)
}

/// Extracts every item block on a page and resolves the next-page link
///
/// Synchronous on purpose: the parsed DOM must not live across an await.
fn parse_listing(
    extractor: &Extractor,
    body: &str,
    page_url: &Url,
    category_name: &str,
) -> ParsedListing {
    let item_selector = Selector::parse("article.product_pod").expect("static selector");
    let next_selector = Selector::parse("li.next a").expect("static selector");

    let document = Html::parse_document(body);

    let mut records = Vec::new();
    let mut extract_failures = 0;
    let mut item_count = 0;

    for block in document.select(&item_selector) {
        item_count += 1;
        match extractor.extract(block, category_name) {
            Ok(record) => records.push(record),
            Err(e) => {
                extract_failures += 1;
                tracing::warn!(category = category_name, url = %page_url, error = %e, "skipping item block");
            }
        }
    }

    let next_page = document
        .select(&next_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| page_url.join(href).ok());

    ParsedListing {
        records,
        extract_failures,
        item_count,
        next_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(
            Url::parse("https://books.example.com/").unwrap(),
            Url::parse("https://books.example.com/catalogue/").unwrap(),
        )
    }

    fn page_url() -> Url {
        Url::parse("https://books.example.com/catalogue/category/books/travel_2/index.html")
            .unwrap()
    }

    fn pod(slug: &str, title: &str) -> String {
        format!(
            r#"<article class="product_pod">
                <img src="media/{slug}.jpg">
                <p class="star-rating Two"></p>
                <h3><a href="../../../{slug}/index.html" title="{title}">{title}</a></h3>
                <p class="price_color">£20.00</p>
                <p class="instock availability">In stock</p>
            </article>"#
        )
    }

    #[test]
    fn test_parse_listing_extracts_all_items() {
        let body = format!(
            "<html><body>{}{}</body></html>",
            pod("book-a_1", "Book A"),
            pod("book-b_2", "Book B")
        );
        let parsed = parse_listing(&extractor(), &body, &page_url(), "Travel");

        assert_eq!(parsed.item_count, 2);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.extract_failures, 0);
        assert!(parsed.next_page.is_none());
    }

    #[test]
    fn test_one_malformed_block_does_not_abort_page() {
        let malformed = r#"<article class="product_pod"><p>nothing here</p></article>"#;
        let body = format!(
            "<html><body>{}{}{}</body></html>",
            pod("book-a_1", "Book A"),
            malformed,
            pod("book-b_2", "Book B")
        );
        let parsed = parse_listing(&extractor(), &body, &page_url(), "Travel");

        assert_eq!(parsed.item_count, 3);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.extract_failures, 1);
    }

    #[test]
    fn test_next_link_resolves_against_current_page() {
        let body = format!(
            "<html><body>{}<ul class=\"pager\"><li class=\"next\"><a href=\"page-2.html\">next</a></li></ul></body></html>",
            pod("book-a_1", "Book A")
        );
        let parsed = parse_listing(&extractor(), &body, &page_url(), "Travel");

        assert_eq!(
            parsed.next_page.unwrap().as_str(),
            "https://books.example.com/catalogue/category/books/travel_2/page-2.html"
        );
    }

    #[test]
    fn test_absent_next_link_ends_listing() {
        let body = format!("<html><body>{}</body></html>", pod("book-a_1", "Book A"));
        let parsed = parse_listing(&extractor(), &body, &page_url(), "Travel");
        assert!(parsed.next_page.is_none());
    }
}
