//! Category discovery from the landing page
//!
//! The catalog site lists every category in a sidebar navigation block. One
//! fetch of the landing page yields the full category list for the run, in
//! on-page order.

use crate::model::CategoryRef;
use crate::scraper::fetcher::{fetch_page, FetchError};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Fetches the landing page and returns the categories it advertises
///
/// Relative category links are resolved against the landing URL. Entries with
/// a missing href or an unresolvable link are skipped. The caller decides how
/// to treat a fetch failure (degrade to empty vs. hard error, see the
/// `strict-discovery` config switch).
pub async fn discover_categories(
    client: &Client,
    landing_url: &Url,
) -> Result<Vec<CategoryRef>, FetchError> {
    let page = fetch_page(client, landing_url).await?;
    Ok(parse_categories(&page.body, landing_url))
}

/// Locates the sidebar navigation structure and collects its entries
///
/// An absent or malformed navigation block yields an empty list.
fn parse_categories(html: &str, landing_url: &Url) -> Vec<CategoryRef> {
    let document = Html::parse_document(html);
    // The nested <ul> holds the per-category entries; the outer one is the
    // "Books" root entry.
    let entry_selector =
        Selector::parse("div.side_categories ul.nav ul li a").expect("static selector");

    let mut categories = Vec::new();
    for element in document.select(&entry_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(url) = landing_url.join(href) else {
            tracing::debug!(href, "skipping category with unresolvable link");
            continue;
        };

        let name: Vec<&str> = element.text().flat_map(str::split_whitespace).collect();
        if name.is_empty() {
            continue;
        }

        categories.push(CategoryRef {
            name: name.join(" "),
            url,
        });
    }

    categories
}
