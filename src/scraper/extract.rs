//! Per-item field extraction
//!
//! Turns one listing-page item block (an `article.product_pod` fragment) into
//! a [`BookRecord`]. Pure: no I/O, and one block's failure never affects its
//! siblings; the traversal loop catches and counts failures per block.

use crate::model::{in_stock_from_availability, rating_from_marker, BookRecord};
use scraper::{ElementRef, Selector};
use thiserror::Error;
use url::Url;

/// Data-shape failure for a single item block
///
/// Always recoverable by skipping the block.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("malformed price text {text:?}")]
    BadPrice { text: String },

    #[error("unresolvable {field} reference {href:?}")]
    BadUrl { field: &'static str, href: String },
}

/// Extracts normalized book records from item blocks
///
/// Image and detail-page hrefs on listing pages are relative; they resolve
/// against fixed bases (the site root and the catalogue root respectively),
/// so the same book yields the same `source_url` from any listing page.
pub struct Extractor {
    image_base: Url,
    detail_base: Url,
    title_link: Selector,
    price: Selector,
    rating: Selector,
    availability: Selector,
    image: Selector,
}

/// Currency prefix stripped from price text before numeric parsing
const CURRENCY_PREFIX: char = '£';

impl Extractor {
    /// Creates an extractor resolving references against the given bases
    pub fn new(image_base: Url, detail_base: Url) -> Self {
        Self {
            image_base,
            detail_base,
            title_link: parse_selector("h3 a"),
            price: parse_selector("p.price_color"),
            rating: parse_selector("p.star-rating"),
            availability: parse_selector("p.instock.availability"),
            image: parse_selector("img"),
        }
    }

    /// Extracts one block into a [`BookRecord`]
    ///
    /// Title, price, rating marker, availability text, image reference, and
    /// detail-page reference are located by structural position; a missing
    /// field fails this block only. An unrecognized rating marker maps to 0
    /// rather than failing.
    pub fn extract(
        &self,
        block: ElementRef<'_>,
        category_name: &str,
    ) -> Result<BookRecord, ExtractError> {
        let title_link = block
            .select(&self.title_link)
            .next()
            .ok_or(ExtractError::MissingField { field: "title" })?;

        let title = title_link
            .value()
            .attr("title")
            .ok_or(ExtractError::MissingField { field: "title" })?
            .to_string();

        let detail_href = title_link
            .value()
            .attr("href")
            .ok_or(ExtractError::MissingField { field: "source_url" })?;
        let source_url = self
            .detail_base
            .join(detail_href)
            .map_err(|_| ExtractError::BadUrl {
                field: "source_url",
                href: detail_href.to_string(),
            })?;

        let price_text = first_text(block, &self.price)
            .ok_or(ExtractError::MissingField { field: "price" })?;
        let price = parse_price(&price_text)?;

        let rating_el = block
            .select(&self.rating)
            .next()
            .ok_or(ExtractError::MissingField { field: "rating" })?;
        let marker = rating_el
            .value()
            .classes()
            .find(|c| *c != "star-rating")
            .unwrap_or("");
        let rating = rating_from_marker(marker);

        let availability_text =
            first_text(block, &self.availability).ok_or(ExtractError::MissingField {
                field: "availability_text",
            })?;

        let image_href = block
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .ok_or(ExtractError::MissingField { field: "image_url" })?;
        let image_url = self
            .image_base
            .join(image_href)
            .map_err(|_| ExtractError::BadUrl {
                field: "image_url",
                href: image_href.to_string(),
            })?;

        Ok(BookRecord {
            title,
            category: category_name.to_string(),
            price,
            rating,
            is_in_stock: in_stock_from_availability(&availability_text),
            availability_text,
            image_url: image_url.to_string(),
            source_url: source_url.to_string(),
        })
    }
}

/// Parses a selector known valid at compile time
fn parse_selector(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

/// Strips the currency prefix and parses the remaining decimal
fn parse_price(text: &str) -> Result<f64, ExtractError> {
    let stripped = text.strip_prefix(CURRENCY_PREFIX).unwrap_or(text);
    let price: f64 = stripped.trim().parse().map_err(|_| ExtractError::BadPrice {
        text: text.to_string(),
    })?;
    if !price.is_finite() || price < 0.0 {
        return Err(ExtractError::BadPrice {
            text: text.to_string(),
        });
    }
    Ok(price)
}

/// First matching element's text, whitespace-collapsed
fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = block.select(selector).next()?;
    let text: Vec<&str> = element.text().flat_map(str::split_whitespace).collect();
    if text.is_empty() {
        return None;
    }
    Some(text.join(" "))
}
