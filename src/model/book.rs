//! Book and category record types

use serde::{Deserialize, Serialize};
use url::Url;

/// A category discovered on the landing page sidebar
///
/// Produced once per ingest run; ordering follows the on-page order and is
/// stable within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    /// Display name, whitespace-normalized
    pub name: String,

    /// Absolute URL of the category's first listing page
    pub url: Url,
}

/// One extracted catalog entry
///
/// `source_url` is the identity key: two records with the same `source_url`
/// are the same book and collapse to one stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub category: String,
    pub price: f64,
    /// 1..=5 for the known rating vocabulary, 0 for anything else
    pub rating: u8,
    pub is_in_stock: bool,
    pub availability_text: String,
    /// Absolute cover image URL
    pub image_url: String,
    /// Absolute detail-page URL; globally unique identity key
    pub source_url: String,
}

/// Maps the site's textual rating marker to a numeric rating
///
/// The marker vocabulary is fixed at five words. Anything outside it maps to
/// 0 rather than failing extraction.
pub fn rating_from_marker(marker: &str) -> u8 {
    match marker {
        "One" => 1,
        "Two" => 2,
        "Three" => 3,
        "Four" => 4,
        "Five" => 5,
        _ => 0,
    }
}

/// Derives the stock flag from the availability text
///
/// This is the only place `is_in_stock` is computed; records never set it
/// independently of the text.
pub fn in_stock_from_availability(availability_text: &str) -> bool {
    availability_text.contains("In stock")
}
