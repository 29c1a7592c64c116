//! Domain records shared across the scraper, storage, and server layers
//!
//! All record types here are fixed-shape and validated at construction time;
//! nothing downstream re-checks field presence.

mod book;
mod report;

pub use book::{in_stock_from_availability, rating_from_marker, BookRecord, CategoryRef};
pub use report::{FailedCategory, IngestReport};
