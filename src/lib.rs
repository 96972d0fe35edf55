// Product Scraper Library
//
// Fetches one page, turns every node matching a CSS selector into a product
// record, and measures each product image on a best-effort basis.

pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod record;
pub mod scrape;
pub mod spinner;

// Re-export main types for convenience
pub use config::ScrapeConfig;
pub use enrich::{Enricher, ImageSize};
pub use error::{ProbeError, ScraperError};
pub use extract::{extract_drafts, select_products};
pub use fetch::FetchedPage;
pub use output::{default_output_path, write_records, OutputFormat};
pub use record::{ProductDraft, ProductRecord};
pub use scrape::scrape_products;
pub use spinner::Spinner;
