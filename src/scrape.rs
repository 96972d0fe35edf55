use url::Url;

use crate::config::ScrapeConfig;
use crate::enrich::Enricher;
use crate::error::ScraperError;
use crate::extract::extract_drafts;
use crate::fetch::{build_client, fetch_page};
use crate::record::ProductRecord;

/// Scrape one page: fetch it, match `config.selector`, and build one record
/// per match in document order.
///
/// Fails only when the page cannot be fetched or nothing matched. Image
/// probe failures just leave the size empty.
pub async fn scrape_products(config: &ScrapeConfig) -> Result<Vec<ProductRecord>, ScraperError> {
    let page_url = Url::parse(&config.url)
        .map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", config.url, e)))?;

    let client = build_client(config)?;
    let page = fetch_page(&client, page_url.as_str()).await?;

    let drafts = extract_drafts(&page.html, &config.selector);
    if drafts.is_empty() {
        return Err(ScraperError::NoProducts {
            selector: config.selector.clone(),
        });
    }
    log::debug!("🔎 Found {} product(s)", drafts.len());

    // Relative image URLs resolve against where the page actually came from.
    let mut enricher = Enricher::new(&client, Some(page.url), config.image_timeout);
    if !config.probe_images {
        enricher = enricher.without_probes();
    }

    let records = enricher.enrich_all(drafts).await;
    let sized = records.iter().filter(|r| r.image_size_kb.is_some()).count();
    log::debug!("Measured {} of {} image(s)", sized, records.len());

    Ok(records)
}
