use url::Url;

use crate::config::ScrapeConfig;
use crate::error::ScraperError;

/// Build the HTTP client shared by the page fetch and the image probes.
///
/// The client-wide timeout bounds the page fetch; image probes set their
/// own per-request timeout.
pub fn build_client(config: &ScrapeConfig) -> Result<reqwest::Client, ScraperError> {
    let mut client_builder = reqwest::Client::builder()
        .timeout(config.page_timeout)
        .user_agent(config.user_agent.as_str());

    if let Some(proxy_url) = &config.proxy {
        log::debug!("Using proxy: {}", proxy_url);
        client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    Ok(client_builder.build()?)
}

/// A fetched page and the URL it was served from after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub html: String,
}

/// Fetch the target page. Any transport error or non-success status is fatal.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<FetchedPage, ScraperError> {
    log::debug!("Fetching: {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(ScraperError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    if final_url.as_str() != url {
        log::debug!("Redirected: {} -> {}", url, final_url);
    }

    let html = response.text().await?;
    log::debug!("Fetched {} bytes from {}", html.len(), final_url);
    Ok(FetchedPage {
        url: final_url,
        html,
    })
}
