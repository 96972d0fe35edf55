use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page fetch timeout in seconds.
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 30;

/// Per-image probe timeout in seconds.
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 10;

/// Everything a single scrape needs.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub url: String,
    pub selector: String,
    pub page_timeout: Duration,
    pub image_timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
    /// When false, no image requests are made and every size stays empty.
    pub probe_images: bool,
}

impl ScrapeConfig {
    pub fn new(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: selector.into(),
            ..Default::default()
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            selector: String::new(),
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            image_timeout: Duration::from_secs(DEFAULT_IMAGE_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            probe_images: true,
        }
    }
}
