use thiserror::Error;

/// Run-level failures. Any of these aborts the scrape.
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} returned for {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("No products found for selector '{selector}'")]
    NoProducts { selector: String },
    #[error("Output error: {0}")]
    Output(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScraperError {
    /// True when the page was fetched but the selector matched nothing.
    pub fn is_no_products(&self) -> bool {
        matches!(self, ScraperError::NoProducts { .. })
    }
}

/// Why an image size could not be measured. Only ever degrades one field.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("cannot resolve image URL '{0}'")]
    InvalidUrl(String),
    #[error("image request timed out")]
    Timeout,
    #[error("image request failed: {0}")]
    Transport(reqwest::Error),
    #[error("malformed Content-Length header: {0:?}")]
    InvalidContentLength(String),
    #[error("failed reading image body: {0}")]
    Read(reqwest::Error),
}

impl ProbeError {
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Transport(err)
        }
    }

    pub(crate) fn from_read(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Read(err)
        }
    }
}
