use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use url::Url;

use crate::error::ProbeError;
use crate::record::{bytes_to_kb, ProductDraft, ProductRecord};

/// Measured size of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub bytes: u64,
    /// True when the size came from `Content-Length` rather than the body.
    pub declared: bool,
}

impl ImageSize {
    pub fn kb(&self) -> f64 {
        bytes_to_kb(self.bytes)
    }
}

/// Resolve an image attribute value against the page it came from.
pub fn resolve_image_url(image_url: &str, page_url: Option<&Url>) -> Result<Url, ProbeError> {
    let image_url = image_url.trim();
    if image_url.is_empty() {
        return Err(ProbeError::InvalidUrl(image_url.to_string()));
    }
    let resolved = match page_url {
        Some(base) => base.join(image_url),
        None => Url::parse(image_url),
    };
    resolved.map_err(|_| ProbeError::InvalidUrl(image_url.to_string()))
}

/// Byte count declared by `Content-Length`, if the header is present.
pub fn declared_length(headers: &HeaderMap) -> Option<Result<u64, ProbeError>> {
    let value = headers.get(CONTENT_LENGTH)?;
    let parsed = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            ProbeError::InvalidContentLength(String::from_utf8_lossy(value.as_bytes()).into_owned())
        });
    Some(parsed)
}

/// Fetch an image and report its size.
///
/// The declared `Content-Length` wins; otherwise the body is streamed and
/// counted. The whole exchange is bounded by `timeout`.
pub async fn probe_image_size(
    client: &reqwest::Client,
    url: Url,
    timeout: Duration,
) -> Result<ImageSize, ProbeError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(ProbeError::from_send)?;

    if let Some(declared) = declared_length(response.headers()) {
        return declared.map(|bytes| ImageSize {
            bytes,
            declared: true,
        });
    }

    let mut bytes = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        bytes += chunk.map_err(ProbeError::from_read)?.len() as u64;
    }

    Ok(ImageSize {
        bytes,
        declared: false,
    })
}

/// Turns drafts into records, probing image sizes one at a time.
pub struct Enricher<'a> {
    client: &'a reqwest::Client,
    page_url: Option<Url>,
    image_timeout: Duration,
    probe_images: bool,
}

impl<'a> Enricher<'a> {
    pub fn new(client: &'a reqwest::Client, page_url: Option<Url>, image_timeout: Duration) -> Self {
        Self {
            client,
            page_url,
            image_timeout,
            probe_images: true,
        }
    }

    /// Skip all image requests; sizes stay empty.
    pub fn without_probes(mut self) -> Self {
        self.probe_images = false;
        self
    }

    /// Size in KB for one image URL, or `None` if it could not be measured.
    pub async fn image_size_kb(&self, image_url: &str) -> Option<f64> {
        if !self.probe_images {
            return None;
        }

        let result = match resolve_image_url(image_url, self.page_url.as_ref()) {
            Ok(url) => probe_image_size(self.client, url, self.image_timeout).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(size) => {
                log::debug!(
                    "Image {}: {} bytes ({})",
                    image_url,
                    size.bytes,
                    if size.declared { "declared" } else { "measured" }
                );
                Some(size.kb())
            }
            Err(e) => {
                log::debug!("Image size unavailable for {}: {}", image_url, e);
                None
            }
        }
    }

    pub async fn enrich(&self, draft: ProductDraft) -> ProductRecord {
        let size = match draft.image_url.as_deref() {
            Some(image_url) => self.image_size_kb(image_url).await,
            None => None,
        };
        draft.into_record(size)
    }

    /// One record per draft, same order. Never fails.
    pub async fn enrich_all(&self, drafts: Vec<ProductDraft>) -> Vec<ProductRecord> {
        let mut records = Vec::with_capacity(drafts.len());
        for draft in drafts {
            records.push(self.enrich(draft).await);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::header::HeaderValue;

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    #[test]
    fn declared_length_parsing() {
        let mut headers = HeaderMap::new();
        assert!(declared_length(&headers).is_none());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2048"));
        assert_eq!(declared_length(&headers).unwrap().unwrap(), 2048);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert!(matches!(
            declared_length(&headers),
            Some(Err(ProbeError::InvalidContentLength(_)))
        ));
    }

    #[test]
    fn relative_urls_resolve_against_page() {
        let page = Url::parse("https://shop.example.com/ar/offers").unwrap();
        let url = resolve_image_url("/media/a.jpg", Some(&page)).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/media/a.jpg");

        let url = resolve_image_url("//cdn.example.com/b.jpg", Some(&page)).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/b.jpg");

        assert!(matches!(
            resolve_image_url("/media/a.jpg", None),
            Err(ProbeError::InvalidUrl(_))
        ));
    }

    #[test]
    fn blank_image_url_is_not_fetched() {
        let page = Url::parse("https://shop.example.com/ar/offers").unwrap();
        assert!(matches!(
            resolve_image_url("   ", Some(&page)),
            Err(ProbeError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn probe_reads_content_length() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/img.jpg");
                then.status(200).body(vec![0u8; 2048]);
            })
            .await;

        let url = Url::parse(&server.url("/img.jpg")).unwrap();
        let size = probe_image_size(&client(), url, Duration::from_secs(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(size.bytes, 2048);
        assert_eq!(size.kb(), 2.0);
    }

    /// Serve one chunked response without `Content-Length`, then close.
    async fn serve_chunked(chunks: Vec<usize>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();

            let mut response = b"HTTP/1.1 200 OK\r\n\
                Content-Type: image/jpeg\r\n\
                Transfer-Encoding: chunked\r\n\
                Connection: close\r\n\r\n"
                .to_vec();
            for len in chunks {
                response.extend_from_slice(format!("{:x}\r\n", len).as_bytes());
                response.extend(std::iter::repeat(b'x').take(len));
                response.extend_from_slice(b"\r\n");
            }
            response.extend_from_slice(b"0\r\n\r\n");
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/chunked.jpg", addr)
    }

    #[tokio::test]
    async fn probe_measures_body_without_content_length() {
        let url = Url::parse(&serve_chunked(vec![1024, 512]).await).unwrap();
        let size = probe_image_size(&client(), url, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(
            size,
            ImageSize {
                bytes: 1536,
                declared: false,
            }
        );
        assert_eq!(size.kb(), 1.5);
    }

    #[tokio::test]
    async fn probe_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow.jpg");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .body(vec![0u8; 16]);
            })
            .await;

        let url = Url::parse(&server.url("/slow.jpg")).unwrap();
        let err = probe_image_size(&client(), url, Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Timeout), "got {err:?}");
    }

    #[tokio::test]
    async fn failed_probe_only_drops_size() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ok.png");
                then.status(200).body(vec![1u8; 1536]);
            })
            .await;

        let page = Url::parse(&server.url("/page")).unwrap();
        let client = client();
        let enricher = Enricher::new(&client, Some(page), Duration::from_secs(5));

        let drafts = vec![
            ProductDraft {
                title: Some("ok".to_string()),
                image_url: Some("/ok.png".to_string()),
            },
            ProductDraft {
                title: Some("broken".to_string()),
                image_url: Some("http://127.0.0.1:1/missing.png".to_string()),
            },
            ProductDraft {
                title: None,
                image_url: None,
            },
        ];

        let records = enricher.enrich_all(drafts).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].image_size_kb, Some(1.5));
        assert_eq!(records[0].image_url.as_deref(), Some("/ok.png"));
        assert_eq!(records[1].title.as_deref(), Some("broken"));
        assert_eq!(
            records[1].image_url.as_deref(),
            Some("http://127.0.0.1:1/missing.png")
        );
        assert_eq!(records[1].image_size_kb, None);
        assert_eq!(records[2].image_size_kb, None);
    }

    #[tokio::test]
    async fn probes_skipped_when_disabled() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/img.jpg");
                then.status(200).body(vec![0u8; 1024]);
            })
            .await;

        let client = client();
        let enricher = Enricher::new(&client, None, Duration::from_secs(5));
        let probed = enricher.image_size_kb(&server.url("/img.jpg")).await;
        assert_eq!(probed, Some(1.0));

        let enricher = enricher.without_probes();
        let record = enricher
            .enrich(ProductDraft {
                title: Some("t".to_string()),
                image_url: Some(server.url("/img.jpg")),
            })
            .await;

        assert_eq!(record.image_size_kb, None);
        assert_eq!(record.image_url, Some(server.url("/img.jpg")));
    }
}
