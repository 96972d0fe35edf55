use serde::Serialize;

/// One output row, built from a single matched node.
///
/// Field order is the column order of the written spreadsheet.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProductRecord {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Image")]
    pub image_url: Option<String>,
    #[serde(rename = "ImageSizeKB")]
    pub image_size_kb: Option<f64>,
}

/// Column headers, in output order.
pub const COLUMNS: [&str; 3] = ["Title", "Image", "ImageSizeKB"];

/// What can be read off a node without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub image_url: Option<String>,
}

impl ProductDraft {
    pub fn into_record(self, image_size_kb: Option<f64>) -> ProductRecord {
        ProductRecord {
            title: self.title,
            image_size_kb: self.image_url.as_ref().and(image_size_kb),
            image_url: self.image_url,
        }
    }
}

/// Bytes to kilobytes, rounded to two decimals with ties to even.
///
/// `bytes * 100 / 1024` is exact in f64, so halves are real ties.
pub fn bytes_to_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round_ties_even() / 100.0
}
