use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use url::Url;

use crate::error::ScraperError;
use crate::record::{ProductRecord, COLUMNS};

/// File formats the records can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(ScraperError::Output(format!(
                "Unknown format '{}'. Use: csv or json",
                other
            ))),
        }
    }
}

/// Default output file name: `<host>_<last path segment>.<ext>`.
pub fn default_output_path(url: &str, format: OutputFormat) -> PathBuf {
    let unsafe_chars = Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex");
    let sanitize = |s: &str| unsafe_chars.replace_all(s, "_").into_owned();

    let stem = Url::parse(url)
        .ok()
        .and_then(|url| {
            let host = url.host_str().map(sanitize)?;
            let segment = url
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
                .map(sanitize);
            Some(match segment {
                Some(segment) => format!("{}_{}", host, segment),
                None => host,
            })
        })
        .unwrap_or_else(|| "products".to_string());

    PathBuf::from(format!("{}.{}", stem, format.extension()))
}

/// Serialize records as CSV with the `Title,Image,ImageSizeKB` header.
pub fn format_csv(records: &[ProductRecord]) -> Result<String, ScraperError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);

    // Written explicitly so an empty slice still gets a header row.
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScraperError::Output(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ScraperError::Output(e.to_string()))
}

pub fn format_json(records: &[ProductRecord]) -> Result<String, ScraperError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write all records to `path` in the given format.
pub fn write_records(
    records: &[ProductRecord],
    path: &Path,
    format: OutputFormat,
) -> Result<(), ScraperError> {
    let contents = match format {
        OutputFormat::Csv => format_csv(records)?,
        OutputFormat::Json => format_json(records)?,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, contents)?;
    log::info!("💾 Output saved to: {}", path.display());
    Ok(())
}
