use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use url::Url;

use product_scraper::config::{
    DEFAULT_IMAGE_TIMEOUT_SECS, DEFAULT_PAGE_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use product_scraper::{
    default_output_path, scrape_products, write_records, OutputFormat, ScrapeConfig,
    ScraperError, Spinner,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "product-scraper", version)]
#[command(about = "Scrape product links and image sizes from a single page", long_about = None)]
struct Args {
    /// Page URL to scrape
    url: String,

    /// CSS selector matching one element per product
    #[arg(short, long)]
    selector: String,

    /// Output file (defaults to a name derived from the URL)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv or json
    #[arg(short, long, default_value = "csv")]
    format: String,

    /// Page request timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_PAGE_TIMEOUT_SECS)]
    timeout: u64,

    /// Per-image request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_IMAGE_TIMEOUT_SECS)]
    image_timeout: u64,

    /// Custom user agent
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Proxy URL (e.g., http://proxy.example.com:8080)
    #[arg(short, long)]
    proxy: Option<String>,

    /// Do not request images; leave ImageSizeKB empty
    #[arg(long)]
    no_image_size: bool,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            url: self.url.clone(),
            selector: self.selector.clone(),
            page_timeout: Duration::from_secs(self.timeout),
            image_timeout: Duration::from_secs(self.image_timeout),
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            proxy: self.proxy.clone(),
            probe_images: !self.no_image_size,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let no_products = e
                .downcast_ref::<ScraperError>()
                .is_some_and(ScraperError::is_no_products);
            if no_products {
                eprintln!("❌ No products found. Check the selector '{}'.", args.selector);
            } else {
                eprintln!("❌ {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    log::info!("🚀 Product Scraper v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = Url::parse(&args.url) {
        return Err(ScraperError::InvalidUrl(format!("{}: {}", args.url, e)).into());
    }
    let format: OutputFormat = args.format.parse()?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.url, format));

    log::info!("📋 Scraping {} with selector '{}'", args.url, args.selector);

    let spinner = (!args.quiet && !args.verbose).then(|| Spinner::start("Scraping products..."));
    let result = scrape_products(&args.scrape_config()).await;
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    let records = result?;
    write_records(&records, &output, format)?;

    log::info!(
        "✅ Extracted {} product(s) into {}",
        records.len(),
        output.display()
    );
    Ok(())
}
