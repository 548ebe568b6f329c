// Scan orchestration: turns CLI options into a configured crawler run.

use sitevet_scanner::crawler::ProgressCallback;
use sitevet_scanner::result::ScanOutcome;
use sitevet_scanner::Crawler;
use tracing::info;

/// Options for configuring a scan
pub struct ScanOptions {
    pub url: String,
    pub max_depth: usize,
    pub max_urls: Option<usize>,
    pub timeout_secs: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_depth: 2,
            max_urls: None,
            timeout_secs: 5,
        }
    }
}

/// Coerce a bare host name into an https URL. Anything already carrying a
/// scheme is passed through untouched.
pub fn normalize_target(target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    }
}

/// Execute a crawl-and-detect run with the given options.
pub async fn execute_scan(
    options: ScanOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<ScanOutcome, String> {
    let target = normalize_target(&options.url);
    info!("Scanning {}", target);

    let mut crawler = Crawler::with_timeout(options.timeout_secs).with_max_depth(options.max_depth);

    if let Some(cap) = options.max_urls {
        crawler = crawler.with_max_urls(cap);
    }
    if let Some(callback) = progress_callback {
        crawler = crawler.with_progress_callback(callback);
    }

    crawler
        .crawl(&target)
        .await
        .map_err(|e| format!("Failed to scan {}: {}", target, e))
}
