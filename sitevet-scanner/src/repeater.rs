// Request repeater: sends the same request N times in strict sequence so
// rate limiting and non-deterministic responses can be observed in order.

use crate::detect;
use crate::response::PageResponse;
use crate::result::RepeaterEntry;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{info, warn};

/// Request shape replayed by the repeater. `data` is sent as a form body for
/// POST and as query parameters for everything else.
#[derive(Debug, Clone, Default)]
pub struct RepeaterOptions {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub data: Vec<(String, String)>,
    pub iterations: usize,
}

/// Replay the request `iterations` times, sequentially and without backoff.
///
/// Each successful iteration yields an entry with its 1-based index, status,
/// body byte length and XSS/SQL issues. A failed iteration is logged and
/// simply absent from the returned sequence; later iterations still run.
pub async fn run_repeater(client: &Client, options: &RepeaterOptions) -> Vec<RepeaterEntry> {
    let method = options.method.to_uppercase();
    info!("Repeating {} {}", method, options.url);

    let headers = build_headers(&options.headers);
    let mut entries = Vec::new();

    for i in 0..options.iterations {
        let request = if method == "POST" {
            client
                .post(&options.url)
                .headers(headers.clone())
                .form(&options.data)
        } else {
            client
                .get(&options.url)
                .headers(headers.clone())
                .query(&options.data)
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Repeater error on iteration {}: {}", i + 1, e);
                continue;
            }
        };

        let page = match PageResponse::read(&options.url, response).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Repeater error on iteration {}: {}", i + 1, e);
                continue;
            }
        };

        let mut issues = detect::check_reflected_xss(&options.url, &page);
        issues.extend(detect::check_sql_errors(&page));

        info!("Repeater iteration {}: {}", i + 1, page.status);
        entries.push(RepeaterEntry {
            iteration: i + 1,
            status: page.status,
            length: page.body.len(),
            issues,
        });
    }

    entries
}

/// Build a header map from name/value pairs, dropping any pair that is not a
/// valid header.
fn build_headers(pairs: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Dropping invalid header {}: {}", name, value),
        }
    }
    headers
}
