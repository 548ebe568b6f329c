// Single-parameter payload fuzzer. Rewrites one query parameter per payload
// and reruns the XSS and SQL detectors against each response.

use crate::detect;
use crate::error::{Result, ScanError};
use crate::response::PageResponse;
use crate::result::IntruderEntry;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

/// Script-tag XSS probe, boolean SQLi probe, off-site redirect probe.
pub fn default_payloads() -> Vec<String> {
    vec![
        "<script>alert(1)</script>".to_string(),
        "' OR 1=1 --".to_string(),
        "http://evil.com".to_string(),
    ]
}

/// Fuzz `param` on `url` with each payload in order.
///
/// An entry is recorded only for payloads whose response tripped the XSS or
/// SQL detectors. A transport failure abandons that payload and moves on.
pub async fn run_intruder(
    client: &Client,
    url: &str,
    param: &str,
    payloads: &[String],
) -> Result<Vec<IntruderEntry>> {
    info!("Fuzzing {} with param {}", url, param);

    let mut entries = Vec::new();

    for payload in payloads {
        let fuzzed_url = build_fuzzed_url(url, param, payload)?;

        let response = match client.get(&fuzzed_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error fuzzing {}: {}", fuzzed_url, e);
                continue;
            }
        };

        let page = match PageResponse::read(&fuzzed_url, response).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Error reading body of {}: {}", fuzzed_url, e);
                continue;
            }
        };

        let mut issues = detect::check_reflected_xss(&fuzzed_url, &page);
        issues.extend(detect::check_sql_errors(&page));

        if !issues.is_empty() {
            info!("Intruder found issues with payload {}", payload);
            entries.push(IntruderEntry {
                payload: payload.clone(),
                issues,
            });
        }
    }

    Ok(entries)
}

/// Rewrite the URL's query with `param` set to `payload`.
///
/// Existing parameters keep their first-seen order; a duplicated key keeps
/// its last value. Values are percent-encoded on reserialization, so
/// detection of an injected payload relies on response-side patterns rather
/// than spotting the literal payload in the fuzzed URL.
pub fn build_fuzzed_url(url: &str, param: &str, payload: &str) -> Result<String> {
    let mut parsed =
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

    let mut params: Vec<(String, String)> = Vec::new();
    for (key, value) in parsed.query_pairs() {
        match params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value.into_owned(),
            None => params.push((key.into_owned(), value.into_owned())),
        }
    }

    match params.iter_mut().find(|(k, _)| k == param) {
        Some(entry) => entry.1 = payload.to_string(),
        None => params.push((param.to_string(), payload.to_string())),
    }

    parsed.set_query(None);
    parsed.query_pairs_mut().extend_pairs(&params);

    Ok(parsed.to_string())
}
