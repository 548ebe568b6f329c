use crate::client::build_client;
use crate::detect;
use crate::error::{Result, ScanError};
use crate::response::PageResponse;
use crate::result::{Finding, FormDescriptor, ScanOutcome};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Called with (pages visited so far, URL about to be fetched).
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Worklist-driven same-origin crawler that runs every fetched page through
/// the detectors and collects findings and forms.
///
/// Traversal state (visited set, frontier, findings) belongs to one `crawl`
/// invocation; calling `crawl` again starts from scratch. Everything runs on
/// a single task: fetches and detector calls are strictly sequential.
pub struct Crawler {
    client: Client,
    max_depth: usize,
    max_urls: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(5)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            max_depth: 2,
            max_urls: None,
            progress_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Hard cap on the total number of URLs a run may visit. Unset means the
    /// only bound is the depth limit.
    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = Some(max_urls);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Crawl same-origin pages reachable from `start_url` up to the depth
    /// bound, scanning each fetched page.
    ///
    /// An unreachable start URL is not an error: the transport failure is
    /// logged and an empty outcome returned.
    pub async fn crawl(&self, start_url: &str) -> Result<ScanOutcome> {
        let base = Url::parse(start_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", start_url, e)))?;
        // Normalized form, so links back to the start page dedup correctly.
        let start = base.to_string();

        info!("Starting crawl of {} (max depth {})", start, self.max_depth);

        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<(String, usize)> = VecDeque::new();
        let mut outcome = ScanOutcome::default();

        // Visited before the fetch is enqueued, so the start URL can never
        // re-enter the frontier through a link back to itself.
        visited.insert(start.clone());
        frontier.push_back((start, 0));

        while let Some((url, depth)) = frontier.pop_front() {
            if let Some(ref callback) = self.progress_callback {
                callback(outcome.pages_visited, url.clone());
            }

            debug!("Crawling {} at depth {}", url, depth);

            let response = match self.client.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Error crawling {}: {}", url, e);
                    continue;
                }
            };

            let page = match PageResponse::read(&url, response).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Error reading body of {}: {}", url, e);
                    continue;
                }
            };

            outcome.pages_visited += 1;

            // Nothing to scan and nothing to descend into.
            if !page.is_success() {
                debug!("Skipping {} (status {})", url, page.status);
                continue;
            }

            self.scan_page(&url, &page, &mut outcome).await;

            let (links, forms) = extract_elements(&page.body, &url);
            outcome.forms.extend(forms);

            for link in links {
                if !same_origin(&link, &base) {
                    debug!("Off-origin link discovered, not traversed: {}", link);
                    continue;
                }
                if depth + 1 > self.max_depth {
                    continue;
                }
                if let Some(cap) = self.max_urls
                    && visited.len() >= cap
                {
                    debug!("URL cap of {} reached, dropping {}", cap, link);
                    continue;
                }
                if visited.insert(link.clone()) {
                    frontier.push_back((link, depth + 1));
                }
            }
        }

        info!(
            "Crawl complete. Visited {} pages, {} findings, {} forms",
            outcome.pages_visited,
            outcome.findings.len(),
            outcome.forms.len()
        );

        Ok(outcome)
    }

    /// Run all four detectors against a fetched page and record a finding
    /// when any of them reported issues.
    async fn scan_page(&self, url: &str, page: &PageResponse, outcome: &mut ScanOutcome) {
        let finding = Finding {
            url: url.to_string(),
            header_issues: detect::check_security_headers(url, page),
            xss_issues: detect::check_reflected_xss(url, page),
            sqli_issues: detect::check_sql_errors(page),
            redirect_issues: detect::check_open_redirect(&self.client, url).await,
        };

        if !finding.is_empty() {
            info!("Found {} issues at {}", finding.issue_count(), url);
            outcome.findings.push(finding);
        }
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull anchor targets and form descriptors out of a page body. Links are
/// resolved against the page URL; unresolvable or non-navigable hrefs are
/// dropped.
fn extract_elements(html: &str, page_url: &str) -> (Vec<String>, Vec<FormDescriptor>) {
    let document = Html::parse_document(html);

    let link_selector = Selector::parse("a[href]").expect("static selector");
    let mut links = Vec::new();

    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(absolute) = resolve_url(page_url, href)
        {
            links.push(absolute);
        }
    }

    let form_selector = Selector::parse("form").expect("static selector");
    let forms = document
        .select(&form_selector)
        .map(|form| describe_form(form, page_url))
        .collect();

    (links, forms)
}

fn describe_form(form: ElementRef<'_>, page_url: &str) -> FormDescriptor {
    let action = form.value().attr("action").unwrap_or("");
    let resolved_action = Url::parse(page_url)
        .ok()
        .and_then(|base| base.join(action).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| page_url.to_string());

    let method = form
        .value()
        .attr("method")
        .unwrap_or("GET")
        .to_uppercase();

    let input_selector = Selector::parse("input[name]").expect("static selector");
    let inputs = form
        .select(&input_selector)
        .filter_map(|input| input.value().attr("name"))
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    FormDescriptor {
        url: page_url.to_string(),
        action: resolved_action,
        method,
        inputs,
    }
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    // Skip empty, javascript:, mailto:, tel: and pure-fragment links.
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}

/// Scheme, host and port must all match the run's base URL.
fn same_origin(url: &str, base: &Url) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    parsed.scheme() == base.scheme()
        && parsed.host_str() == base.host_str()
        && parsed.port_or_known_default() == base.port_or_known_default()
}
