// Heuristic vulnerability detectors. Each is a pure function of
// (url, response) -> issue strings, except the open-redirect check which
// issues one bounded follow-up HEAD request.

use crate::response::PageResponse;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// What a security header is expected to carry.
#[derive(Debug, Clone, Copy)]
pub enum Expectation {
    /// Exact value, compared case-insensitively.
    Exact(&'static str),
    /// Any one of the listed values.
    OneOf(&'static [&'static str]),
    /// Header only needs to exist.
    Present,
}

/// The header policy table. Extending the check means adding a row here,
/// not touching the control flow below.
pub const HEADER_POLICY: &[(&str, Expectation)] = &[
    ("X-Content-Type-Options", Expectation::Exact("nosniff")),
    ("X-Frame-Options", Expectation::OneOf(&["DENY", "SAMEORIGIN"])),
    ("X-XSS-Protection", Expectation::Exact("1; mode=block")),
    ("Content-Security-Policy", Expectation::Present),
    ("Strict-Transport-Security", Expectation::Present),
    ("Access-Control-Allow-Origin", Expectation::Present),
];

static SQL_ERROR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"you have an error in your sql syntax",
        r"mysql_fetch_array",
        r"syntax error.*sql",
        r"unclosed quotation mark",
        r"sql server.*error",
    ]
    .iter()
    .map(|p| {
        Regex::new(&format!("(?i){}", p)).expect("SQL error pattern must compile")
    })
    .collect()
});

/// Check the response against the security header policy table.
///
/// A missing Strict-Transport-Security is not reported for plaintext URLs
/// since HSTS is meaningless over http. An `Access-Control-Allow-Origin: *`
/// is flagged regardless of the table outcome.
pub fn check_security_headers(url: &str, response: &PageResponse) -> Vec<String> {
    let mut issues = Vec::new();

    for (header, expectation) in HEADER_POLICY {
        let Some(raw) = response.headers.get(*header) else {
            if *header == "Strict-Transport-Security" && !url.starts_with("https") {
                continue;
            }
            issues.push(format!("Missing {}", header));
            continue;
        };
        // Present but not readable as a string is its own misconfiguration,
        // not an absence.
        let Ok(value) = raw.to_str() else {
            issues.push(format!("{}: (malformed value)", header));
            continue;
        };

        match expectation {
            Expectation::Exact(expected) => {
                if !value.eq_ignore_ascii_case(expected) {
                    issues.push(format!("{}: {} (Expected {})", header, value, expected));
                }
            }
            Expectation::OneOf(expected) => {
                if !expected.contains(&value) {
                    issues.push(format!(
                        "{}: {} (Expected one of {:?})",
                        header, value, expected
                    ));
                }
            }
            Expectation::Present => {}
        }

        if *header == "Access-Control-Allow-Origin" && value == "*" {
            issues.push("CORS: Overly permissive (*)".to_string());
        }
    }

    issues
}

/// Flag suspicious inline scripts and query values reflected verbatim in
/// the body. The reflection check is deliberately naive: it has no context
/// or sanitization awareness and will flag values that are echoed safely.
pub fn check_reflected_xss(url: &str, response: &PageResponse) -> Vec<String> {
    let mut issues = Vec::new();

    let document = Html::parse_document(&response.body);
    let script_selector = Selector::parse("script").expect("static selector");

    for element in document.select(&script_selector) {
        let script: String = element.text().collect();
        let lowered = script.to_lowercase();
        if lowered.contains("alert(") || lowered.contains("document.write") {
            issues.push("Potential XSS in script tag".to_string());
        }
    }

    if let Some((_, query)) = url.split_once('?') {
        for param in query.split('&') {
            // Raw value is whatever follows the last '='.
            let value = param.rsplit('=').next().unwrap_or(param);
            if !value.is_empty() && response.body.contains(value) {
                issues.push(format!("Reflected parameter '{}' in response", value));
            }
        }
    }

    issues
}

/// Match the body against known database error signatures.
pub fn check_sql_errors(response: &PageResponse) -> Vec<String> {
    SQL_ERROR_PATTERNS
        .iter()
        .filter(|pattern| pattern.is_match(&response.body))
        .map(|pattern| format!("Potential SQLi error pattern: {}", pattern.as_str()))
        .collect()
}

/// Probe a `redirect=` query parameter for an open redirect.
///
/// Only applies when the query contains "redirect". The extracted target is
/// fetched with HEAD, redirects followed, and flagged when the final URL
/// differs from the originating request URL. Transport failures on the
/// follow-up are swallowed: this check is best effort.
pub async fn check_open_redirect(client: &Client, url: &str) -> Vec<String> {
    let mut issues = Vec::new();

    let Some((_, query)) = url.split_once('?') else {
        return issues;
    };

    // Locate "redirect=" case-insensitively, then extract from the raw
    // query. ASCII lowercasing keeps byte offsets aligned.
    let Some(pos) = query.to_ascii_lowercase().find("redirect=") else {
        return issues;
    };
    let rest = &query[pos + "redirect=".len()..];
    let target = rest.split('&').next().unwrap_or(rest);
    if target.is_empty() {
        return issues;
    }

    match client.head(target).send().await {
        Ok(response) => {
            let final_url = response.url().to_string();
            if final_url != url {
                issues.push(format!("Open redirect to {}", final_url));
            }
        }
        Err(e) => {
            debug!("Redirect probe for {} failed: {}", target, e);
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response_with(url: &str, headers: &[(&str, &str)], body: &str) -> PageResponse {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            header_map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        PageResponse {
            url: url.to_string(),
            final_url: url.to_string(),
            status: 200,
            headers: header_map,
            body: body.to_string(),
        }
    }

    // ========================================================================
    // Security header tests
    // ========================================================================

    #[test]
    fn test_all_headers_missing_on_https() {
        let response = response_with("https://example.com/", &[], "");
        let issues = check_security_headers("https://example.com/", &response);

        for (header, _) in HEADER_POLICY {
            assert!(
                issues.contains(&format!("Missing {}", header)),
                "expected a missing entry for {}",
                header
            );
        }
        assert_eq!(issues.len(), HEADER_POLICY.len());
    }

    #[test]
    fn test_hsts_absence_suppressed_over_plaintext() {
        let response = response_with("http://example.com/", &[], "");
        let issues = check_security_headers("http://example.com/", &response);

        assert!(!issues.contains(&"Missing Strict-Transport-Security".to_string()));
        assert!(issues.contains(&"Missing X-Frame-Options".to_string()));
    }

    #[test]
    fn test_exact_header_mismatch_flagged() {
        let response = response_with(
            "https://example.com/",
            &[("X-Content-Type-Options", "sniff-away")],
            "",
        );
        let issues = check_security_headers("https://example.com/", &response);

        assert!(issues
            .iter()
            .any(|i| i.starts_with("X-Content-Type-Options: sniff-away")));
    }

    #[test]
    fn test_exact_header_match_is_case_insensitive() {
        let response = response_with(
            "https://example.com/",
            &[("X-Content-Type-Options", "NoSniff")],
            "",
        );
        let issues = check_security_headers("https://example.com/", &response);

        assert!(!issues.iter().any(|i| i.contains("X-Content-Type-Options:")));
    }

    #[test]
    fn test_one_of_header_membership() {
        let good = response_with("https://example.com/", &[("X-Frame-Options", "SAMEORIGIN")], "");
        let issues = check_security_headers("https://example.com/", &good);
        assert!(!issues.iter().any(|i| i.contains("X-Frame-Options:")));

        let bad = response_with("https://example.com/", &[("X-Frame-Options", "ALLOWALL")], "");
        let issues = check_security_headers("https://example.com/", &bad);
        assert!(issues.iter().any(|i| i.contains("X-Frame-Options: ALLOWALL")));
    }

    #[test]
    fn test_permissive_cors_always_flagged() {
        let response = response_with(
            "https://example.com/",
            &[("Access-Control-Allow-Origin", "*")],
            "",
        );
        let issues = check_security_headers("https://example.com/", &response);

        assert!(issues.contains(&"CORS: Overly permissive (*)".to_string()));
    }

    #[test]
    fn test_unreadable_header_value_not_reported_missing() {
        let mut header_map = HeaderMap::new();
        // Valid header bytes that are not a valid string value.
        header_map.insert(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_bytes(b"nosniff\xff").unwrap(),
        );
        let response = PageResponse {
            url: "https://example.com/".to_string(),
            final_url: "https://example.com/".to_string(),
            status: 200,
            headers: header_map,
            body: String::new(),
        };
        let issues = check_security_headers("https://example.com/", &response);

        assert!(!issues.contains(&"Missing X-Content-Type-Options".to_string()));
        assert!(issues.contains(&"X-Content-Type-Options: (malformed value)".to_string()));
    }

    #[test]
    fn test_scoped_cors_not_flagged() {
        let response = response_with(
            "https://example.com/",
            &[("Access-Control-Allow-Origin", "https://example.com")],
            "",
        );
        let issues = check_security_headers("https://example.com/", &response);

        assert!(!issues.contains(&"CORS: Overly permissive (*)".to_string()));
    }

    // ========================================================================
    // XSS tests
    // ========================================================================

    #[test]
    fn test_inline_script_with_alert_flagged() {
        let body = "<html><body><script>alert(document.cookie)</script></body></html>";
        let response = response_with("http://example.com/", &[], body);
        let issues = check_reflected_xss("http://example.com/", &response);

        assert_eq!(issues, vec!["Potential XSS in script tag"]);
    }

    #[test]
    fn test_inline_script_document_write_case_insensitive() {
        let body = "<html><script>Document.Write('<b>hi</b>')</script></html>";
        let response = response_with("http://example.com/", &[], body);
        let issues = check_reflected_xss("http://example.com/", &response);

        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_benign_script_not_flagged() {
        let body = "<html><script>console.log('ok')</script></html>";
        let response = response_with("http://example.com/", &[], body);
        let issues = check_reflected_xss("http://example.com/", &response);

        assert!(issues.is_empty());
    }

    #[test]
    fn test_reflected_query_value_flagged() {
        let url = "http://example.com/search?q=xyz123";
        let body = "<html><body>results for xyz123</body></html>";
        let response = response_with(url, &[], body);
        let issues = check_reflected_xss(url, &response);

        assert_eq!(issues, vec!["Reflected parameter 'xyz123' in response"]);
    }

    #[test]
    fn test_unreflected_query_value_clean() {
        let url = "http://example.com/search?q=xyz123";
        let body = "<html><body>no results</body></html>";
        let response = response_with(url, &[], body);
        let issues = check_reflected_xss(url, &response);

        assert!(issues.is_empty());
    }

    #[test]
    fn test_empty_query_value_ignored() {
        let url = "http://example.com/search?q=";
        let response = response_with(url, &[], "<html>anything</html>");
        let issues = check_reflected_xss(url, &response);

        assert!(issues.is_empty());
    }

    // ========================================================================
    // SQL error tests
    // ========================================================================

    #[test]
    fn test_mysql_syntax_error_flagged() {
        let body = "Error: You have an error in your SQL syntax near 'x'";
        let response = response_with("http://example.com/", &[], body);
        let issues = check_sql_errors(&response);

        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Potential SQLi error pattern:"));
    }

    #[test]
    fn test_mssql_unclosed_quotation_flagged() {
        let body = "Unclosed quotation mark after the character string ''.";
        let response = response_with("http://example.com/", &[], body);
        let issues = check_sql_errors(&response);

        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_clean_body_no_sql_issues() {
        let response = response_with("http://example.com/", &[], "<html>hello</html>");
        assert!(check_sql_errors(&response).is_empty());
    }

    #[test]
    fn test_multiple_patterns_yield_multiple_issues() {
        let body = "mysql_fetch_array(): you have an error in your sql syntax";
        let response = response_with("http://example.com/", &[], body);
        let issues = check_sql_errors(&response);

        assert_eq!(issues.len(), 2);
    }

    // ========================================================================
    // Open redirect tests
    // ========================================================================

    #[tokio::test]
    async fn test_open_redirect_flagged_when_target_resolves_elsewhere() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = crate::build_client(5);
        let url = format!("{}/go?redirect={}/landing", mock_server.uri(), mock_server.uri());
        let issues = check_open_redirect(&client, &url).await;

        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Open redirect to"));
    }

    #[tokio::test]
    async fn test_open_redirect_parameter_name_case_insensitive() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = crate::build_client(5);
        let url = format!("{}/go?Redirect={}/landing", mock_server.uri(), mock_server.uri());
        let issues = check_open_redirect(&client, &url).await;

        assert_eq!(issues.len(), 1);
    }

    #[tokio::test]
    async fn test_no_redirect_parameter_no_probe() {
        let client = crate::build_client(5);
        let issues = check_open_redirect(&client, "http://example.com/?page=1").await;

        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_redirect_target_swallowed() {
        let client = crate::build_client(1);
        // Reserved TEST-NET-1 address, nothing listens there.
        let url = "http://example.com/?redirect=http://192.0.2.1:1/";
        let issues = check_open_redirect(&client, url).await;

        assert!(issues.is_empty());
    }
}
