use reqwest::Client;
use std::time::Duration;

/// Build the shared HTTP client used by the crawler, intruder and repeater.
///
/// Certificate verification is disabled on purpose: scan targets are
/// frequently staging hosts with self-signed certificates. Do not reuse this
/// client outside of scanning.
pub fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .user_agent("sitevet/0.2 (https://github.com/trapdoorsec/sitevet)")
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to create HTTP client")
}
