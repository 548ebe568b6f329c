use crate::error::Result;
use reqwest::Response;
use reqwest::header::HeaderMap;

/// Snapshot of one fetched HTTP response, as consumed by the detectors.
///
/// Header lookup is case-insensitive via `HeaderMap`. `final_url` differs
/// from `url` when the server redirected.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl PageResponse {
    /// Drain a `reqwest::Response` into an owned snapshot.
    pub async fn read(url: &str, response: Response) -> Result<Self> {
        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(Self {
            url: url.to_string(),
            final_url,
            status,
            headers,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
