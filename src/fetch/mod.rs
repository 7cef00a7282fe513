pub mod auth;
mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;

/// Performs a GET for `url` through `client` and returns the raw body bytes.
///
/// Non-success statuses are errors: the gateway answers auth problems with
/// an HTML login page, which must never reach the JSON parser.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        anyhow::bail!("request to {url} failed with status {}", resp.status());
    }

    Ok(resp.bytes().await?.to_vec())
}
