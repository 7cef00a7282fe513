use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::COOKIE;

/// An [`HttpClient`] wrapper that attaches the gateway session cookie to
/// every request.
///
/// The gateway authenticates dashboard traffic with a session cookie issued
/// at login; `cookie` is the full `name=value` pair from that exchange.
pub struct SessionCookie<C> {
    pub inner: C,
    pub cookie: String,
}

impl<C> SessionCookie<C> {
    pub fn new(inner: C, cookie: String) -> Self {
        Self { inner, cookie }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for SessionCookie<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        if let Ok(value) = self.cookie.parse() {
            req.headers_mut().insert(COOKIE, value);
        }
        self.inner.execute(req).await
    }
}
