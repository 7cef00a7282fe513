use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::services::delivery_api::DeliveryApi;
use delivery_rater::fetch::{BasicClient, auth::SessionCookie, fetch_bytes};
use delivery_rater::model::{DeliveryRecord, DriverPricingTier};
use delivery_rater::parser::{parse_deliveries, parse_pricing};

#[derive(Serialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Client for the parcel gateway's driver-facing read API.
///
/// Authenticates once with dashboard credentials to obtain the session
/// cookie the gateway expects on every subsequent request, or reuses a
/// cookie supplied directly.
pub struct GatewayClient {
    base_url: String,
    http: SessionCookie<BasicClient>,
}

impl GatewayClient {
    /// Builds a client around an already-established session cookie.
    pub fn with_cookie(base_url: String, cookie: String) -> Self {
        Self {
            base_url,
            http: SessionCookie::new(BasicClient::new(), cookie),
        }
    }

    /// Logs in with dashboard credentials and captures the session cookie.
    pub async fn login(base_url: String, email: &str, password: &str) -> Result<Self> {
        let cookie = Self::exchange_credentials(&base_url, email, password).await?;
        Ok(Self::with_cookie(base_url, cookie))
    }

    async fn exchange_credentials(base_url: &str, email: &str, password: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let login_request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = client
            .post(format!("{base_url}/api/auth/login"))
            .json(&login_request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send login request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Login failed with status {}: {}", status, body));
        }

        let cookie = response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Login response carried no session cookie"))?;

        Ok(cookie)
    }
}

#[async_trait]
impl DeliveryApi for GatewayClient {
    async fn driver_deliveries(&self, driver_id: &str) -> Result<Vec<DeliveryRecord>> {
        let url = format!("{}/api/deliveries/driver/{}", self.base_url, driver_id);

        let bytes = fetch_bytes(&self.http, &url).await?;
        debug!(bytes = bytes.len(), "Delivery payload received");

        parse_deliveries(&bytes)
    }

    async fn active_pricing(&self) -> Result<Vec<DriverPricingTier>> {
        let url = format!("{}/api/pricing-driver?isActive=true", self.base_url);

        let bytes = fetch_bytes(&self.http, &url).await?;
        debug!(bytes = bytes.len(), "Pricing payload received");

        parse_pricing(&bytes)
    }
}
