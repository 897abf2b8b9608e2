use crate::core::config::RateProviderConfig;
use crate::core::fetch::RateFetcher;
use crate::core::rate::RateError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetches provider responses over HTTPS with a per-provider timeout.
pub struct HttpRateFetcher {
    client: reqwest::Client,
}

impl HttpRateFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("goldrate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn request_url(provider: &RateProviderConfig) -> Result<Url, RateError> {
        let mut url = Url::parse(&provider.endpoint).map_err(|e| {
            RateError::Network(format!("invalid endpoint {}: {e}", provider.endpoint))
        })?;
        if let Some(key) = &provider.api_key {
            url.query_pairs_mut()
                .append_pair(&provider.api_key_param, key);
        }
        Ok(url)
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    #[instrument(
        name = "HttpRateFetch",
        skip(self, provider),
        fields(provider = %provider.name)
    )]
    async fn fetch(&self, provider: &RateProviderConfig) -> Result<String, RateError> {
        let url = Self::request_url(provider)?;
        debug!("Requesting rates from {}", provider.endpoint);

        let response = self
            .client
            .get(url)
            .timeout(Duration::from_millis(provider.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RateError::Timeout(provider.timeout_ms)
                } else {
                    RateError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RateError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                RateError::Timeout(provider.timeout_ms)
            } else {
                RateError::Network(e.to_string())
            }
        })
    }
}
