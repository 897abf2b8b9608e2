//! Rate fetching abstraction

use crate::core::config::RateProviderConfig;
use crate::core::rate::RateError;
use async_trait::async_trait;

/// Retrieves the raw response body of a rate provider.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self, provider: &RateProviderConfig) -> Result<String, RateError>;
}
