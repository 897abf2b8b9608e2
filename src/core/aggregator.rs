//! Priority-ordered rate aggregation with fallback to the default rate set.

use crate::core::config::RateProviderConfig;
use crate::core::fetch::RateFetcher;
use crate::core::rate::{DefaultRateSet, Provenance, RateError, RatePair, RateSnapshot};
use crate::providers::NormalizeContext;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub usd_to_inr: f64,
    pub default_rates: DefaultRateSet,
}

pub struct RateAggregator {
    fetcher: Arc<dyn RateFetcher>,
    config: AggregatorConfig,
}

impl RateAggregator {
    pub fn new(fetcher: Arc<dyn RateFetcher>, config: AggregatorConfig) -> Self {
        Self { fetcher, config }
    }

    /// Returns the rates of the highest-priority provider that answers with a
    /// valid gold and silver pair, or the default rate set when none does.
    ///
    /// Providers are tried one at a time. A provider failure is logged and the
    /// next one is tried. The only error is an empty provider list.
    pub async fn fetch_best_rates(
        &self,
        providers: &[RateProviderConfig],
    ) -> Result<RateSnapshot, RateError> {
        if providers.is_empty() {
            return Err(RateError::NoProviders);
        }

        let mut ordered: Vec<&RateProviderConfig> = providers.iter().collect();
        ordered.sort_by_key(|p| p.priority);

        for provider in ordered {
            match self.try_provider(provider).await {
                Ok(rates) => {
                    info!(
                        provider = %provider.name,
                        gold = rates.gold().price_per_gram(),
                        silver = rates.silver().price_per_gram(),
                        "Accepted rates"
                    );
                    return Ok(RateSnapshot {
                        rates,
                        provenance: Provenance::Live {
                            provider: provider.name.clone(),
                        },
                        fetched_at: Utc::now(),
                    });
                }
                Err(e) => {
                    warn!(provider = %provider.name, error = %e, "Rate provider failed");
                }
            }
        }

        let snapshot = self.config.default_rates.snapshot(Utc::now());
        warn!(
            source = %snapshot.provenance,
            "All rate providers failed, using default rates"
        );
        Ok(snapshot)
    }

    #[instrument(
        name = "RateProviderAttempt",
        skip(self, provider),
        fields(provider = %provider.name)
    )]
    async fn try_provider(&self, provider: &RateProviderConfig) -> Result<RatePair, RateError> {
        let limit = Duration::from_millis(provider.timeout_ms);
        let body = tokio::time::timeout(limit, self.fetcher.fetch(provider))
            .await
            .map_err(|_| RateError::Timeout(provider.timeout_ms))??;
        debug!(bytes = body.len(), "Received provider response");

        let ctx = NormalizeContext {
            source: provider.name.clone(),
            usd_to_inr: self.config.usd_to_inr,
            observed_at: Utc::now(),
        };
        provider.kind.normalize(&body, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::Metal;
    use crate::providers::ProviderKind;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Scripted {
        Body(&'static str),
        Fail(u16),
        Delay(u64, &'static str),
        Hang,
    }

    /// Answers each provider by name and records the order of calls.
    struct ScriptedFetcher {
        responses: HashMap<String, Scripted>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<(&str, Scripted)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(name, r)| (name.to_string(), r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateFetcher for ScriptedFetcher {
        async fn fetch(&self, provider: &RateProviderConfig) -> Result<String, RateError> {
            self.calls.lock().unwrap().push(provider.name.clone());
            match self.responses.get(&provider.name) {
                Some(Scripted::Body(body)) => Ok(body.to_string()),
                Some(Scripted::Fail(status)) => Err(RateError::Status(*status)),
                Some(Scripted::Delay(ms, body)) => {
                    tokio::time::sleep(Duration::from_millis(*ms)).await;
                    Ok(body.to_string())
                }
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(GOOD_SPOT.to_string())
                }
                None => Err(RateError::Network("connection refused".to_string())),
            }
        }
    }

    // 2000 USD/oz and 25 USD/oz with USD->INR of 31.1035 give 2000 and 25 INR/g.
    const GOOD_SPOT: &str = r#"[{"gold": 2000.0}, {"silver": 25.0}]"#;
    const OTHER_SPOT: &str = r#"[{"gold": 3000.0}, {"silver": 35.0}]"#;
    const HALF_SPOT: &str = r#"[{"gold": 2000.0}, {"silver": 0}]"#;

    fn provider(name: &str, priority: i32) -> RateProviderConfig {
        RateProviderConfig {
            name: name.to_string(),
            endpoint: format!("http://localhost/{name}"),
            kind: ProviderKind::SpotArray,
            priority,
            timeout_ms: 50,
            api_key: None,
            api_key_param: "api_key".to_string(),
        }
    }

    fn aggregator(fetcher: Arc<ScriptedFetcher>) -> RateAggregator {
        RateAggregator::new(
            fetcher,
            AggregatorConfig {
                usd_to_inr: 31.1035,
                default_rates: DefaultRateSet::default(),
            },
        )
    }

    #[tokio::test]
    async fn test_first_valid_provider_wins() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("primary", Scripted::Body(GOOD_SPOT)),
            ("secondary", Scripted::Body(OTHER_SPOT)),
        ]));
        let snapshot = aggregator(fetcher.clone())
            .fetch_best_rates(&[provider("primary", 1), provider("secondary", 2)])
            .await
            .unwrap();

        assert_eq!(
            snapshot.provenance,
            Provenance::Live {
                provider: "primary".to_string()
            }
        );
        assert_eq!(snapshot.rates.gold().price_per_gram(), 2000.0);
        assert_eq!(snapshot.rates.silver().price_per_gram(), 25.0);
        assert_eq!(snapshot.rates.gold().source(), "primary");
        assert_eq!(fetcher.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_providers_sorted_by_priority_not_config_order() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("low", Scripted::Body(OTHER_SPOT)),
            ("high", Scripted::Body(GOOD_SPOT)),
        ]));
        let snapshot = aggregator(fetcher.clone())
            .fetch_best_rates(&[provider("low", 5), provider("high", 1)])
            .await
            .unwrap();

        assert_eq!(snapshot.provenance.to_string(), "high");
        assert_eq!(fetcher.calls(), vec!["high"]);
    }

    #[tokio::test]
    async fn test_equal_priorities_keep_config_order() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("first", Scripted::Fail(503)),
            ("second", Scripted::Body(GOOD_SPOT)),
            ("third", Scripted::Body(OTHER_SPOT)),
        ]));
        let snapshot = aggregator(fetcher.clone())
            .fetch_best_rates(&[
                provider("first", 1),
                provider("second", 1),
                provider("third", 1),
            ])
            .await
            .unwrap();

        assert_eq!(snapshot.provenance.to_string(), "second");
        assert_eq!(fetcher.calls(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_falls_through_failures_in_order() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("status", Scripted::Fail(500)),
            ("garbage", Scripted::Body("<html>oops</html>")),
            ("half", Scripted::Body(HALF_SPOT)),
            ("good", Scripted::Body(OTHER_SPOT)),
        ]));
        let snapshot = aggregator(fetcher.clone())
            .fetch_best_rates(&[
                provider("status", 1),
                provider("garbage", 2),
                provider("half", 3),
                provider("good", 4),
                provider("unused", 5),
            ])
            .await
            .unwrap();

        assert_eq!(snapshot.provenance.to_string(), "good");
        assert_eq!(snapshot.rates.gold().price_per_gram(), 3000.0);
        assert_eq!(fetcher.calls(), vec!["status", "garbage", "half", "good"]);
    }

    #[tokio::test]
    async fn test_slower_higher_priority_provider_still_wins() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("primary", Scripted::Delay(30, GOOD_SPOT)),
            ("secondary", Scripted::Body(OTHER_SPOT)),
        ]));
        let mut primary = provider("primary", 1);
        primary.timeout_ms = 500;

        let snapshot = aggregator(fetcher.clone())
            .fetch_best_rates(&[provider("secondary", 2), primary])
            .await
            .unwrap();

        assert_eq!(
            snapshot.provenance,
            Provenance::Live {
                provider: "primary".to_string()
            }
        );
        assert_eq!(snapshot.rates.gold().price_per_gram(), 2000.0);
        assert_eq!(fetcher.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_slow_provider_is_abandoned_after_timeout() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("slow", Scripted::Hang),
            ("fast", Scripted::Body(OTHER_SPOT)),
        ]));
        let started = std::time::Instant::now();
        let snapshot = aggregator(fetcher.clone())
            .fetch_best_rates(&[provider("slow", 1), provider("fast", 2)])
            .await
            .unwrap();

        assert_eq!(snapshot.provenance.to_string(), "fast");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_all_failures_return_default_rates() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("a", Scripted::Fail(500)),
            ("b", Scripted::Body("{}")),
        ]));
        let snapshot = aggregator(fetcher.clone())
            .fetch_best_rates(&[provider("a", 1), provider("b", 2), provider("c", 3)])
            .await
            .unwrap();

        let defaults = DefaultRateSet::default();
        assert_eq!(
            snapshot.provenance,
            Provenance::Default {
                label: "default-rates@2024-07-01".to_string()
            }
        );
        assert_eq!(&snapshot.rates, defaults.rates());
        assert_eq!(fetcher.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_no_providers_is_an_error() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![]));
        let result = aggregator(fetcher).fetch_best_rates(&[]).await;
        assert!(matches!(result, Err(RateError::NoProviders)));
    }

    #[tokio::test]
    async fn test_accepted_quotes_are_positive() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ("tiny", Scripted::Body(r#"[{"gold": 0.0001}, {"silver": 25.0}]"#)),
            ("good", Scripted::Body(GOOD_SPOT)),
        ]));
        let snapshot = aggregator(fetcher)
            .fetch_best_rates(&[provider("tiny", 1), provider("good", 2)])
            .await
            .unwrap();

        // 0.0001 USD/oz rounds to zero rupees per gram and is rejected.
        assert_eq!(snapshot.provenance.to_string(), "good");
        for metal in [Metal::Gold, Metal::Silver] {
            assert!(snapshot.rates.quote(metal).price_per_gram() > 0.0);
        }
    }
}
