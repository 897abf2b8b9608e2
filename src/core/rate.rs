//! Metal rate quotes, provenance and the default rate set

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// Grams in one troy ounce.
pub const TROY_OUNCE_GRAMS: f64 = 31.1035;

/// USD to INR multiplier used when the configuration does not provide one.
pub const DEFAULT_USD_TO_INR: f64 = 83.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
}

impl Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Metal::Gold => "Gold",
                Metal::Silver => "Silver",
            }
        )
    }
}

/// Reasons a rate provider attempt did not produce a usable pair.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("Timed out after {0} ms")]
    Timeout(u64),
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("No {0} entry in response")]
    MissingMetal(Metal),
    #[error("Invalid {metal} rate: {price}")]
    InvalidRate { metal: Metal, price: f64 },
    #[error("No rate providers configured")]
    NoProviders,
}

/// Converts a USD per troy ounce price into INR per gram. Not rounded.
pub fn usd_per_ounce_to_inr_per_gram(usd_per_ounce: f64, usd_to_inr: f64) -> f64 {
    usd_per_ounce * usd_to_inr / TROY_OUNCE_GRAMS
}

/// A single metal price in INR per gram.
///
/// The price is always finite and strictly positive. Fields are private so the
/// only ways to obtain a quote are [`MetalRateQuote::new`] and deserialization,
/// both of which run the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuoteRecord")]
pub struct MetalRateQuote {
    metal: Metal,
    price_per_gram: f64,
    change_absolute: f64,
    change_percent: f64,
    observed_at: DateTime<Utc>,
    source: String,
}

#[derive(Deserialize)]
struct QuoteRecord {
    metal: Metal,
    price_per_gram: f64,
    #[serde(default)]
    change_absolute: f64,
    #[serde(default)]
    change_percent: f64,
    observed_at: DateTime<Utc>,
    source: String,
}

impl TryFrom<QuoteRecord> for MetalRateQuote {
    type Error = RateError;

    fn try_from(record: QuoteRecord) -> Result<Self, Self::Error> {
        MetalRateQuote::new(
            record.metal,
            record.price_per_gram,
            record.change_absolute,
            record.change_percent,
            record.observed_at,
            record.source,
        )
    }
}

impl MetalRateQuote {
    pub fn new(
        metal: Metal,
        price_per_gram: f64,
        change_absolute: f64,
        change_percent: f64,
        observed_at: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Result<Self, RateError> {
        if !price_per_gram.is_finite() || price_per_gram <= 0.0 {
            return Err(RateError::InvalidRate {
                metal,
                price: price_per_gram,
            });
        }
        Ok(Self {
            metal,
            price_per_gram,
            change_absolute: finite_or_zero(change_absolute),
            change_percent: finite_or_zero(change_percent),
            observed_at,
            source: source.into(),
        })
    }

    pub fn metal(&self) -> Metal {
        self.metal
    }

    pub fn price_per_gram(&self) -> f64 {
        self.price_per_gram
    }

    pub fn change_absolute(&self) -> f64 {
        self.change_absolute
    }

    pub fn change_percent(&self) -> f64 {
        self.change_percent
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Gold and silver quotes accepted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RatePairRecord")]
pub struct RatePair {
    gold: MetalRateQuote,
    silver: MetalRateQuote,
}

#[derive(Deserialize)]
struct RatePairRecord {
    gold: MetalRateQuote,
    silver: MetalRateQuote,
}

impl TryFrom<RatePairRecord> for RatePair {
    type Error = RateError;

    fn try_from(record: RatePairRecord) -> Result<Self, Self::Error> {
        RatePair::new(record.gold, record.silver)
    }
}

impl RatePair {
    pub fn new(gold: MetalRateQuote, silver: MetalRateQuote) -> Result<Self, RateError> {
        if gold.metal() != Metal::Gold {
            return Err(RateError::MissingMetal(Metal::Gold));
        }
        if silver.metal() != Metal::Silver {
            return Err(RateError::MissingMetal(Metal::Silver));
        }
        Ok(Self { gold, silver })
    }

    pub fn gold(&self) -> &MetalRateQuote {
        &self.gold
    }

    pub fn silver(&self) -> &MetalRateQuote {
        &self.silver
    }

    pub fn quote(&self, metal: Metal) -> &MetalRateQuote {
        match metal {
            Metal::Gold => &self.gold,
            Metal::Silver => &self.silver,
        }
    }
}

/// Where a rate snapshot came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provenance {
    Live { provider: String },
    Default { label: String },
}

impl Provenance {
    pub fn is_live(&self) -> bool {
        matches!(self, Provenance::Live { .. })
    }

    /// Short text shown next to prices derived from this snapshot.
    pub fn badge(&self) -> String {
        match self {
            Provenance::Live { .. } => "Live Price".to_string(),
            Provenance::Default { label } => format!("Default rates ({label})"),
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Live { provider } => write!(f, "{provider}"),
            Provenance::Default { label } => write!(f, "default ({label})"),
        }
    }
}

/// The result of one aggregation run, as persisted for pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub rates: RatePair,
    pub provenance: Provenance,
    pub fetched_at: DateTime<Utc>,
}

/// Last-resort rates used when every provider fails.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultRateSet {
    rates: RatePair,
    label: NaiveDate,
}

const DEFAULT_GOLD_PER_GRAM: f64 = 7250.0;
const DEFAULT_SILVER_PER_GRAM: f64 = 92.0;
const DEFAULT_RATES_LABEL: (i32, u32, u32) = (2024, 7, 1);

impl DefaultRateSet {
    pub fn new(
        gold_per_gram: f64,
        silver_per_gram: f64,
        label: NaiveDate,
    ) -> Result<Self, RateError> {
        let observed_at = label.and_time(NaiveTime::MIN).and_utc();
        let source = Self::source_label(label);
        let gold =
            MetalRateQuote::new(Metal::Gold, gold_per_gram, 0.0, 0.0, observed_at, &source)?;
        let silver =
            MetalRateQuote::new(Metal::Silver, silver_per_gram, 0.0, 0.0, observed_at, &source)?;
        Ok(Self {
            rates: RatePair { gold, silver },
            label,
        })
    }

    fn source_label(label: NaiveDate) -> String {
        format!("default-rates@{label}")
    }

    pub fn label(&self) -> NaiveDate {
        self.label
    }

    pub fn rates(&self) -> &RatePair {
        &self.rates
    }

    pub fn snapshot(&self, fetched_at: DateTime<Utc>) -> RateSnapshot {
        RateSnapshot {
            rates: self.rates.clone(),
            provenance: Provenance::Default {
                label: Self::source_label(self.label),
            },
            fetched_at,
        }
    }
}

impl Default for DefaultRateSet {
    fn default() -> Self {
        let (year, month, day) = DEFAULT_RATES_LABEL;
        let label = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
        let observed_at = label.and_time(NaiveTime::MIN).and_utc();
        let source = Self::source_label(label);
        let quote = |metal, price_per_gram| MetalRateQuote {
            metal,
            price_per_gram,
            change_absolute: 0.0,
            change_percent: 0.0,
            observed_at,
            source: source.clone(),
        };
        Self {
            rates: RatePair {
                gold: quote(Metal::Gold, DEFAULT_GOLD_PER_GRAM),
                silver: quote(Metal::Silver, DEFAULT_SILVER_PER_GRAM),
            },
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_quote_rejects_non_positive_price() {
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = MetalRateQuote::new(Metal::Gold, price, 0.0, 0.0, now(), "test");
            assert!(result.is_err(), "price {price} should be rejected");
        }
    }

    #[test]
    fn test_quote_zeroes_non_finite_changes() {
        let quote =
            MetalRateQuote::new(Metal::Silver, 90.0, f64::NAN, f64::INFINITY, now(), "test")
                .unwrap();
        assert_eq!(quote.change_absolute(), 0.0);
        assert_eq!(quote.change_percent(), 0.0);
        assert_eq!(quote.source(), "test");
    }

    #[test]
    fn test_deserialize_rejects_invalid_quote() {
        let json = r#"{
            "metal": "gold",
            "price_per_gram": 0.0,
            "change_absolute": 0.0,
            "change_percent": 0.0,
            "observed_at": "2024-07-01T00:00:00Z",
            "source": "tampered"
        }"#;
        let result: Result<MetalRateQuote, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_rate_pair_requires_matching_metals() {
        let gold = MetalRateQuote::new(Metal::Gold, 7000.0, 0.0, 0.0, now(), "a").unwrap();
        let silver = MetalRateQuote::new(Metal::Silver, 90.0, 0.0, 0.0, now(), "a").unwrap();

        assert!(RatePair::new(silver.clone(), gold.clone()).is_err());
        let pair = RatePair::new(gold, silver).unwrap();
        assert_eq!(pair.quote(Metal::Gold).price_per_gram(), 7000.0);
        assert_eq!(pair.quote(Metal::Silver).price_per_gram(), 90.0);
    }

    #[test]
    fn test_default_rate_set_is_labelled() {
        let defaults = DefaultRateSet::default();
        let snapshot = defaults.snapshot(now());

        assert_eq!(defaults.label(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(
            snapshot.provenance,
            Provenance::Default {
                label: "default-rates@2024-07-01".to_string()
            }
        );
        assert!(!snapshot.provenance.is_live());
        assert_eq!(snapshot.rates.gold().source(), "default-rates@2024-07-01");
        assert!(snapshot.rates.gold().price_per_gram() > 0.0);
        assert!(snapshot.rates.silver().price_per_gram() > 0.0);
    }

    #[test]
    fn test_custom_default_rate_set_validates_prices() {
        let label = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(DefaultRateSet::new(0.0, 90.0, label).is_err());
        assert!(DefaultRateSet::new(7000.0, -5.0, label).is_err());

        let defaults = DefaultRateSet::new(7100.0, 88.0, label).unwrap();
        assert_eq!(defaults.rates().silver().price_per_gram(), 88.0);
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let snapshot = DefaultRateSet::default().snapshot(now());
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: RateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_badges() {
        let live = Provenance::Live {
            provider: "metals-live".to_string(),
        };
        assert_eq!(live.badge(), "Live Price");
        assert_eq!(live.to_string(), "metals-live");
    }

    #[test]
    fn test_ounce_to_gram_conversion() {
        let inr = usd_per_ounce_to_inr_per_gram(31.1035, 83.0);
        assert!((inr - 83.0).abs() < 1e-9);
    }
}
