//! Rate provider adapters and the HTTP fetcher.
//!
//! Each adapter turns one provider's JSON shape into a validated gold and
//! silver pair. Adapters do no I/O.

pub mod exchange_rates;
pub mod http;
pub mod spot_array;
pub mod ticker_map;

use crate::core::rate::{
    Metal, MetalRateQuote, RateError, RatePair, usd_per_ounce_to_inr_per_gram,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `[{"gold": 2330.5}, {"silver": 29.4}]`
    SpotArray,
    /// `{"XAU": {"price": 2330.5, "ch": 12.1, "chp": 0.52}, "XAG": {...}}`
    TickerMap,
    /// `{"base": "USD", "rates": {"XAU": 0.000429, "XAG": 0.034}}`
    ExchangeRates,
}

impl ProviderKind {
    pub fn normalize(&self, body: &str, ctx: &NormalizeContext) -> Result<RatePair, RateError> {
        match self {
            ProviderKind::SpotArray => spot_array::normalize(body, ctx),
            ProviderKind::TickerMap => ticker_map::normalize(body, ctx),
            ProviderKind::ExchangeRates => exchange_rates::normalize(body, ctx),
        }
    }
}

/// What an adapter needs besides the response body.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub source: String,
    pub usd_to_inr: f64,
    pub observed_at: DateTime<Utc>,
}

/// A provider's figure for one metal, still in USD per troy ounce.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct OunceQuote {
    pub usd_per_ounce: f64,
    pub change_usd: f64,
    pub change_percent: f64,
}

impl OunceQuote {
    pub fn spot(usd_per_ounce: f64) -> Self {
        Self {
            usd_per_ounce,
            ..Default::default()
        }
    }
}

/// Converts both metals to rounded INR per gram and accepts them only together.
pub(crate) fn build_pair(
    ctx: &NormalizeContext,
    observed_at: DateTime<Utc>,
    gold: Option<OunceQuote>,
    silver: Option<OunceQuote>,
) -> Result<RatePair, RateError> {
    let gold = to_gram_quote(ctx, observed_at, Metal::Gold, gold)?;
    let silver = to_gram_quote(ctx, observed_at, Metal::Silver, silver)?;
    RatePair::new(gold, silver)
}

fn to_gram_quote(
    ctx: &NormalizeContext,
    observed_at: DateTime<Utc>,
    metal: Metal,
    quote: Option<OunceQuote>,
) -> Result<MetalRateQuote, RateError> {
    let quote = quote.ok_or(RateError::MissingMetal(metal))?;
    let price_per_gram = usd_per_ounce_to_inr_per_gram(quote.usd_per_ounce, ctx.usd_to_inr).round();
    let change_absolute = usd_per_ounce_to_inr_per_gram(quote.change_usd, ctx.usd_to_inr).round();
    MetalRateQuote::new(
        metal,
        price_per_gram,
        change_absolute,
        quote.change_percent,
        observed_at,
        ctx.source.clone(),
    )
}

/// Reads a JSON number, or a string holding one.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a unix timestamp in seconds into a UTC time.
pub(crate) fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    as_number(value).and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
}

pub(crate) fn parse_body(body: &str) -> Result<Value, RateError> {
    serde_json::from_str(body).map_err(|e| RateError::Parse(e.to_string()))
}
