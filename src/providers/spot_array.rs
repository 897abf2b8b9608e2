//! Spot-price array responses, as served by metals.live style endpoints:
//! `[{"gold": 2330.5}, {"silver": 29.4}, {"platinum": 990.0}]` in USD per troy ounce.

use super::{NormalizeContext, OunceQuote, as_number, as_timestamp, build_pair, parse_body};
use crate::core::rate::{RateError, RatePair};
use serde_json::Value;

pub fn normalize(body: &str, ctx: &NormalizeContext) -> Result<RatePair, RateError> {
    let value = parse_body(body)?;
    let entries = value
        .as_array()
        .ok_or_else(|| RateError::Parse("expected a JSON array".to_string()))?;

    let mut gold = None;
    let mut silver = None;
    let mut observed_at = ctx.observed_at;

    for entry in entries.iter().filter_map(Value::as_object) {
        for (key, value) in entry {
            match key.to_ascii_lowercase().as_str() {
                "gold" => gold = gold.or(as_number(value).map(OunceQuote::spot)),
                "silver" => silver = silver.or(as_number(value).map(OunceQuote::spot)),
                "timestamp" => {
                    if let Some(ts) = as_timestamp(value) {
                        observed_at = ts;
                    }
                }
                _ => {}
            }
        }
    }

    build_pair(ctx, observed_at, gold, silver)
}
