//! Exchange-rate map responses with a USD base, in the style of metalpriceapi:
//! `{"success": true, "base": "USD", "rates": {"XAU": 0.000429, "XAG": 0.034}}`.
//!
//! Each `rates` value is troy ounces per USD, so the price is its inverse. A
//! direct `USDXAU` style entry, when present, is used as is.

use super::{NormalizeContext, OunceQuote, as_number, as_timestamp, build_pair, parse_body};
use crate::core::rate::{RateError, RatePair};
use serde_json::{Map, Value};

fn read_quote(rates: &Map<String, Value>, code: &str) -> Option<OunceQuote> {
    if let Some(direct) = rates.get(&format!("USD{code}")).and_then(as_number) {
        return Some(OunceQuote::spot(direct));
    }
    let per_usd = rates.get(code).and_then(as_number)?;
    let usd_per_ounce = if per_usd > 0.0 { 1.0 / per_usd } else { 0.0 };
    Some(OunceQuote::spot(usd_per_ounce))
}

pub fn normalize(body: &str, ctx: &NormalizeContext) -> Result<RatePair, RateError> {
    let value = parse_body(body)?;
    let map = value
        .as_object()
        .ok_or_else(|| RateError::Parse("expected a JSON object".to_string()))?;

    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = map
            .get("error")
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(RateError::Parse(format!("provider reported failure: {reason}")));
    }

    if let Some(base) = map.get("base").and_then(Value::as_str)
        && !base.eq_ignore_ascii_case("USD")
    {
        return Err(RateError::Parse(format!("unsupported base currency {base}")));
    }

    let rates = map
        .get("rates")
        .and_then(Value::as_object)
        .ok_or_else(|| RateError::Parse("missing rates object".to_string()))?;

    let observed_at = map
        .get("timestamp")
        .and_then(as_timestamp)
        .unwrap_or(ctx.observed_at);

    build_pair(
        ctx,
        observed_at,
        read_quote(rates, "XAU"),
        read_quote(rates, "XAG"),
    )
}
