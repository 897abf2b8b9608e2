//! Ticker map responses keyed by ISO metal code, USD per troy ounce with the
//! day's change: `{"XAU": {"price": 2330.5, "ch": 12.1, "chp": 0.52}, "XAG": {...}}`.

use super::{NormalizeContext, OunceQuote, as_number, as_timestamp, build_pair, parse_body};
use crate::core::rate::{RateError, RatePair};
use serde_json::{Map, Value};

const GOLD_TICKERS: [&str; 2] = ["XAU", "XAUUSD"];
const SILVER_TICKERS: [&str; 2] = ["XAG", "XAGUSD"];

fn find_entry<'a>(map: &'a Map<String, Value>, tickers: &[&str]) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| tickers.iter().any(|t| key.eq_ignore_ascii_case(t)))
        .map(|(_, value)| value)
}

fn field(entry: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .find_map(|name| entry.get(*name).and_then(as_number))
}

fn read_quote(entry: &Value) -> Option<OunceQuote> {
    // Some feeds collapse the entry to a bare price.
    if let Some(price) = as_number(entry) {
        return Some(OunceQuote::spot(price));
    }
    let entry = entry.as_object()?;
    Some(OunceQuote {
        usd_per_ounce: field(entry, &["price", "ask", "bid"])?,
        change_usd: field(entry, &["ch", "change"]).unwrap_or_default(),
        change_percent: field(entry, &["chp", "change_percent"]).unwrap_or_default(),
    })
}

pub fn normalize(body: &str, ctx: &NormalizeContext) -> Result<RatePair, RateError> {
    let value = parse_body(body)?;
    let map = value
        .as_object()
        .ok_or_else(|| RateError::Parse("expected a JSON object".to_string()))?;

    let gold = find_entry(map, &GOLD_TICKERS).and_then(read_quote);
    let silver = find_entry(map, &SILVER_TICKERS).and_then(read_quote);
    let observed_at = map
        .get("timestamp")
        .and_then(as_timestamp)
        .unwrap_or(ctx.observed_at);

    build_pair(ctx, observed_at, gold, silver)
}
