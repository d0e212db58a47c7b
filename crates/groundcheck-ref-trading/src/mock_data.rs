//! Simulated market data for the groundcheck reference runtime.
//!
//! All data in this module is hardcoded. No market data provider is
//! contacted. Payloads have the shapes the tool layer produces, so they go
//! through the same decoding path as live tool output.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use groundcheck_contracts::{
    error::GroundcheckResult,
    trace::{Parameters, RecordId, ResponseId},
};
use groundcheck_trace::TraceRecorder;

// ── Clock and reference prices ───────────────────────────────────────────────

/// The instant every scenario is evaluated at: 2024-12-18 14:35:00 UTC.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 18, 14, 35, 0)
        .single()
        .expect("2024-12-18 14:35:00 is a valid UTC instant")
}

pub const BTC_QUOTE: f64 = 119_743.21;
pub const ETH_QUOTE: f64 = 3_987.23;

/// Independently sourced prices the answers are checked against.
pub fn reference_prices() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("BTC-USD".to_string(), BTC_QUOTE),
        ("ETH-USD".to_string(), ETH_QUOTE),
    ])
}

// ── Agent answers ────────────────────────────────────────────────────────────

/// Quotes the live price and only figures that appear in the tool output.
pub const GROUNDED_ANSWER: &str = "BTC-USD is $119,750 on the live quote. \
Coverage this morning puts the breakout above $119,000, so a long entry near $119,856.45 is reasonable.";

/// States a price no tool returned.
pub const HALLUCINATED_ANSWER: &str = "BTC-USD is $60,000 and looks cheap here. \
Buy with a stop below $58,000.";

/// Accurate price, but the reasoning falls back on training-time knowledge.
pub const STALE_MEMORY_ANSWER: &str = "BTC-USD is $119,750. \
As of my last update, bitcoin rallies into year end, so the trend favors longs.";

/// Two accurate prices backed only by quote lookups.
pub const PRICE_ONLY_ANSWER: &str = "BTC-USD is $119,750 and ETH-USD is $3,987.23; both look strong into the close.";

// ── Tool payloads ────────────────────────────────────────────────────────────

pub const BTC_SEARCH_QUERY: &str = "BTC price December 2024 after:2024-12-18";
pub const BTC_QUOTE_PAGE: &str = "https://finance.yahoo.com/quote/BTC-USD";

/// `web_search` results for the bitcoin price query.
pub fn btc_search_results() -> Value {
    json!({
        "results": [
            {
                "title": "Bitcoin Price Hits New High Above $119,000",
                "url": "https://www.coindesk.com/price/bitcoin",
                "snippet": "Bitcoin (BTC) trading at $119,856.45 as of December 18, 2024, 14:32 UTC",
                "timestamp": "2024-12-18T14:32:00Z"
            }
        ]
    })
}

/// `browse_page` output for the Yahoo Finance BTC-USD quote page.
pub fn btc_quote_page() -> Value {
    json!({
        "url": BTC_QUOTE_PAGE,
        "content": "Bitcoin USD (BTC-USD) Real-time Price: $119,743.21",
        "timestamp": "2024-12-18T14:33:15Z",
        "extracted_data": {
            "price": 119743.21,
            "change_pct": 2.34,
            "volume": 28456789012.0,
            "market_cap": 2356789012345.0
        }
    })
}

/// `fetch_price` output for `symbol`, quoted at `quoted_at`.
pub fn price_quote(symbol: &str, price: f64, quoted_at: DateTime<Utc>) -> Value {
    json!({
        "symbol": symbol,
        "price": price,
        "timestamp": quoted_at.to_rfc3339(),
    })
}

pub fn params(pairs: &[(&str, &str)]) -> Parameters {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), json!(value)))
        .collect()
}

// ── Trace builders ───────────────────────────────────────────────────────────

/// Record one call and mark it completed `latency_ms` later.
pub fn call(
    recorder: &TraceRecorder,
    tool: &str,
    parameters: Parameters,
    payload: Value,
    issued_at: DateTime<Utc>,
    latency_ms: i64,
) -> GroundcheckResult<RecordId> {
    let id = recorder.record(tool, parameters, payload, issued_at)?;
    recorder.finalize(id, issued_at + Duration::milliseconds(latency_ms))?;
    Ok(id)
}

/// Record the date-scoped bitcoin search and the quote page visit.
pub fn record_btc_research(recorder: &TraceRecorder) -> GroundcheckResult<()> {
    let now = reference_now();
    call(
        recorder,
        "web_search",
        params(&[("query", BTC_SEARCH_QUERY)]),
        btc_search_results(),
        now - Duration::minutes(3),
        850,
    )?;
    call(
        recorder,
        "browse_page",
        params(&[("url", BTC_QUOTE_PAGE)]),
        btc_quote_page(),
        now - Duration::seconds(110),
        1_240,
    )?;
    Ok(())
}

/// Record a `fetch_price` call whose quote carries `quoted_at`.
pub fn record_quote(
    recorder: &TraceRecorder,
    symbol: &str,
    price: f64,
    quoted_at: DateTime<Utc>,
) -> GroundcheckResult<RecordId> {
    call(
        recorder,
        "fetch_price",
        params(&[("symbol", symbol)]),
        price_quote(symbol, price, quoted_at),
        reference_now() - Duration::seconds(60),
        180,
    )
}

/// Research plus a BTC-USD quote timestamped `quoted_at`.
pub fn research_trace(quoted_at: DateTime<Utc>) -> GroundcheckResult<TraceRecorder> {
    let recorder = TraceRecorder::new(ResponseId::new());
    record_btc_research(&recorder)?;
    record_quote(&recorder, "BTC-USD", BTC_QUOTE, quoted_at)?;
    Ok(recorder)
}

/// BTC-USD and ETH-USD quotes with no search or browse calls.
pub fn price_only_trace() -> GroundcheckResult<TraceRecorder> {
    let recorder = TraceRecorder::new(ResponseId::new());
    let quoted_at = reference_now() - Duration::minutes(1);
    record_quote(&recorder, "BTC-USD", BTC_QUOTE, quoted_at)?;
    record_quote(&recorder, "ETH-USD", ETH_QUOTE, quoted_at)?;
    Ok(recorder)
}
