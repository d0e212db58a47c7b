//! Extraction of quantitative price claims from answer text.
//!
//! A claim is a price-like number with currency context: `$119,750`,
//! `$60k`, `$2.36 trillion`, `3987.23 USD`. Each claim is attached to the
//! nearest preceding symbol mention on the same line and in the same
//! sentence. The first price claim for a symbol is its headline price, the
//! current value the recommendation is built on; later claims for that
//! symbol are derived levels such as targets and stops.
//!
//! Figures introduced by a non-price quantity (`volume $28B`, `market cap
//! of $2.36T`) are still claims, but never a headline.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$\s?(?P<dollar>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)(?P<suffix>[kKmMbBtT]\b|\s?(?i:thousand|million|billion|trillion)\b)?|(?P<plain>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)(?P<plain_suffix>\s?(?i:thousand|million|billion|trillion))?\s?USD\b",
    )
    .expect("price pattern is a valid regex")
});

static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:24h\s+|trading\s+)?volume|market\s+cap(?:italization)?|mcap|cap|tvl|total\s+value\s+locked|(?:circulating\s+|total\s+)?supply|open\s+interest|liquidity)\b",
    )
    .expect("quantity pattern is a valid regex")
});

static PRICE_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:price[sd]?|quoted?|trad(?:es|ing)|spot)\b").expect("price word pattern is a valid regex"));

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?").expect("number pattern is a valid regex")
});

static PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z0-9]{2,10}(?:[-/][A-Z]{2,5}|=[A-Z]{1,2})\b").expect("pair pattern is a valid regex")
});

/// Longest gap between a symbol mention and the price it owns.
const MAX_ATTACH_GAP: usize = 80;

/// One price-like figure asserted by the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceClaim {
    /// The symbol the figure is attached to, if one could be identified.
    pub symbol: Option<String>,
    pub value: f64,
    /// The matched text, e.g. `"$119,750"`.
    pub text: String,
    /// Byte offset of the match in the answer.
    pub start: usize,
    /// First price claim for its symbol.
    pub headline: bool,
    /// The non-price quantity the figure measures, e.g. `"volume"`.
    pub quantity: Option<String>,
}

impl PriceClaim {
    /// True unless the figure is a volume, market cap or similar.
    pub fn is_price(&self) -> bool {
        self.quantity.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    start: usize,
    end: usize,
    symbol: String,
}

/// The set of symbols the extractor recognises as bare tickers.
///
/// Pair-form tickers (`BTC-USD`, `EUR/USD`, `GC=F`) are always recognised.
/// Known symbols are matched verbatim, and the base of a known pair
/// (`BTC` for `BTC-USD`) maps to that pair unless two pairs share the base.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolIndex {
    exact: BTreeSet<String>,
    aliases: BTreeMap<String, String>,
}

impl SymbolIndex {
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let exact: BTreeSet<String> = known
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();

        let mut bases: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for symbol in &exact {
            if let Some((base, _)) = symbol.split_once(['-', '/']) {
                if !base.is_empty() && !exact.contains(base) {
                    bases.entry(base.to_string()).or_default().push(symbol.clone());
                }
            }
        }
        let aliases = bases
            .into_iter()
            .filter_map(|(base, pairs)| match pairs.as_slice() {
                [only] => Some((base, only.clone())),
                _ => None,
            })
            .collect();

        Self { exact, aliases }
    }

    /// Resolve a mention to its canonical symbol.
    pub fn canonical(&self, symbol: &str) -> String {
        self.aliases
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| symbol.to_string())
    }

    fn mentions(&self, text: &str) -> Vec<Mention> {
        let mut found: Vec<Mention> = PAIR_RE
            .find_iter(text)
            .filter(|m| {
                let base = m.as_str().split(['-', '/', '=']).next().unwrap_or_default();
                base.chars().any(|c| c.is_ascii_alphabetic())
            })
            .map(|m| Mention {
                start: m.start(),
                end: m.end(),
                symbol: m.as_str().to_string(),
            })
            .collect();

        for symbol in self.exact.iter().chain(self.aliases.keys()) {
            for (start, matched) in text.match_indices(symbol.as_str()) {
                let end = start + matched.len();
                if is_bounded(text, start, end) {
                    found.push(Mention {
                        start,
                        end,
                        symbol: self.canonical(symbol),
                    });
                }
            }
        }

        // Keep the longest mention at each position and drop overlaps.
        found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let mut kept: Vec<Mention> = Vec::with_capacity(found.len());
        for mention in found {
            if kept.last().map_or(true, |last| mention.start >= last.end) {
                kept.push(mention);
            }
        }
        kept
    }
}

/// Mention boundaries: no alphanumeric before, no ticker character after.
fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after_ok = end == bytes.len()
        || !(bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'-' | b'/' | b'='));
    before_ok && after_ok
}

/// True if the text between a mention and a price ends the mention's scope.
fn breaks_scope(gap: &str) -> bool {
    gap.len() > MAX_ATTACH_GAP
        || gap.contains('\n')
        || [". ", "! ", "? ", "; "].iter().any(|stop| gap.contains(stop))
}

/// Scale factor for a magnitude suffix such as `k`, `B` or ` trillion`.
fn magnitude(suffix: Option<&str>) -> f64 {
    match suffix.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("k" | "thousand") => 1e3,
        Some("m" | "million") => 1e6,
        Some("b" | "billion") => 1e9,
        Some("t" | "trillion") => 1e12,
        _ => 1.0,
    }
}

/// The quantity named just before a figure, unless a price word follows it.
///
/// `context` is the text between the previous figure (or the line start)
/// and this one; only its last clause is considered.
fn quantity_before(context: &str) -> Option<String> {
    let clause_start = [". ", "! ", "? ", "; ", "\n"]
        .iter()
        .filter_map(|stop| context.rfind(stop).map(|i| i + stop.len()))
        .max()
        .unwrap_or(0);
    let clause = &context[clause_start..];

    let quantity = QUANTITY_RE.find_iter(clause).last()?;
    let priced_after = PRICE_WORD_RE
        .find_iter(clause)
        .last()
        .is_some_and(|word| word.start() > quantity.start());
    if priced_after {
        return None;
    }
    let name = quantity.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
    Some(name.to_ascii_lowercase())
}

/// Parse a number that may contain thousands separators.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Every number appearing in `text`, thousands separators removed.
pub fn numbers_in(text: &str) -> Vec<f64> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| parse_number(m.as_str()))
        .collect()
}

/// Extracts `PriceClaim`s from answer text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimExtractor {
    index: SymbolIndex,
}

impl ClaimExtractor {
    pub fn new(index: SymbolIndex) -> Self {
        Self { index }
    }

    /// Build an extractor that knows `symbols` as bare tickers.
    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SymbolIndex::new(symbols))
    }

    /// All price claims in `text`, in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<PriceClaim> {
        let mentions = self.index.mentions(text);
        let mut seen_symbols: BTreeSet<String> = BTreeSet::new();
        let mut claims = Vec::new();
        let mut previous_end = 0;

        for caps in PRICE_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (raw, suffix) = match (caps.name("dollar"), caps.name("plain")) {
                (Some(dollar), _) => (dollar.as_str(), caps.name("suffix")),
                (None, Some(plain)) => (plain.as_str(), caps.name("plain_suffix")),
                (None, None) => continue,
            };
            let multiplier = magnitude(suffix.map(|s| s.as_str()));
            let quantity = quantity_before(&text[previous_end..whole.start()]);
            previous_end = whole.end();
            let Some(value) = parse_number(raw).map(|v| v * multiplier) else {
                continue;
            };

            let symbol = mentions
                .iter()
                .rev()
                .find(|m| m.end <= whole.start())
                .filter(|m| !breaks_scope(&text[m.end..whole.start()]))
                .map(|m| m.symbol.clone());

            let headline = match (&symbol, &quantity) {
                (Some(s), None) => seen_symbols.insert(s.clone()),
                _ => false,
            };

            claims.push(PriceClaim {
                symbol,
                value,
                text: whole.as_str().to_string(),
                start: whole.start(),
                headline,
                quantity,
            });
        }

        claims
    }
}
