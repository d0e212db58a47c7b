//! Tool identities and their typed response payloads.
//!
//! The tool set is closed: every downstream check is keyed by tool identity,
//! so a name outside `ToolName` is rejected at the recorder boundary rather
//! than passed through as an opaque string.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{GroundcheckError, GroundcheckResult};

/// One of the data-fetching capabilities the agent may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    WebSearch,
    BrowsePage,
    FetchPrice,
    CodeExecution,
    OnchainMetrics,
}

/// How quickly data produced by a tool goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessClass {
    /// Price-like data: quotes, on-chain metrics.
    Tight,
    /// News and editorial content.
    Loose,
}

impl ToolName {
    /// Every known tool, in declaration order.
    pub const ALL: [ToolName; 5] = [
        ToolName::WebSearch,
        ToolName::BrowsePage,
        ToolName::FetchPrice,
        ToolName::CodeExecution,
        ToolName::OnchainMetrics,
    ];

    /// The wire name used by the tool layer (e.g. `"fetch_price"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::WebSearch => "web_search",
            ToolName::BrowsePage => "browse_page",
            ToolName::FetchPrice => "fetch_price",
            ToolName::CodeExecution => "code_execution",
            ToolName::OnchainMetrics => "onchain_metrics",
        }
    }

    /// True for the search/browse family that provides contextual research.
    pub fn is_research(self) -> bool {
        matches!(self, ToolName::WebSearch | ToolName::BrowsePage)
    }

    /// The freshness window this tool's data is judged against, or `None` when
    /// its output carries no timestamp.
    pub fn freshness_class(self) -> Option<FreshnessClass> {
        match self {
            ToolName::FetchPrice | ToolName::OnchainMetrics => Some(FreshnessClass::Tight),
            ToolName::WebSearch | ToolName::BrowsePage => Some(FreshnessClass::Loose),
            ToolName::CodeExecution => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = GroundcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| GroundcheckError::UnknownTool {
                name: s.to_string(),
            })
    }
}

/// A single hit returned by `web_search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    /// Publication time as reported by the search backend (unparsed).
    pub timestamp: String,
}

/// The response payload of a tool call, keyed by tool.
///
/// Each variant carries only the fields its tool guarantees. Timestamps stay
/// as the raw strings the tool produced; parsing them is the freshness
/// validator's job, so a malformed value surfaces as a failed check instead
/// of being lost at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolResponse {
    WebSearch {
        results: Vec<SearchResult>,
    },
    BrowsePage {
        #[serde(default)]
        url: String,
        timestamp: String,
        #[serde(default)]
        content: Option<String>,
        /// Numeric fields the scraper extracted (e.g. `price`, `change_pct`).
        #[serde(default, alias = "extracted_data")]
        extracted: BTreeMap<String, f64>,
    },
    FetchPrice {
        symbol: String,
        price: f64,
        timestamp: String,
    },
    CodeExecution {
        output: String,
    },
    OnchainMetrics {
        asset: String,
        metric: String,
        #[serde(default)]
        value: Option<f64>,
        timestamp: String,
    },
}

impl ToolResponse {
    /// Decode a raw tool payload into the variant for `tool`.
    ///
    /// The payload must be a JSON object with the fields that tool guarantees.
    /// A `"tool"` key in the payload, if present, is overwritten by `tool`.
    pub fn from_payload(tool: ToolName, payload: serde_json::Value) -> GroundcheckResult<Self> {
        let serde_json::Value::Object(mut fields) = payload else {
            return Err(GroundcheckError::MalformedResponse {
                tool: tool.to_string(),
                reason: "payload is not a JSON object".to_string(),
            });
        };
        fields.insert(
            "tool".to_string(),
            serde_json::Value::String(tool.as_str().to_string()),
        );
        serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| {
            GroundcheckError::MalformedResponse {
                tool: tool.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// The tool that produced this response.
    pub fn tool(&self) -> ToolName {
        match self {
            ToolResponse::WebSearch { .. } => ToolName::WebSearch,
            ToolResponse::BrowsePage { .. } => ToolName::BrowsePage,
            ToolResponse::FetchPrice { .. } => ToolName::FetchPrice,
            ToolResponse::CodeExecution { .. } => ToolName::CodeExecution,
            ToolResponse::OnchainMetrics { .. } => ToolName::OnchainMetrics,
        }
    }

    /// Every timestamp the payload carries, in payload order.
    pub fn timestamps(&self) -> Vec<&str> {
        match self {
            ToolResponse::WebSearch { results } => {
                results.iter().map(|r| r.timestamp.as_str()).collect()
            }
            ToolResponse::BrowsePage { timestamp, .. }
            | ToolResponse::FetchPrice { timestamp, .. }
            | ToolResponse::OnchainMetrics { timestamp, .. } => vec![timestamp.as_str()],
            ToolResponse::CodeExecution { .. } => Vec::new(),
        }
    }

    /// Structured numeric values the tool reported.
    pub fn numeric_values(&self) -> Vec<f64> {
        match self {
            ToolResponse::FetchPrice { price, .. } => vec![*price],
            ToolResponse::BrowsePage { extracted, .. } => extracted.values().copied().collect(),
            ToolResponse::OnchainMetrics { value, .. } => value.iter().copied().collect(),
            ToolResponse::WebSearch { .. } | ToolResponse::CodeExecution { .. } => Vec::new(),
        }
    }

    /// Free-text fields that may quote figures (snippets, page content, program output).
    pub fn text_fields(&self) -> Vec<&str> {
        match self {
            ToolResponse::WebSearch { results } => results
                .iter()
                .flat_map(|r| [r.title.as_str(), r.snippet.as_str()])
                .collect(),
            ToolResponse::BrowsePage { content, .. } => content.iter().map(String::as_str).collect(),
            ToolResponse::CodeExecution { output } => vec![output.as_str()],
            ToolResponse::FetchPrice { .. } | ToolResponse::OnchainMetrics { .. } => Vec::new(),
        }
    }

    /// URLs this response drew its data from.
    pub fn source_urls(&self) -> Vec<&str> {
        match self {
            ToolResponse::WebSearch { results } => results
                .iter()
                .map(|r| r.url.as_str())
                .filter(|u| !u.is_empty())
                .collect(),
            ToolResponse::BrowsePage { url, .. } if !url.is_empty() => vec![url.as_str()],
            _ => Vec::new(),
        }
    }
}
