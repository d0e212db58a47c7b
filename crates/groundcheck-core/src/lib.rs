//! # groundcheck-core
//!
//! The validation engine for tool-grounded trading recommendations.
//!
//! This crate provides:
//! - The two seam traits (`Scanner`, `ReportSink`)
//! - The freshness validator and price accuracy checker
//! - Price claim extraction from answer text
//! - The `Orchestrator` that runs every check and produces a `ValidationReport`
//! - Markdown rendering of reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use groundcheck_core::{Orchestrator, traits::{Scanner, ReportSink}};
//! ```

pub mod claims;
pub mod freshness;
pub mod orchestrator;
pub mod price;
pub mod render;
pub mod traits;

pub use claims::{ClaimExtractor, PriceClaim, SymbolIndex};
pub use orchestrator::Orchestrator;
pub use render::render_markdown;
