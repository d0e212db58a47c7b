//! # groundcheck-ref-trading
//!
//! Trading reference runtime for the groundcheck validation engine.
//!
//! Wires every component (trace recorder, orchestrator, hallucination
//! detector, production monitor, hot-reloadable configuration) into a
//! `ValidationPipeline` and demonstrates it on six scenarios using mock
//! market data:
//!
//! 1. **Fresh and Accurate**: grounded answer, every check passes.
//! 2. **Stale Data**: a ten minute old quote blocks an accurate answer.
//! 3. **Hallucinated Price**: a price no tool returned fails accuracy and citation.
//! 4. **Under-Researched**: correct prices, but no search or browse calls.
//! 5. **Alert Raising and Clearing**: the monitor's hallucination alert.
//! 6. **Empty Answer**: nothing to validate, one critical finding.
//!
//! All data is hardcoded. No market data provider is contacted.

pub mod mock_data;
pub mod pipeline;
pub mod replay;
pub mod scenarios;

pub use pipeline::ValidationPipeline;
pub use replay::{replay, RawToolCall};
