//! # groundcheck-monitor
//!
//! Production monitoring for the groundcheck engine: monotonic counters, a
//! bounded window of recent report summaries, and threshold alerts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use groundcheck_monitor::ProductionMonitor;
//!
//! let monitor = Arc::new(ProductionMonitor::new(100));
//! monitor.ingest(&report)?;
//! for alert in monitor.evaluate(&thresholds) { /* page someone */ }
//! ```

pub mod monitor;

pub use monitor::{evaluate_metrics, ProductionMonitor};
