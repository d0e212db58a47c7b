//! # groundcheck-trace
//!
//! Thread-safe recording of the tool calls behind one agent answer, with a
//! tamper-evident SHA-256 sealed export for audit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use groundcheck_trace::{TraceRecorder, verify_sealed};
//!
//! let recorder = TraceRecorder::new(ResponseId::new());
//! let id = recorder.record("fetch_price", params, payload, issued_at)?;
//! recorder.finalize(id, completed_at)?;
//!
//! let trace = recorder.get_trace();
//! let sealed = recorder.seal()?;
//! assert!(verify_sealed(&sealed));
//! ```

pub mod chain;
pub mod recorder;
pub mod sealed;

pub use chain::{hash_record, verify_chain, verify_sealed};
pub use recorder::TraceRecorder;
pub use sealed::{SealedRecord, SealedTrace};

// ── Tests ─────────────────────────────────────────────────────────────────────
