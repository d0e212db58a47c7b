//! # groundcheck-config
//!
//! TOML configuration for the groundcheck engine.
//!
//! - `loader` parses and validates `EngineConfig` documents
//! - `ConfigHandle` holds the live snapshot and swaps it whole on reload
//!
//! ## Usage
//!
//! ```rust,ignore
//! use groundcheck_config::ConfigHandle;
//!
//! let handle = ConfigHandle::from_file(Path::new("config/default.toml"))?;
//! let config = handle.current();
//! // later, on SIGHUP or an admin request:
//! handle.reload_from_file(Path::new("config/default.toml"))?;
//! ```

pub mod handle;
pub mod loader;

pub use handle::ConfigHandle;
pub use loader::{from_file, from_toml_str, to_toml_string, validate};
