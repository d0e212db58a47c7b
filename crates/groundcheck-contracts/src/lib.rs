//! # groundcheck-contracts
//!
//! Shared types, configuration schema, and error contracts for the
//! groundcheck validation engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, their derivations, and error types.

pub mod config;
pub mod error;
pub mod finding;
pub mod monitor;
pub mod tool;
pub mod trace;
