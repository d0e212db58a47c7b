//! Hot-reloadable configuration handle.
//!
//! `ConfigHandle` holds the current `EngineConfig` as an immutable
//! `Arc` snapshot. A reload builds and validates a complete new snapshot and
//! swaps it in; fields are never patched in place, so a reader holding an
//! older snapshot keeps a consistent view until it asks again.

use std::{
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::info;

use groundcheck_contracts::{
    config::EngineConfig,
    error::{GroundcheckError, GroundcheckResult},
};

use crate::loader;

struct Current {
    generation: u64,
    config: Arc<EngineConfig>,
}

/// Shared, swappable configuration snapshot. Clones share the same slot.
#[derive(Clone)]
pub struct ConfigHandle {
    slot: Arc<RwLock<Current>>,
}

impl ConfigHandle {
    /// Wrap an already-validated configuration.
    pub fn new(config: EngineConfig) -> GroundcheckResult<Self> {
        loader::validate(&config)?;
        Ok(Self {
            slot: Arc::new(RwLock::new(Current {
                generation: 0,
                config: Arc::new(config),
            })),
        })
    }

    /// Load the initial snapshot from a TOML file.
    pub fn from_file(path: &Path) -> GroundcheckResult<Self> {
        Self::new(loader::from_file(path)?)
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.slot.read().unwrap_or_else(PoisonError::into_inner).config)
    }

    /// Incremented on every successful replace; starts at 0.
    pub fn generation(&self) -> u64 {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).generation
    }

    /// The generation and snapshot read under one lock, so they always agree.
    pub fn snapshot(&self) -> (u64, Arc<EngineConfig>) {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        (slot.generation, Arc::clone(&slot.config))
    }

    /// Validate `config` and swap it in as the whole new snapshot.
    ///
    /// On error the current snapshot is left untouched.
    pub fn replace(&self, config: EngineConfig) -> GroundcheckResult<Arc<EngineConfig>> {
        loader::validate(&config)?;
        let config = Arc::new(config);

        let mut slot = self.slot.write().map_err(|e| GroundcheckError::ConfigError {
            reason: format!("configuration slot lock poisoned: {e}"),
        })?;
        slot.generation += 1;
        slot.config = Arc::clone(&config);

        info!(generation = slot.generation, "configuration replaced");
        Ok(config)
    }

    /// Re-read `path` and replace the snapshot with its contents.
    pub fn reload_from_file(&self, path: &Path) -> GroundcheckResult<Arc<EngineConfig>> {
        let config = loader::from_file(path)?;
        info!(path = %path.display(), "configuration reloaded from file");
        self.replace(config)
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Current {
                generation: 0,
                config: Arc::new(EngineConfig::default()),
            })),
        }
    }
}
