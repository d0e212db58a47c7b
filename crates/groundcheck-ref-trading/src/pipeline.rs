//! The assembled validation pipeline.
//!
//! `ValidationPipeline` owns the live configuration, the production monitor
//! and an engine (orchestrator plus hallucination detector) built from the
//! current configuration snapshot. The engine is rebuilt lazily the first
//! time a request sees a new configuration generation, so a reload never
//! changes the rules under a request that is already running.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use tracing::info;

use groundcheck_config::ConfigHandle;
use groundcheck_contracts::{
    config::EngineConfig,
    error::GroundcheckResult,
    finding::ValidationReport,
    monitor::{Alert, RollingMetrics},
    trace::CallTrace,
};
use groundcheck_core::Orchestrator;
use groundcheck_detect::HallucinationDetector;
use groundcheck_monitor::ProductionMonitor;

/// The configuration profile shipped with the workspace.
pub const DEFAULT_PROFILE: &str = include_str!("../../../config/default.toml");

struct Engine {
    generation: u64,
    config: Arc<EngineConfig>,
    orchestrator: Arc<Orchestrator>,
}

impl Engine {
    fn build(generation: u64, config: Arc<EngineConfig>) -> GroundcheckResult<Self> {
        let detector = HallucinationDetector::from_config(&config)?;
        let orchestrator = Orchestrator::new(&config, Box::new(detector));
        Ok(Self {
            generation,
            config,
            orchestrator: Arc::new(orchestrator),
        })
    }
}

/// Configuration, engine and monitor wired together.
///
/// The monitor window is fixed when the pipeline is built; later reloads
/// change checks and thresholds but keep the accumulated metrics.
pub struct ValidationPipeline {
    config: ConfigHandle,
    monitor: Arc<ProductionMonitor>,
    engine: Mutex<Engine>,
}

impl ValidationPipeline {
    /// Build a pipeline over `config`.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the current snapshot's phrase list does not compile.
    pub fn new(config: ConfigHandle) -> GroundcheckResult<Self> {
        let (generation, snapshot) = config.snapshot();
        let monitor = Arc::new(ProductionMonitor::from_config(&snapshot.monitor));
        let engine = Engine::build(generation, snapshot)?;
        Ok(Self {
            config,
            monitor,
            engine: Mutex::new(engine),
        })
    }

    /// Build a pipeline from the shipped `config/default.toml` profile.
    pub fn from_default_config() -> GroundcheckResult<Self> {
        let config = groundcheck_config::from_toml_str(DEFAULT_PROFILE)?;
        Self::new(ConfigHandle::new(config)?)
    }

    /// Build a pipeline from an in-memory configuration.
    pub fn with_config(config: EngineConfig) -> GroundcheckResult<Self> {
        Self::new(ConfigHandle::new(config)?)
    }

    /// Validate one answer and fold the report into the monitor.
    ///
    /// # Errors
    ///
    /// - `ConfigError` if a reloaded configuration cannot be turned into an engine
    /// - `MonitorWriteFailed` if the monitor cannot ingest the report
    pub fn run(
        &self,
        trace: &CallTrace,
        answer: &str,
        reference_prices: &BTreeMap<String, f64>,
        reference_now: DateTime<Utc>,
    ) -> GroundcheckResult<ValidationReport> {
        let orchestrator = self.orchestrator()?;
        orchestrator.validate_into(trace, answer, reference_prices, reference_now, self.monitor.as_ref())
    }

    /// Validate without touching the monitor.
    pub fn validate_only(
        &self,
        trace: &CallTrace,
        answer: &str,
        reference_prices: &BTreeMap<String, f64>,
        reference_now: DateTime<Utc>,
    ) -> GroundcheckResult<ValidationReport> {
        Ok(self.orchestrator()?.validate(trace, answer, reference_prices, reference_now))
    }

    /// Alerts for the current rolling metrics under the current thresholds.
    pub fn alerts(&self) -> Vec<Alert> {
        self.monitor.evaluate(&self.config.current().thresholds)
    }

    pub fn metrics(&self) -> RollingMetrics {
        self.monitor.snapshot()
    }

    pub fn monitor(&self) -> Arc<ProductionMonitor> {
        Arc::clone(&self.monitor)
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Swap in a whole new configuration. The engine picks it up on the next run.
    pub fn replace_config(&self, config: EngineConfig) -> GroundcheckResult<()> {
        self.config.replace(config)?;
        Ok(())
    }

    /// The orchestrator for the current configuration generation.
    fn orchestrator(&self) -> GroundcheckResult<Arc<Orchestrator>> {
        let (generation, snapshot) = self.config.snapshot();
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        if engine.generation != generation {
            *engine = Engine::build(generation, snapshot)?;
            info!(
                generation,
                phrases = engine.config.hallucination.phrases.len(),
                ranges = engine.config.ranges.len(),
                "validation engine rebuilt"
            );
        }
        Ok(Arc::clone(&engine.orchestrator))
    }
}
