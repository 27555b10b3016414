//! Alert Engine service
//!
//! Loads readings from `DATA_DIR` (when set), then evaluates every known
//! patient on a fixed interval and logs the resulting alerts.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alert_engine::ingest;
use alert_engine::monitor::Monitor;
use alert_engine::{EngineConfig, EvaluationEngine, LogSink, RecordStore};
use tokio::sync::watch;
use tracing::{info, warn};
use vitals_core::{HealthStatus, MicroserviceRuntime, Result, VitalsError, VitalsService};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = vitals_telemetry::init("alert-engine")
        .map_err(|e| VitalsError::Config(e.to_string()))?;

    info!("Starting Alert Engine");

    let service = Arc::new(AlertEngineService::new()?);
    MicroserviceRuntime::run(service).await
}

pub struct AlertEngineService {
    config: EngineConfig,
    store: Arc<RecordStore>,
    monitor: Monitor,
    shutdown_tx: watch::Sender<bool>,
    start_time: std::time::Instant,
}

impl AlertEngineService {
    pub fn new() -> Result<Self> {
        let config = EngineConfig::from_env()?;
        let store = Arc::new(RecordStore::new());
        let engine = EvaluationEngine::new(store.clone(), Arc::new(LogSink))
            .with_lookback(config.lookback_ms());
        let monitor = Monitor::new(
            Arc::new(engine),
            Duration::from_secs(config.check_interval_secs),
        );
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            store,
            monitor,
            shutdown_tx,
            start_time: std::time::Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl VitalsService for AlertEngineService {
    fn service_id(&self) -> &'static str {
        "alert-engine"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Alert Engine");
        self.shutdown_tx.send_replace(true);
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            check_interval = self.config.check_interval_secs,
            lookback_hours = self.config.lookback_hours,
            "Starting Alert Engine"
        );

        if let Some(dir) = &self.config.data_dir {
            match ingest::read_directory(Path::new(dir), &self.store).await {
                Ok(summary) => info!(
                    patients = self.store.patients().len(),
                    accepted = summary.accepted,
                    rejected = summary.rejected,
                    "Initial data loaded"
                ),
                Err(e) => warn!(error = %e, "Initial data load failed, starting with an empty store"),
            }
        }

        self.monitor.run(self.shutdown_tx.subscribe()).await;
        Ok(())
    }
}
