//! Alert Engine
//!
//! Evaluates recent patient vital signs against a fixed set of clinical rules:
//! - Time-windowed, per-patient record store
//! - Blood pressure, oxygen saturation, heart rhythm, hypotensive hypoxemia
//!   and manual trigger rules
//! - Evaluation engine that forwards alerts to a pluggable sink
//! - Text ingestion and a periodic monitor loop

pub mod clock;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod monitor;
pub mod rules;
pub mod sink;
pub mod store;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{EngineMetrics, EvaluationEngine, EvaluationReport, EvaluationSummary, RuleFailure};
pub use rules::{default_rules, AlertRule, RuleError};
pub use sink::{AlertSink, CollectingSink, LogSink, SinkError};
pub use store::RecordStore;
pub use window::Window;
