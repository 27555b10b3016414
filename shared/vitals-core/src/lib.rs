//! Vitals Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Patient reading and alert value types
//! - Error handling utilities
//! - Configuration management
//! - Standard service trait and runtime bootstrap

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use domain::*;
pub use error::{Result, ValidationError, VitalsError};
pub use service::{HealthStatus, MicroserviceRuntime, VitalsService};
