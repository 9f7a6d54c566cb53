//! Configuration for the monitoring pipeline.
//!
//! This module provides:
//! - Monitor configuration (networks, timeouts, admission thresholds)
//! - Per-network scanner settings (BNB, Sui)
//! - Environment overrides with `${VAR}` expansion

mod env;
mod monitor;

pub use env::expand_env;
pub use monitor::{AdmissionConfig, BnbConfig, MonitorConfig, SuiConfig};
