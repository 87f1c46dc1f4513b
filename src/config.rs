//! In-process configuration surface consumed by bootstrap.
//!
//! These are plain structs built in code (or from simple key/value maps);
//! there is no YAML/TOML schema loader here, matching the Non-goal on
//! configuration file formats while keeping the shape of the teacher's
//! `AppConfig`.

use std::time::Duration;

use crate::fees::FeeSchedule;
use crate::models::instrument::Instrument;
use crate::validation::Constraint;

/// One role's fee schedule and ordered constraint list.
#[derive(Debug, Clone)]
pub struct RoleConfig {
    pub role: String,
    pub fees: FeeSchedule,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone)]
pub struct InstrumentConfig {
    pub instruments: Vec<Instrument>,
}

/// Cadence parameters for the phase poller and queue operations.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeCadence {
    pub phase_check_interval: Duration,
    pub order_queue_timeout: Duration,
}

impl Default for ExchangeCadence {
    fn default() -> Self {
        Self {
            phase_check_interval: Duration::from_millis(500),
            order_queue_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    pub max_pending_requests: usize,
    pub default_timeout_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_pending_requests: 1_000,
            default_timeout_seconds: 5,
            cleanup_interval_seconds: 30,
        }
    }
}

/// Top-level configuration bundle handed to `bootstrap::build`.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub roles: Vec<RoleConfig>,
    pub instruments: InstrumentConfig,
    pub cadence: ExchangeCadence,
    pub coordinator: CoordinatorConfig,
}
