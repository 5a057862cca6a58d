//! Prelude module for common re-exports.
//!
//! Consumers can do `use vela_common::prelude::*;` and get the most
//! important types without listing individual paths.

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Lifecycle ──────────────────────────────────────────────────────
pub use crate::lifecycle::{
    CallbackOutcome, LifecycleEvent, LifecycleState, LifecycleStateMachine, TransitionResult,
    UpdateOutcome,
};

// ─── Command slots ──────────────────────────────────────────────────
pub use crate::slots::{CommandSlot, SlotError, SlotRegistry};

/// Default host cycle time in microseconds (10ms = 100Hz).
pub const DEFAULT_CYCLE_TIME_US: u32 = 10_000;

/// Default host cycle time as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(DEFAULT_CYCLE_TIME_US as u64);
