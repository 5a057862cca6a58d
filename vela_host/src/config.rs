//! Host configuration.
//!
//! One TOML file describes the host: the shared section, the controller
//! parameters handed over at configure time, and the simulated hardware
//! (which command slots exist, how fast the loop runs, demo traffic rate).

use serde::Deserialize;

use vela_common::config::{ConfigError, SharedConfig};
use vela_common::prelude::DEFAULT_CYCLE_TIME_US;
use vela_twist_controller::controller::ControllerParams;

/// Built-in configuration used when no config file is present.
pub const DEFAULT_CONFIG: &str = r#"
[shared]
log_level = "info"
service_name = "vela-host-sim"

[controller]
joint = "tool0"
interface_names = [
    "linear_x",
    "linear_y",
    "linear_z",
    "angular_x",
    "angular_y",
    "angular_z",
    "gripper_velocity",
]

[host]
cycle_time_us = 10000
command_slots = [
    "tool0/linear_x",
    "tool0/linear_y",
    "tool0/linear_z",
    "tool0/angular_x",
    "tool0/angular_y",
    "tool0/angular_z",
    "tool0/gripper_velocity",
]
"#;

/// Full host configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Shared section (logging, service identity).
    pub shared: SharedConfig,
    /// Parameters handed to the controller at configure time.
    pub controller: ControllerParams,
    /// Host loop and simulated hardware.
    pub host: HostSection,
}

/// Host loop and simulated hardware description.
#[derive(Debug, Clone, Deserialize)]
pub struct HostSection {
    /// Control period [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Fully qualified command slots the simulated hardware exposes.
    pub command_slots: Vec<String>,

    /// Emit a status log line every N cycles.
    #[serde(default = "default_status_interval")]
    pub status_interval_cycles: u64,

    /// Demo command generator rate [Hz]. 0 disables the generator.
    #[serde(default = "default_demo_rate")]
    pub demo_rate_hz: f64,
}

fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

fn default_status_interval() -> u64 {
    100
}

fn default_demo_rate() -> f64 {
    50.0
}

impl HostConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.host.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "cycle_time_us must be > 0".to_string(),
            ));
        }
        if self.host.status_interval_cycles == 0 {
            return Err(ConfigError::ValidationError(
                "status_interval_cycles must be > 0".to_string(),
            ));
        }
        if self.host.command_slots.is_empty() {
            return Err(ConfigError::ValidationError(
                "command_slots cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
