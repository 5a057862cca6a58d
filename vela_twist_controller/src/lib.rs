//! # VELA Twist Relay Controller
//!
//! Relays 6-DOF twist velocity commands plus a scalar gripper velocity onto a
//! fixed set of named hardware command slots, with a staleness timeout as the
//! safety interlock.
//!
//! ## Architecture
//!
//! - Inbound commands arrive on a non-real-time transport context and land in
//!   single-slot [`buffer::CommandBuffer`]s (latest wins, torn-read-free).
//! - The host invokes [`controller::TwistRelayController::update`] once per
//!   control period; the update cycle snapshots the buffers, applies the
//!   staleness interlock and writes the seven command slots.
//!
//! ## Zero-Allocation RT Path
//!
//! The update cycle performs no heap allocation, no blocking I/O and a fixed
//! number of atomic slot writes; error logging on the cycle path is throttled.

pub mod binding;
pub mod buffer;
pub mod controller;
pub mod messages;
pub mod plugin;
pub mod stats;
pub mod throttle;
pub mod transport;

pub use controller::{TwistRelayController, EXPECTED_SLOT_COUNT, STALE_TIMEOUT};
pub use plugin::{ConfigureContext, Controller, ControllerRegistry, TWIST_RELAY_TYPE_ID};
