//! Inbound command message types.
//!
//! Messages are plain `Copy` structs: they are constructed by the transport
//! layer, stamped on arrival (or by the sender), and handed to a command
//! buffer by value. Nothing here is serialized; wire formats belong to the
//! transport.

use std::time::{Duration, Instant};

/// A 3-component vector of velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// All-zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A stamped 6-DOF velocity command: 3 linear + 3 angular axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwistCommand {
    /// Monotonic arrival/creation stamp, compared against the cycle time.
    pub stamp: Instant,
    /// Linear velocity components [m/s].
    pub linear: Vector3,
    /// Angular velocity components [rad/s].
    pub angular: Vector3,
}

impl TwistCommand {
    /// Create a stamped twist command.
    pub const fn new(stamp: Instant, linear: Vector3, angular: Vector3) -> Self {
        Self {
            stamp,
            linear,
            angular,
        }
    }

    /// Age of this command relative to `now`.
    ///
    /// Saturates to zero if `stamp` lies in the future (a sender clock ahead
    /// of the cycle clock must not underflow).
    #[inline]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stamp)
    }
}

/// A scalar gripper velocity command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GripperVelocityCommand {
    /// Commanded gripper velocity [m/s].
    pub value: f64,
}

impl GripperVelocityCommand {
    /// Create a gripper velocity command.
    pub const fn new(value: f64) -> Self {
        Self { value }
    }
}
