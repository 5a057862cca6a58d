//! Command transport surface.
//!
//! The controller consumes a transport that can register two independent
//! subscriptions: twist commands on the [`TWIST_CHANNEL`] and gripper
//! velocities on the [`GRIPPER_CHANNEL`]. Each delivery invokes the
//! registered handler on the transport's own (non-real-time) context; the
//! handlers installed by the controller perform exactly one command-buffer
//! write and nothing else.
//!
//! [`LoopbackTransport`] is the in-process reference implementation used by
//! the simulation host and the integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::messages::{GripperVelocityCommand, TwistCommand};

/// Channel carrying [`TwistCommand`] messages.
pub const TWIST_CHANNEL: &str = "commands";

/// Channel carrying [`GripperVelocityCommand`] messages.
pub const GRIPPER_CHANNEL: &str = "gripper_vel";

/// Handler invoked per delivered twist command.
pub type TwistHandler = Box<dyn Fn(TwistCommand) + Send + Sync>;

/// Handler invoked per delivered gripper velocity command.
pub type GripperHandler = Box<dyn Fn(GripperVelocityCommand) + Send + Sync>;

/// Message transport the controller subscribes through at configure time.
pub trait CommandTransport {
    /// Subscribe to twist commands on `channel`.
    fn subscribe_twist(&self, channel: &str, handler: TwistHandler);

    /// Subscribe to gripper velocity commands on `channel`.
    fn subscribe_gripper(&self, channel: &str, handler: GripperHandler);
}

/// In-process pub/sub bus.
///
/// Publishing delivers synchronously on the publisher's thread, which plays
/// the role of the non-real-time arrival context.
#[derive(Default)]
pub struct LoopbackTransport {
    twist_subs: Mutex<HashMap<String, Vec<TwistHandler>>>,
    gripper_subs: Mutex<HashMap<String, Vec<GripperHandler>>>,
}

impl LoopbackTransport {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a twist command to every subscriber of `channel`.
    pub fn publish_twist(&self, channel: &str, msg: TwistCommand) {
        let subs = self.twist_subs.lock().expect("transport lock poisoned");
        if let Some(handlers) = subs.get(channel) {
            for handler in handlers {
                handler(msg);
            }
        }
    }

    /// Deliver a gripper velocity command to every subscriber of `channel`.
    pub fn publish_gripper(&self, channel: &str, msg: GripperVelocityCommand) {
        let subs = self.gripper_subs.lock().expect("transport lock poisoned");
        if let Some(handlers) = subs.get(channel) {
            for handler in handlers {
                handler(msg);
            }
        }
    }
}

impl CommandTransport for LoopbackTransport {
    fn subscribe_twist(&self, channel: &str, handler: TwistHandler) {
        self.twist_subs
            .lock()
            .expect("transport lock poisoned")
            .entry(channel.to_string())
            .or_default()
            .push(handler);
    }

    fn subscribe_gripper(&self, channel: &str, handler: GripperHandler) {
        self.gripper_subs
            .lock()
            .expect("transport lock poisoned")
            .entry(channel.to_string())
            .or_default()
            .push(handler);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
