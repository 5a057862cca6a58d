//! The twist relay controller.
//!
//! Translates buffered twist / gripper velocity commands into seven named
//! command slot writes per cycle, with a staleness timeout as the safety
//! interlock. See [`TwistRelayController::update`] for the cycle contract.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use vela_common::lifecycle::{CallbackOutcome, UpdateOutcome};
use vela_common::slots::{CommandSlot, SlotError};

use crate::binding::{BindingError, InterfaceBinding};
use crate::buffer::CommandBuffer;
use crate::messages::{GripperVelocityCommand, TwistCommand};
use crate::plugin::{ConfigureContext, Controller, TWIST_RELAY_TYPE_ID};
use crate::stats::{CycleFlags, CycleStats};
use crate::throttle::Throttle;
use crate::transport::{GRIPPER_CHANNEL, TWIST_CHANNEL};

/// Slots the update cycle writes: 6 twist axes + 1 gripper.
pub const EXPECTED_SLOT_COUNT: usize = 7;

/// Maximum age of a twist command before the fail-safe zeroes the twist
/// outputs.
pub const STALE_TIMEOUT: Duration = Duration::from_millis(400);

/// Minimum spacing between slot-count error log emissions.
pub const ERROR_LOG_WINDOW: Duration = Duration::from_millis(1000);

/// Capacity of the claimed slot list (fixed, RT path never allocates).
pub const MAX_CLAIMED_SLOTS: usize = 16;

/// Controller parameters, read once at configure time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControllerParams {
    /// Base identifier the slot names are qualified with. Must be non-empty.
    #[serde(default)]
    pub joint: String,

    /// Ordered interface suffixes, one slot per entry.
    #[serde(default)]
    pub interface_names: Vec<String>,
}

/// Fatal configure-time errors.
#[derive(Debug, Error)]
enum ConfigureError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Slots(#[from] SlotError),

    #[error("claimed {claimed} slots, capacity is {capacity}")]
    TooManySlots { claimed: usize, capacity: usize },
}

/// Relays 6-DOF twist + gripper velocity commands onto command slots.
///
/// Output policy when input is missing is asymmetric: an absent twist command
/// holds the previous twist outputs, while an absent gripper command zeroes
/// the gripper output every cycle. A stale twist command zeroes the six twist
/// outputs and leaves the gripper output untouched for that cycle.
pub struct TwistRelayController {
    params: ControllerParams,
    /// Suffixes to bind. A specialized variant may pre-populate these before
    /// configure runs; otherwise they come from the parameters.
    interface_names: Vec<String>,
    binding: Option<InterfaceBinding>,
    slots: heapless::Vec<CommandSlot, MAX_CLAIMED_SLOTS>,
    twist_buffer: Arc<CommandBuffer<TwistCommand>>,
    gripper_buffer: Arc<CommandBuffer<GripperVelocityCommand>>,
    error_throttle: Throttle,
    stats: CycleStats,
}

impl TwistRelayController {
    /// Create an unconfigured controller.
    pub fn new() -> Self {
        Self {
            params: ControllerParams::default(),
            interface_names: Vec::new(),
            binding: None,
            slots: heapless::Vec::new(),
            twist_buffer: Arc::new(CommandBuffer::new()),
            gripper_buffer: Arc::new(CommandBuffer::new()),
            error_throttle: Throttle::new(ERROR_LOG_WINDOW),
            stats: CycleStats::new(),
        }
    }

    /// Pre-populate the interface suffixes before configure runs.
    ///
    /// Specialized variants use this to fix their slot layout; when set, the
    /// `interface_names` parameter is ignored at configure time.
    pub fn preset_interface_names(&mut self, names: Vec<String>) {
        self.interface_names = names;
    }

    /// The interface binding, once configured.
    pub fn binding(&self) -> Option<&InterfaceBinding> {
        self.binding.as_ref()
    }

    /// Cumulative cycle statistics.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    fn try_configure(&mut self, ctx: &ConfigureContext<'_>) -> Result<(), ConfigureError> {
        self.params = ctx.params.clone();

        // Specialized variants set the suffixes before configure; the
        // parameter is only consulted when nothing was preset.
        if self.interface_names.is_empty() {
            self.interface_names = self.params.interface_names.clone();
        }

        let binding = InterfaceBinding::new(&self.params.joint, &self.interface_names)?;

        let claimed = ctx.slots.claim(&binding.qualified_names())?;
        let claimed_total = claimed.len();
        self.slots.clear();
        for slot in claimed {
            self.slots
                .push(slot)
                .map_err(|_| ConfigureError::TooManySlots {
                    claimed: claimed_total,
                    capacity: MAX_CLAIMED_SLOTS,
                })?;
        }

        // Each subscription handler performs exactly one buffer write.
        let twist_buffer = Arc::clone(&self.twist_buffer);
        ctx.transport.subscribe_twist(
            TWIST_CHANNEL,
            Box::new(move |msg| twist_buffer.write(msg)),
        );
        let gripper_buffer = Arc::clone(&self.gripper_buffer);
        ctx.transport.subscribe_gripper(
            GRIPPER_CHANNEL,
            Box::new(move |msg| gripper_buffer.write(msg)),
        );

        self.binding = Some(binding);
        Ok(())
    }
}

impl Default for TwistRelayController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for TwistRelayController {
    fn type_id(&self) -> &'static str {
        TWIST_RELAY_TYPE_ID
    }

    fn on_init(&mut self) -> CallbackOutcome {
        // Parameter defaults: empty joint, empty suffix list. Both must be
        // filled in (or preset) before configure can succeed.
        self.params = ControllerParams::default();
        CallbackOutcome::Success
    }

    fn on_configure(&mut self, ctx: &ConfigureContext<'_>) -> CallbackOutcome {
        match self.try_configure(ctx) {
            Ok(()) => {
                info!(
                    joint = %self.params.joint,
                    interfaces = self.interface_names.len(),
                    "configure successful"
                );
                CallbackOutcome::Success
            }
            Err(e) => {
                error!("configure failed: {e}");
                CallbackOutcome::Error
            }
        }
    }

    fn on_activate(&mut self) -> CallbackOutcome {
        // Drop any command that arrived while inactive so the first cycle
        // after activation observes "no command yet".
        self.twist_buffer.clear();
        self.gripper_buffer.clear();
        CallbackOutcome::Success
    }

    fn on_deactivate(&mut self) -> CallbackOutcome {
        self.twist_buffer.clear();
        self.gripper_buffer.clear();
        CallbackOutcome::Success
    }

    /// One relay cycle.
    ///
    /// 1. Snapshot both buffers. No twist command → no writes, outputs hold.
    /// 2. Claimed slot count ≠ 7 → cycle error, throttled log, no writes.
    ///    Re-verified every cycle: a specialized variant may have claimed a
    ///    different slot list after construction.
    /// 3. Twist older than [`STALE_TIMEOUT`] → zero slots 0–5, gripper slot
    ///    untouched this cycle.
    /// 4. Fresh twist → linear x/y/z to slots 0–2, angular x/y/z to 3–5.
    /// 5. Gripper: no command ever → slot 6 = 0; else slot 6 = value.
    fn update(&mut self, now: Instant, _period: Duration) -> UpdateOutcome {
        let twist = self.twist_buffer.read();
        let gripper = self.gripper_buffer.read();

        // No command received yet.
        let Some(twist) = twist else {
            self.stats.record(CycleFlags::HELD);
            return UpdateOutcome::Ok;
        };

        if self.slots.len() != EXPECTED_SLOT_COUNT {
            if self.error_throttle.ready(now) {
                error!(
                    claimed = self.slots.len(),
                    expected = EXPECTED_SLOT_COUNT,
                    "claimed command slots do not match the twist relay layout"
                );
            }
            self.stats.record(CycleFlags::SLOT_MISMATCH);
            return UpdateOutcome::Error;
        }

        if twist.age(now) > STALE_TIMEOUT {
            for slot in &self.slots[..6] {
                slot.set(0.0);
            }
            self.stats.record(CycleFlags::STALE_ZEROED);
            return UpdateOutcome::Ok;
        }

        self.slots[0].set(twist.linear.x);
        self.slots[1].set(twist.linear.y);
        self.slots[2].set(twist.linear.z);
        self.slots[3].set(twist.angular.x);
        self.slots[4].set(twist.angular.y);
        self.slots[5].set(twist.angular.z);

        let mut flags = CycleFlags::RELAYED;
        match gripper {
            Some(cmd) => self.slots[6].set(cmd.value),
            None => {
                self.slots[6].set(0.0);
                flags |= CycleFlags::GRIPPER_DEFAULTED;
            }
        }

        self.stats.record(flags);
        UpdateOutcome::Ok
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
