//! Integration tests: full controller lifecycle and update-cycle behavior.
//!
//! Drives the relay controller the way a host does (configure against a
//! slot registry and a loopback transport, activate, publish commands, run
//! update cycles at controlled times) and observes the slot values from the
//! hardware side.

use std::time::{Duration, Instant};

use vela_common::lifecycle::{CallbackOutcome, UpdateOutcome};
use vela_common::slots::SlotRegistry;
use vela_twist_controller::controller::{ControllerParams, TwistRelayController};
use vela_twist_controller::messages::{GripperVelocityCommand, TwistCommand, Vector3};
use vela_twist_controller::plugin::{ConfigureContext, Controller};
use vela_twist_controller::transport::{LoopbackTransport, GRIPPER_CHANNEL, TWIST_CHANNEL};

const JOINT: &str = "tool0";
const PERIOD: Duration = Duration::from_millis(10);

const SUFFIXES: [&str; 7] = [
    "linear_x",
    "linear_y",
    "linear_z",
    "angular_x",
    "angular_y",
    "angular_z",
    "gripper_velocity",
];

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    registry: SlotRegistry,
    transport: LoopbackTransport,
    controller: TwistRelayController,
}

impl Harness {
    /// Build a registry exposing one slot per suffix, configure and activate.
    fn bring_up(suffixes: &[&str]) -> Self {
        let mut registry = SlotRegistry::new();
        for suffix in suffixes {
            registry.register(&format!("{JOINT}/{suffix}")).unwrap();
        }
        let transport = LoopbackTransport::new();

        let mut controller = TwistRelayController::new();
        assert_eq!(controller.on_init(), CallbackOutcome::Success);

        let ctx = ConfigureContext {
            params: ControllerParams {
                joint: JOINT.to_string(),
                interface_names: suffixes.iter().map(|s| s.to_string()).collect(),
            },
            slots: &registry,
            transport: &transport,
        };
        assert_eq!(controller.on_configure(&ctx), CallbackOutcome::Success);
        assert_eq!(controller.on_activate(), CallbackOutcome::Success);

        Self {
            registry,
            transport,
            controller,
        }
    }

    fn publish_twist(&self, stamp: Instant, linear: Vector3, angular: Vector3) {
        self.transport
            .publish_twist(TWIST_CHANNEL, TwistCommand::new(stamp, linear, angular));
    }

    fn publish_gripper(&self, value: f64) {
        self.transport
            .publish_gripper(GRIPPER_CHANNEL, GripperVelocityCommand::new(value));
    }

    fn slot_value(&self, suffix: &str) -> f64 {
        self.registry
            .get(&format!("{JOINT}/{suffix}"))
            .expect("slot registered")
            .value()
    }

    fn twist_slot_values(&self) -> [f64; 6] {
        [
            self.slot_value("linear_x"),
            self.slot_value("linear_y"),
            self.slot_value("linear_z"),
            self.slot_value("angular_x"),
            self.slot_value("angular_y"),
            self.slot_value("angular_z"),
        ]
    }

    /// Overwrite every slot from the hardware side, to detect cycle writes.
    fn paint_slots(&self, sentinel: f64) {
        for suffix in SUFFIXES {
            if let Some(slot) = self.registry.get(&format!("{JOINT}/{suffix}")) {
                slot.set(sentinel);
            }
        }
    }
}

// ── Update cycle ────────────────────────────────────────────────────

#[test]
fn fresh_twist_is_relayed_in_axis_order() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
    let outcome = h.controller.update(t0 + Duration::from_millis(100), PERIOD);

    assert_eq!(outcome, UpdateOutcome::Ok);
    assert_eq!(h.twist_slot_values(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn no_command_yet_leaves_all_slots_untouched() {
    let mut h = Harness::bring_up(&SUFFIXES);
    h.paint_slots(9.9);

    let outcome = h.controller.update(Instant::now(), PERIOD);

    assert_eq!(outcome, UpdateOutcome::Ok);
    assert_eq!(h.twist_slot_values(), [9.9; 6]);
    assert_eq!(h.slot_value("gripper_velocity"), 9.9);
}

#[test]
fn stale_twist_zeroes_twist_slots_only() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
    h.publish_gripper(0.5);

    // Fresh cycle first: twist relayed, gripper relayed.
    h.controller.update(t0 + Duration::from_millis(100), PERIOD);
    assert_eq!(h.slot_value("gripper_velocity"), 0.5);

    // Past the 0.4s threshold: twist zeroed, gripper slot untouched.
    let outcome = h.controller.update(t0 + Duration::from_millis(500), PERIOD);
    assert_eq!(outcome, UpdateOutcome::Ok);
    assert_eq!(h.twist_slot_values(), [0.0; 6]);
    assert_eq!(h.slot_value("gripper_velocity"), 0.5);
}

#[test]
fn age_exactly_at_threshold_is_still_fresh() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 1.0, 1.0), Vector3::ZERO);

    // elapsed == 0.4s is not *greater than* the threshold.
    let outcome = h.controller.update(t0 + Duration::from_millis(400), PERIOD);
    assert_eq!(outcome, UpdateOutcome::Ok);
    assert_eq!(h.twist_slot_values(), [1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn absent_gripper_defaults_to_zero_every_cycle() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    for i in 0..3u32 {
        let now = t0 + PERIOD * i;
        h.publish_twist(now, Vector3::new(0.1, 0.2, 0.3), Vector3::ZERO);

        // Paint the gripper slot from the hardware side; the cycle must
        // overwrite it with zero while twist slots carry the fresh command.
        h.paint_slots(7.7);
        h.controller.update(now, PERIOD);

        assert_eq!(h.twist_slot_values(), [0.1, 0.2, 0.3, 0.0, 0.0, 0.0]);
        assert_eq!(h.slot_value("gripper_velocity"), 0.0);
    }
}

#[test]
fn gripper_value_is_relayed_independently_of_twist_values() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::ZERO, Vector3::ZERO);
    h.publish_gripper(-0.25);
    h.controller.update(t0 + Duration::from_millis(50), PERIOD);

    assert_eq!(h.twist_slot_values(), [0.0; 6]);
    assert_eq!(h.slot_value("gripper_velocity"), -0.25);
}

// ── Slot-count integrity ────────────────────────────────────────────

#[test]
fn six_slots_error_on_every_cycle_with_no_writes() {
    let mut h = Harness::bring_up(&SUFFIXES[..6]);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 2.0, 3.0), Vector3::ZERO);
    h.paint_slots(9.9);

    // Every call errors, not just the first.
    for i in 0..3u32 {
        let outcome = h.controller.update(t0 + PERIOD * i, PERIOD);
        assert_eq!(outcome, UpdateOutcome::Error);
    }
    assert_eq!(h.twist_slot_values(), [9.9; 6]);
}

#[test]
fn eight_slots_error_on_every_cycle() {
    let suffixes: Vec<&str> = SUFFIXES.iter().copied().chain(["aux"]).collect();
    let mut h = Harness::bring_up(&suffixes);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 2.0, 3.0), Vector3::ZERO);
    h.paint_slots(9.9);

    for i in 0..3u32 {
        let outcome = h.controller.update(t0 + PERIOD * i, PERIOD);
        assert_eq!(outcome, UpdateOutcome::Error);
    }
    assert_eq!(h.twist_slot_values(), [9.9; 6]);
    assert_eq!(h.slot_value("gripper_velocity"), 9.9);
}

#[test]
fn slot_mismatch_is_not_reported_while_no_command_arrived() {
    // The "no command yet" path short-circuits before the integrity check.
    let mut h = Harness::bring_up(&SUFFIXES[..6]);
    let outcome = h.controller.update(Instant::now(), PERIOD);
    assert_eq!(outcome, UpdateOutcome::Ok);
}

// ── Lifecycle scenarios ─────────────────────────────────────────────

#[test]
fn activate_relay_then_timeout_scenario() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 2.0, 3.0), Vector3::ZERO);

    h.controller.update(t0 + Duration::from_millis(100), PERIOD);
    assert_eq!(h.twist_slot_values(), [1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
    assert_eq!(h.slot_value("gripper_velocity"), 0.0);

    // No new command; 0.5s after the stamp the interlock zeroes the twist.
    h.controller.update(t0 + Duration::from_millis(500), PERIOD);
    assert_eq!(h.twist_slot_values(), [0.0; 6]);
    assert_eq!(h.slot_value("gripper_velocity"), 0.0);
}

#[test]
fn reactivation_discards_buffered_command() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 2.0, 3.0), Vector3::ZERO);
    h.controller.update(t0 + Duration::from_millis(10), PERIOD);
    assert_eq!(h.twist_slot_values(), [1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);

    assert_eq!(h.controller.on_deactivate(), CallbackOutcome::Success);
    assert_eq!(h.controller.on_activate(), CallbackOutcome::Success);

    // Buffered command was dropped on the transition: the next cycle treats
    // the twist as absent and writes nothing.
    h.paint_slots(9.9);
    let outcome = h.controller.update(t0 + Duration::from_millis(20), PERIOD);
    assert_eq!(outcome, UpdateOutcome::Ok);
    assert_eq!(h.twist_slot_values(), [9.9; 6]);
    assert_eq!(h.slot_value("gripper_velocity"), 9.9);
}

#[test]
fn command_received_while_inactive_is_not_replayed() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.controller.on_deactivate();
    // Arrival handlers stay subscribed while inactive; the buffer fills.
    h.publish_twist(t0, Vector3::new(5.0, 5.0, 5.0), Vector3::ZERO);

    // Activation clears the buffer, so the stale-while-inactive command is
    // not acted upon.
    h.controller.on_activate();
    h.paint_slots(9.9);
    h.controller.update(t0 + Duration::from_millis(10), PERIOD);
    assert_eq!(h.twist_slot_values(), [9.9; 6]);
}

#[test]
fn latest_command_wins_between_cycles() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    h.publish_twist(t0, Vector3::new(1.0, 1.0, 1.0), Vector3::ZERO);
    h.publish_twist(t0, Vector3::new(2.0, 2.0, 2.0), Vector3::ZERO);
    h.publish_twist(t0, Vector3::new(3.0, 3.0, 3.0), Vector3::ZERO);

    h.controller.update(t0 + Duration::from_millis(10), PERIOD);
    assert_eq!(h.twist_slot_values(), [3.0, 3.0, 3.0, 0.0, 0.0, 0.0]);
}

// ── Statistics ──────────────────────────────────────────────────────

#[test]
fn stats_classify_cycles() {
    let mut h = Harness::bring_up(&SUFFIXES);
    let t0 = Instant::now();

    // Held (no command), relayed, stale.
    h.controller.update(t0, PERIOD);
    h.publish_twist(t0, Vector3::new(1.0, 0.0, 0.0), Vector3::ZERO);
    h.controller.update(t0 + Duration::from_millis(10), PERIOD);
    h.controller.update(t0 + Duration::from_millis(500), PERIOD);

    let stats = h.controller.stats();
    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.held, 1);
    assert_eq!(stats.relayed, 1);
    assert_eq!(stats.stale_zeroed, 1);
    assert_eq!(stats.slot_errors, 0);
}
