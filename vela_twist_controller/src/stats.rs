//! Per-cycle relay statistics.
//!
//! O(1), allocation-free counters updated from inside the update cycle and
//! read by the host for periodic diagnostics output.

use bitflags::bitflags;

bitflags! {
    /// What the last update cycle did.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CycleFlags: u8 {
        /// No twist command buffered; outputs held their previous values.
        const HELD              = 0x01;
        /// Twist command stale; twist outputs zeroed.
        const STALE_ZEROED      = 0x02;
        /// Fresh twist command relayed to the twist outputs.
        const RELAYED           = 0x04;
        /// No gripper command buffered; gripper output zeroed.
        const GRIPPER_DEFAULTED = 0x08;
        /// Claimed slot count did not match; nothing written.
        const SLOT_MISMATCH     = 0x10;
    }
}

impl Default for CycleFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Cumulative cycle counters. Updated every cycle with no allocation.
#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    /// Total update cycles executed.
    pub cycles: u64,
    /// Cycles that held previous outputs (no twist command yet).
    pub held: u64,
    /// Cycles that relayed a fresh twist command.
    pub relayed: u64,
    /// Cycles that zeroed the twist outputs due to staleness.
    pub stale_zeroed: u64,
    /// Cycles that failed the slot-count integrity check.
    pub slot_errors: u64,
    /// Flags describing the most recent cycle.
    pub last_flags: CycleFlags,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycles: 0,
            held: 0,
            relayed: 0,
            stale_zeroed: 0,
            slot_errors: 0,
            last_flags: CycleFlags::empty(),
        }
    }

    /// Record one cycle. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, flags: CycleFlags) {
        self.cycles += 1;
        if flags.contains(CycleFlags::HELD) {
            self.held += 1;
        }
        if flags.contains(CycleFlags::RELAYED) {
            self.relayed += 1;
        }
        if flags.contains(CycleFlags::STALE_ZEROED) {
            self.stale_zeroed += 1;
        }
        if flags.contains(CycleFlags::SLOT_MISMATCH) {
            self.slot_errors += 1;
        }
        self.last_flags = flags;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
