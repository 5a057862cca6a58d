//! Host-driven controller lifecycle.
//!
//! Controller components do not own their lifecycle; the host walks them
//! through Unconfigured → Inactive → Active (re-entrant) → Finalized and
//! invokes the matching callback at every edge. The state machine here
//! enforces the legal transition table; the callback outcomes decide whether
//! an attempted edge is committed or rolled back.

/// Outcome of a lifecycle callback (`on_init`, `on_configure`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Callback completed, transition may be committed.
    Success,
    /// Callback declined the transition (retryable).
    Failure,
    /// Callback hit an unrecoverable error.
    Error,
}

/// Outcome of one periodic update cycle.
///
/// A cycle error is not fatal: the host keeps calling `update` and the
/// component re-evaluates its integrity checks every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Cycle completed (including the designed fail-safe paths).
    Ok,
    /// Cycle-level integrity error; no outputs were written this cycle.
    Error,
}

/// Lifecycle states a hosted controller moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Constructed, parameters declared, nothing bound yet.
    #[default]
    Unconfigured,
    /// Configured: interface binding and subscriptions established.
    Inactive,
    /// Periodic updates running; command buffers live.
    Active,
    /// Torn down; no further transitions.
    Finalized,
}

/// Events the host can apply to the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Bind interfaces and subscriptions (Unconfigured → Inactive).
    Configure,
    /// Start periodic updates (Inactive → Active).
    Activate,
    /// Stop periodic updates (Active → Inactive).
    Deactivate,
    /// Tear down (Unconfigured/Inactive → Finalized).
    Finalize,
}

/// Result of a lifecycle transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded — new state.
    Ok(LifecycleState),
    /// Transition rejected — reason.
    Rejected(&'static str),
}

/// Lifecycle manager holding the current state.
#[derive(Debug, Clone)]
pub struct LifecycleStateMachine {
    state: LifecycleState,
}

impl LifecycleStateMachine {
    /// Create a new lifecycle in the Unconfigured state.
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Unconfigured,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Attempt a transition given an event.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        use LifecycleEvent::*;
        use LifecycleState::*;

        let next = match (self.state, event) {
            (Unconfigured, Configure) => Inactive,
            (Inactive, Activate) => Active,
            (Active, Deactivate) => Inactive,
            // Re-activation after deactivate is a plain Inactive → Active edge.
            (Unconfigured, Finalize) => Finalized,
            (Inactive, Finalize) => Finalized,
            _ => {
                return TransitionResult::Rejected(invalid_transition_reason(self.state, event));
            }
        };

        self.state = next;
        TransitionResult::Ok(next)
    }

    /// Check if periodic updates should be driven.
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, LifecycleState::Active)
    }
}

impl Default for LifecycleStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_transition_reason(state: LifecycleState, event: LifecycleEvent) -> &'static str {
    use LifecycleEvent::*;
    use LifecycleState::*;
    match (state, event) {
        (Finalized, _) => "Finalized: no further transitions",
        (Active, Finalize) => "Active: deactivate before finalize",
        (Unconfigured, _) => "Unconfigured: only Configure or Finalize allowed",
        (Inactive, Configure) => "Inactive: already configured",
        (_, _) => "invalid event for current state",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
