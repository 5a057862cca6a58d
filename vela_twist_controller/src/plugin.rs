//! Controller trait and registry.
//!
//! Hosts instantiate controllers by a fixed type identifier from a
//! constructor-injected registry, then drive them through the lifecycle
//! callbacks and the periodic update. No global state — testable in
//! isolation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;
use vela_common::lifecycle::{CallbackOutcome, UpdateOutcome};
use vela_common::slots::SlotRegistry;

use crate::controller::{ControllerParams, TwistRelayController};
use crate::transport::CommandTransport;

/// Type identifier the twist relay controller registers under.
pub const TWIST_RELAY_TYPE_ID: &str = "vela/twist_relay_controller";

/// Everything a controller needs at configure time.
pub struct ConfigureContext<'a> {
    /// Parameters loaded by the host (read once, at configure time).
    pub params: ControllerParams,
    /// Slot registry to claim command slots from.
    pub slots: &'a SlotRegistry,
    /// Transport to register inbound subscriptions on.
    pub transport: &'a dyn CommandTransport,
}

/// Interface between the host lifecycle and a hosted controller.
///
/// # Lifecycle
///
/// 1. `on_init()` - once after construction; declares parameter defaults.
/// 2. `on_configure(ctx)` - binds interfaces, claims slots, subscribes.
/// 3. `on_activate()` / `on_deactivate()` - Active boundary; re-entrant.
/// 4. `update(now, period)` - once per control period while Active.
///
/// # Timing
///
/// `update` runs inside the real-time period and must stay allocation-free
/// and non-blocking; the other callbacks run outside the RT loop.
pub trait Controller: Send {
    /// The fixed type identifier this controller is registered under.
    fn type_id(&self) -> &'static str;

    /// Declare parameter defaults.
    fn on_init(&mut self) -> CallbackOutcome;

    /// Bind interfaces and subscriptions.
    fn on_configure(&mut self, ctx: &ConfigureContext<'_>) -> CallbackOutcome;

    /// Enter the Active state.
    fn on_activate(&mut self) -> CallbackOutcome;

    /// Leave the Active state.
    fn on_deactivate(&mut self) -> CallbackOutcome;

    /// Execute one periodic update cycle.
    fn update(&mut self, now: Instant, period: Duration) -> UpdateOutcome;
}

/// Factory function type for creating controller instances.
pub type ControllerFactory = fn() -> Box<dyn Controller>;

/// Error type for registry lookups.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// No controller registered under the requested type identifier.
    #[error("controller type not found: {0}")]
    TypeNotFound(String),
}

/// Registry of available controller types.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<&'static str, ControllerFactory>,
}

impl ControllerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with the controllers this crate exports.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TWIST_RELAY_TYPE_ID, || {
            Box::new(TwistRelayController::new())
        });
        registry
    }

    /// Register a controller factory.
    ///
    /// # Panics
    /// Panics if a controller with the same type identifier is already
    /// registered.
    pub fn register(&mut self, type_id: &'static str, factory: ControllerFactory) {
        if self.factories.contains_key(type_id) {
            panic!("Controller '{type_id}' is already registered");
        }
        self.factories.insert(type_id, factory);
    }

    /// Create a controller instance by type identifier.
    ///
    /// # Errors
    /// Returns `RegistryError::TypeNotFound` for an unknown identifier.
    pub fn create(&self, type_id: &str) -> Result<Box<dyn Controller>, RegistryError> {
        let factory = self
            .factories
            .get(type_id)
            .ok_or_else(|| RegistryError::TypeNotFound(type_id.to_string()))?;
        Ok(factory())
    }

    /// List all registered type identifiers.
    pub fn list_types(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
