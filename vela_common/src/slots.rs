//! Named writable command slots.
//!
//! The hardware abstraction surface the controllers write to: an ordered set
//! of named scalar destinations ("slots"), resolved by fully qualified name
//! at configure time. `set` is infallible and non-blocking (an atomic bit
//! store), so the real-time update path never waits on the hardware side.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Error type for slot registry operations.
#[derive(Debug, Clone, Error)]
pub enum SlotError {
    /// No slot registered under the requested name.
    #[error("command slot not found: {0}")]
    NotFound(String),

    /// A slot with this name already exists.
    #[error("command slot already registered: {0}")]
    Duplicate(String),
}

/// A named writable scalar command destination.
///
/// Cloning yields another handle to the same underlying cell, so the
/// hardware side (or a test) can observe what the controller wrote.
#[derive(Debug, Clone)]
pub struct CommandSlot {
    name: Arc<str>,
    // f64 stored as raw bits; plain load/store, no RMW on the RT path.
    cell: Arc<AtomicU64>,
}

impl CommandSlot {
    /// Create a new slot initialized to 0.0.
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            cell: Arc::new(AtomicU64::new(0.0_f64.to_bits())),
        }
    }

    /// Fully qualified slot name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a value. Infallible, non-blocking, wait-free.
    #[inline]
    pub fn set(&self, value: f64) {
        self.cell.store(value.to_bits(), Ordering::Release);
    }

    /// Read the last written value.
    #[inline]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.cell.load(Ordering::Acquire))
    }
}

/// Registry of command slots, keyed by fully qualified name.
///
/// Constructed at startup by the host from its hardware description,
/// populated via `register()`, then handed to controllers which claim an
/// ordered list of slots at configure time. No global state.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    slots: HashMap<String, CommandSlot>,
}

impl SlotRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Register a new slot under `name`.
    ///
    /// Returns a handle to the created slot so the hardware side can keep
    /// observing it.
    ///
    /// # Errors
    /// `SlotError::Duplicate` if the name is already taken.
    pub fn register(&mut self, name: &str) -> Result<CommandSlot, SlotError> {
        if self.slots.contains_key(name) {
            return Err(SlotError::Duplicate(name.to_string()));
        }
        let slot = CommandSlot::new(name);
        self.slots.insert(name.to_string(), slot.clone());
        Ok(slot)
    }

    /// Look up a single slot by name.
    pub fn get(&self, name: &str) -> Option<&CommandSlot> {
        self.slots.get(name)
    }

    /// Claim an ordered list of slots by fully qualified names.
    ///
    /// The returned handles preserve the order of `names`.
    ///
    /// # Errors
    /// `SlotError::NotFound` for the first name with no registered slot.
    pub fn claim(&self, names: &[String]) -> Result<Vec<CommandSlot>, SlotError> {
        names
            .iter()
            .map(|name| {
                self.slots
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SlotError::NotFound(name.clone()))
            })
            .collect()
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
