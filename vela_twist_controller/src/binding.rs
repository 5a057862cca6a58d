//! Command interface binding.
//!
//! Binds the configured base identifier (`joint`) and the ordered list of
//! interface suffixes to the fully qualified slot names the controller will
//! claim: `"{joint}/{suffix}"`, one per suffix, in input order. Computed once
//! at configure time and immutable afterwards.

use thiserror::Error;

/// Fatal configuration errors raised while building a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The `joint` parameter was empty.
    #[error("'joint' parameter was empty")]
    EmptyJoint,

    /// The `interface_names` parameter was empty.
    #[error("'interface_names' parameter was empty")]
    EmptyInterfaceNames,
}

/// Immutable binding of a joint base name to its interface suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceBinding {
    joint: String,
    interface_names: Vec<String>,
}

impl InterfaceBinding {
    /// Build a binding, validating that neither input is empty.
    pub fn new(joint: &str, interface_names: &[String]) -> Result<Self, BindingError> {
        if joint.is_empty() {
            return Err(BindingError::EmptyJoint);
        }
        if interface_names.is_empty() {
            return Err(BindingError::EmptyInterfaceNames);
        }
        Ok(Self {
            joint: joint.to_string(),
            interface_names: interface_names.to_vec(),
        })
    }

    /// The base identifier.
    pub fn joint(&self) -> &str {
        &self.joint
    }

    /// The configured suffixes, in input order.
    pub fn interface_names(&self) -> &[String] {
        &self.interface_names
    }

    /// Number of bound interfaces.
    pub fn len(&self) -> usize {
        self.interface_names.len()
    }

    /// Whether the binding holds no interfaces (never true after `new`).
    pub fn is_empty(&self) -> bool {
        self.interface_names.is_empty()
    }

    /// Fully qualified slot names, `"{joint}/{suffix}"`, in suffix order.
    pub fn qualified_names(&self) -> Vec<String> {
        self.interface_names
            .iter()
            .map(|suffix| format!("{}/{}", self.joint, suffix))
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
