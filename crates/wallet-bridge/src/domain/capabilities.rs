//! Capability registry - the closed set of operations that may cross the
//! trust boundary.
//!
//! Capability kinds:
//! - Query: read-only disclosure (accounts, permission checks)
//! - Permission: asks the user to grant access
//! - Signing: asks the user to approve a signature or submission
//!
//! Unknown names are rejected here, before any envelope is built.

use crate::domain::error::BridgeError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

/// Built-in capability names.
pub mod names {
    pub const GET_ACCOUNTS: &str = "get-accounts";
    pub const HAS_PERMISSIONS: &str = "has-permissions";
    pub const REQUEST_PERMISSIONS: &str = "request-permissions";
    pub const SIGN_TRANSACTION: &str = "sign-transaction";
    pub const SIGN_AND_EXECUTE_TRANSACTION: &str = "sign-and-execute-transaction";
    pub const EXECUTE_MOVE_CALL: &str = "execute-move-call";
    pub const EXECUTE_SERIALIZED_MOVE_CALL: &str = "execute-serialized-move-call";
}

/// User approval can take a while; queries should not.
const APPROVAL_TIMEOUT: Duration = Duration::from_secs(300);

/// Coarse JSON shape contract for capability inputs and outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Any,
    Null,
    Bool,
    Number,
    String,
    Array,
    /// Array whose elements are all strings
    StringArray,
    Object,
}

impl Shape {
    /// Check whether a value satisfies this contract.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Shape::Any => true,
            Shape::Null => value.is_null(),
            Shape::Bool => value.is_boolean(),
            Shape::Number => value.is_number(),
            Shape::String => value.is_string(),
            Shape::Array => value.is_array(),
            Shape::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Shape::Object => value.is_object(),
        }
    }

    /// Name of the shape a value actually has.
    ///
    /// Used in error messages instead of the value itself.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Any => "any",
            Shape::Null => "null",
            Shape::Bool => "bool",
            Shape::Number => "number",
            Shape::String => "string",
            Shape::Array => "array",
            Shape::StringArray => "array of strings",
            Shape::Object => "object",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Read-only, no user interaction expected
    Query,
    /// Grants the page access to account data
    Permission,
    /// Produces a signature or submits a transaction
    Signing,
}

impl CapabilityKind {
    /// Check if the signing context will prompt the user
    pub fn requires_approval(&self) -> bool {
        matches!(self, CapabilityKind::Permission | CapabilityKind::Signing)
    }
}

/// Static description of one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    /// Wire name (e.g., "sign-transaction")
    pub name: &'static str,
    /// Kind
    pub kind: CapabilityKind,
    /// Contract for the request payload
    pub input: Shape,
    /// Contract for a successful result
    pub output: Shape,
    /// Per-capability wait bound; `None` uses the bridge default
    pub timeout: Option<Duration>,
    /// Brief description
    pub description: &'static str,
}

impl CapabilityDescriptor {
    /// Create a query capability that uses the default timeout.
    pub const fn query(
        name: &'static str,
        input: Shape,
        output: Shape,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: CapabilityKind::Query,
            input,
            output,
            timeout: None,
            description,
        }
    }

    /// Create a capability that waits on user approval.
    pub const fn approval(
        name: &'static str,
        kind: CapabilityKind,
        input: Shape,
        output: Shape,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            input,
            output,
            timeout: Some(APPROVAL_TIMEOUT),
            description,
        }
    }

    /// Override the wait bound.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("capability '{0}' is already registered")]
    Duplicate(&'static str),
    #[error("capability name must not be empty")]
    EmptyName,
}

/// Table of capabilities a client may invoke.
///
/// Populated at startup, then shared behind an `Arc` and never mutated.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<&'static str, CapabilityDescriptor>,
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in wallet capabilities
    pub fn standard() -> Self {
        let descriptors = [
            CapabilityDescriptor::query(
                names::GET_ACCOUNTS,
                Shape::Object,
                Shape::StringArray,
                "Returns the addresses the page may see",
            ),
            CapabilityDescriptor::query(
                names::HAS_PERMISSIONS,
                Shape::Object,
                Shape::Bool,
                "Checks whether the page holds the given permissions",
            ),
            CapabilityDescriptor::approval(
                names::REQUEST_PERMISSIONS,
                CapabilityKind::Permission,
                Shape::Object,
                Shape::Bool,
                "Asks the user to grant permissions to the page",
            ),
            CapabilityDescriptor::approval(
                names::SIGN_TRANSACTION,
                CapabilityKind::Signing,
                Shape::Object,
                Shape::Object,
                "Signs a transaction without submitting it",
            ),
            CapabilityDescriptor::approval(
                names::SIGN_AND_EXECUTE_TRANSACTION,
                CapabilityKind::Signing,
                Shape::Object,
                Shape::Object,
                "Signs a transaction and submits it",
            ),
            CapabilityDescriptor::approval(
                names::EXECUTE_MOVE_CALL,
                CapabilityKind::Signing,
                Shape::Object,
                Shape::Object,
                "Builds, signs and submits a move call",
            ),
            CapabilityDescriptor::approval(
                names::EXECUTE_SERIALIZED_MOVE_CALL,
                CapabilityKind::Signing,
                Shape::Object,
                Shape::Object,
                "Signs and submits pre-serialized transaction bytes",
            ),
        ];

        Self {
            entries: descriptors.into_iter().map(|d| (d.name, d)).collect(),
        }
    }

    /// Register a capability. Names are unique.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> Result<(), RegistryError> {
        if descriptor.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.entries.contains_key(descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name));
        }
        self.entries.insert(descriptor.name, descriptor);
        Ok(())
    }

    /// Check if a capability is registered
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look up a capability
    pub fn describe(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.entries.get(name)
    }

    /// Look up a capability, failing with a capability error when unknown.
    pub fn require(&self, name: &str) -> Result<&CapabilityDescriptor, BridgeError> {
        self.describe(name)
            .ok_or_else(|| BridgeError::CapabilityNotSupported(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide built-in registry
pub static STANDARD_CAPABILITIES: LazyLock<CapabilityRegistry> =
    LazyLock::new(CapabilityRegistry::standard);

/// Check if a capability is part of the built-in set
pub fn is_capability_supported(name: &str) -> bool {
    STANDARD_CAPABILITIES.has(name)
}

/// Get a built-in capability descriptor
pub fn get_capability(name: &str) -> Option<&'static CapabilityDescriptor> {
    STANDARD_CAPABILITIES.describe(name)
}
