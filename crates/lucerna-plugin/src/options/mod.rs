//! Startup options a plugin declares to the daemon.
//!
//! Options are advertised in the manifest during the handshake; the daemon
//! parses them from its own command line and hands the values back in the
//! `init` request. The engine binds each supplied value to its descriptor
//! at that point; descriptors carry no value before init and the engine
//! performs no default substitution of its own (the daemon applies
//! declared defaults before sending init).

use serde::Serialize;
use serde_json::Value;

/// Value type of a startup option, as understood by the daemon.
///
/// # Example
///
/// ```
/// use lucerna_plugin::OptionKind;
///
/// assert_eq!(OptionKind::Flag.as_str(), "flag");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Free-form string value.
    String,
    /// Integer value.
    Int,
    /// Boolean value.
    Bool,
    /// Presence-only flag with no argument.
    Flag,
}

impl OptionKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Flag => "flag",
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A startup option declared by the plugin.
///
/// The descriptor is created at registration time; `value` is written at
/// most once, when the engine processes the daemon's `init` request, and
/// is read-only afterwards.
///
/// # Example
///
/// ```
/// use lucerna_plugin::{OptionKind, PluginOption};
///
/// let option = PluginOption::new("greeting", "hi", "Greeting used by hello", OptionKind::String);
/// assert_eq!(option.name(), "greeting");
/// assert!(option.value().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PluginOption {
    name: String,
    default_value: String,
    description: String,
    kind: OptionKind,
    value: Option<Value>,
}

impl PluginOption {
    /// Creates an option descriptor with no bound value.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        default_value: impl Into<String>,
        description: impl Into<String>,
        kind: OptionKind,
    ) -> Self {
        Self {
            name: name.into(),
            default_value: default_value.into(),
            description: description.into(),
            kind,
            value: None,
        }
    }

    /// Returns the option name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the default value advertised to the daemon.
    #[must_use]
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared value type.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Returns the daemon-supplied value, if init has bound one.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Binds the daemon-supplied value during init.
    pub(crate) fn bind(&mut self, value: Value) {
        self.value = Some(value);
    }
}

#[cfg(test)]
mod tests;
