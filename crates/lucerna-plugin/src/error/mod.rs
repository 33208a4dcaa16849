//! Domain errors raised by the plugin engine.
//!
//! Registration failures, init-time configuration faults and dispatch-loop
//! I/O all surface through [`PluginError`]. Handler callbacks return the
//! same type so that daemon RPC failures propagate with `?`.

use std::sync::Arc;

use thiserror::Error;

use lucerna_rpc::RpcError;

/// Errors arising from building or running a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A method with the same name is already registered.
    #[error("method '{name}' is already registered")]
    DuplicateMethod {
        /// Name of the colliding method.
        name: String,
    },

    /// An option with the same name is already declared.
    #[error("option '{name}' is already declared")]
    DuplicateOption {
        /// Name of the colliding option.
        name: String,
    },

    /// The name is reserved for the engine's own handshake methods.
    #[error("'{name}' is reserved by the plugin protocol")]
    ReservedName {
        /// The reserved name that was used.
        name: String,
    },

    /// A method was registered with an empty name.
    #[error("method name must not be empty")]
    EmptyMethodName,

    /// The daemon's init request did not satisfy the configuration
    /// contract.
    #[error("invalid init configuration: {message}")]
    Configuration {
        /// Description of the missing or malformed field.
        message: String,
    },

    /// A handler needed the daemon connection before init completed.
    #[error("the daemon connection is not available before init")]
    NotInitialised,

    /// A daemon RPC call made from a handler failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A handler failed for a reason of its own.
    #[error("{message}")]
    Handler {
        /// Description supplied by the handler.
        message: String,
    },

    /// An I/O error occurred on the daemon-facing stdio streams.
    #[error("I/O error on the daemon stream: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PluginError {
    /// Creates a handler-level failure with the given description.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }
}
