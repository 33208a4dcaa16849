//! Execution context handed to every handler invocation.
//!
//! Handlers run synchronously inside the dispatch loop and borrow the
//! engine's state through a [`Context`]: the outbound daemon client (absent
//! until the `init` handshake completes) and the bound option values.
//! The client accessor fails with a typed error before init; handlers
//! never observe a half-constructed connection.

use serde_json::Value;

use lucerna_rpc::DaemonRpc;

use crate::error::PluginError;
use crate::options::PluginOption;

/// Handler for a plain RPC method or a hook: receives the request params
/// and produces the value wrapped verbatim into the `result` member of the
/// response.
pub type MethodHandler = Box<dyn Fn(&Context<'_>, &Value) -> Result<Value, PluginError>>;

/// Handler for a daemon notification: fire-and-forget, any outcome beyond
/// the handler's own side effects is discarded.
pub type NotificationHandler = Box<dyn Fn(&Context<'_>, &Value)>;

/// Borrowed view of the engine state exposed to handlers.
///
/// # Example
///
/// ```
/// use lucerna_plugin::{Context, PluginError};
/// use serde_json::{Value, json};
///
/// fn peers(ctx: &Context<'_>, _params: &Value) -> Result<Value, PluginError> {
///     let rpc = ctx.rpc()?;
///     rpc.list_peers(None, None).map_err(PluginError::from)
/// }
/// ```
pub struct Context<'a> {
    rpc: Option<&'a DaemonRpc>,
    options: &'a [PluginOption],
}

impl<'a> Context<'a> {
    /// Creates a context over the engine's client and option storage.
    pub(crate) const fn new(rpc: Option<&'a DaemonRpc>, options: &'a [PluginOption]) -> Self {
        Self { rpc, options }
    }

    /// Returns the outbound daemon client.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotInitialised`] when invoked before the
    /// daemon's `init` request has been processed.
    pub fn rpc(&self) -> Result<&'a DaemonRpc, PluginError> {
        self.rpc.ok_or(PluginError::NotInitialised)
    }

    /// Returns the daemon-supplied value of the named option.
    ///
    /// Yields `None` before init, for unknown names, and for options the
    /// daemon sent no value for.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&'a Value> {
        self.options
            .iter()
            .find(|option| option.name() == name)
            .and_then(PluginOption::value)
    }
}
