//! RPC method descriptors.
//!
//! An [`RpcMethod`] pairs the metadata advertised in the manifest (name,
//! usage, descriptions) with the handler the dispatch loop invokes when
//! the daemon forwards a call. Handlers are ordinary boxed closures stored
//! by value; there is no trait to implement.

use serde_json::Value;

use crate::context::{Context, MethodHandler};
use crate::error::PluginError;

/// A callable method the plugin adds to the daemon's RPC surface.
///
/// # Example
///
/// ```
/// use lucerna_plugin::RpcMethod;
/// use serde_json::json;
///
/// let bye = RpcMethod::new("bye", |_ctx, _params| Ok(json!("Bye bye world!")))
///     .with_usage("[name]")
///     .with_description("Launch me so I can say bye");
/// assert_eq!(bye.name(), "bye");
/// ```
pub struct RpcMethod {
    name: String,
    usage: String,
    description: String,
    long_description: String,
    handler: MethodHandler,
}

impl RpcMethod {
    /// Creates a method with the given name and handler; usage and
    /// descriptions start empty.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        handler: impl Fn(&Context<'_>, &Value) -> Result<Value, PluginError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            usage: String::new(),
            description: String::new(),
            long_description: String::new(),
            handler: Box::new(handler),
        }
    }

    /// Sets the usage string shown by the daemon's `help`.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Sets the one-line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the long-form description.
    #[must_use]
    pub fn with_long_description(mut self, long_description: impl Into<String>) -> Self {
        self.long_description = long_description.into();
        self
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the usage string.
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Returns the one-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the long-form description.
    #[must_use]
    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    /// Invokes the handler with the request params.
    pub(crate) fn invoke(
        &self,
        ctx: &Context<'_>,
        params: &Value,
    ) -> Result<Value, PluginError> {
        (self.handler)(ctx, params)
    }
}

impl std::fmt::Debug for RpcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcMethod")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
