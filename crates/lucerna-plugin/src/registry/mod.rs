//! Registries for methods, options, subscriptions and hooks.
//!
//! The [`PluginRegistry`] is pure data plus lookup: it is populated through
//! the builder before the dispatch loop starts and never mutated afterwards
//! (option values excepted, which init binds in place). Methods and options
//! keep registration order, since the manifest advertises them in the order
//! they were declared; duplicate names are rejected. Subscriptions and
//! hooks are keyed by topic with last-write-wins override semantics, and
//! occupy namespaces of their own: a hook may share its topic with a
//! method without conflict.

use std::collections::BTreeMap;

use crate::context::{MethodHandler, NotificationHandler};
use crate::error::PluginError;
use crate::method::RpcMethod;
use crate::options::PluginOption;
use crate::protocol;

/// Holds everything the plugin declares to the daemon.
#[derive(Default)]
pub(crate) struct PluginRegistry {
    methods: Vec<RpcMethod>,
    options: Vec<PluginOption>,
    subscriptions: BTreeMap<String, NotificationHandler>,
    hooks: BTreeMap<String, MethodHandler>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers an RPC method.
    ///
    /// Rejects empty names, the reserved handshake names, and names that
    /// are already taken.
    pub(crate) fn register_method(&mut self, method: RpcMethod) -> Result<(), PluginError> {
        let name = method.name();
        if name.is_empty() {
            return Err(PluginError::EmptyMethodName);
        }
        if protocol::is_reserved(name) {
            return Err(PluginError::ReservedName {
                name: name.to_owned(),
            });
        }
        if self.methods.iter().any(|m| m.name() == name) {
            return Err(PluginError::DuplicateMethod {
                name: name.to_owned(),
            });
        }
        self.methods.push(method);
        Ok(())
    }

    /// Declares a startup option.
    ///
    /// Rejects names that are already declared.
    pub(crate) fn register_option(&mut self, option: PluginOption) -> Result<(), PluginError> {
        if self.options.iter().any(|o| o.name() == option.name()) {
            return Err(PluginError::DuplicateOption {
                name: option.name().to_owned(),
            });
        }
        self.options.push(option);
        Ok(())
    }

    /// Subscribes to a daemon notification topic.
    ///
    /// Re-subscribing to a topic replaces the previous handler.
    pub(crate) fn subscribe(&mut self, topic: impl Into<String>, handler: NotificationHandler) {
        self.subscriptions.insert(topic.into(), handler);
    }

    /// Subscribes to a daemon hook topic.
    ///
    /// Re-subscribing to a topic replaces the previous handler.
    pub(crate) fn hook(&mut self, topic: impl Into<String>, handler: MethodHandler) {
        self.hooks.insert(topic.into(), handler);
    }

    /// Looks up a registered method by name.
    pub(crate) fn method(&self, name: &str) -> Option<&RpcMethod> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// Looks up a notification handler by topic.
    pub(crate) fn subscription(&self, topic: &str) -> Option<&NotificationHandler> {
        self.subscriptions.get(topic)
    }

    /// Looks up a hook handler by topic.
    pub(crate) fn hook_handler(&self, topic: &str) -> Option<&MethodHandler> {
        self.hooks.get(topic)
    }

    /// Returns the registered methods in registration order.
    pub(crate) fn methods(&self) -> &[RpcMethod] {
        &self.methods
    }

    /// Returns the declared options in registration order.
    pub(crate) fn options(&self) -> &[PluginOption] {
        &self.options
    }

    /// Returns a mutable view of the declared options, for init binding.
    pub(crate) fn options_mut(&mut self) -> &mut [PluginOption] {
        &mut self.options
    }

    /// Returns the subscribed notification topics.
    pub(crate) fn subscription_topics(&self) -> impl Iterator<Item = &str> {
        self.subscriptions.keys().map(String::as_str)
    }

    /// Returns the subscribed hook topics.
    pub(crate) fn hook_topics(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("methods", &self.methods.iter().map(RpcMethod::name).collect::<Vec<_>>())
            .field("options", &self.options.iter().map(PluginOption::name).collect::<Vec<_>>())
            .field("subscriptions", &self.subscriptions.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests;
