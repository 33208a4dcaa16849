//! The capability manifest advertised to the daemon.
//!
//! When the daemon opens the handshake with `getmanifest`, the engine
//! answers with a [`Manifest`] derived on demand from the registry: the
//! declared options, the registered methods, and the subscribed
//! notification and hook topics. The daemon's request params are ignored.
//!
//! The reserved handshake methods never appear in `rpcmethods`: the
//! registry refuses to register them, and the engine synthesises their
//! handlers outside the registry entirely.

use serde::Serialize;

use crate::method::RpcMethod;
use crate::options::PluginOption;
use crate::registry::PluginRegistry;

/// Capability document returned for the daemon's `getmanifest` request.
///
/// Serialises to the wire shape the daemon expects:
/// `{options, rpcmethods, subscriptions, hooks}`.
#[derive(Debug, Serialize)]
pub struct Manifest {
    options: Vec<ManifestOption>,
    rpcmethods: Vec<ManifestMethod>,
    subscriptions: Vec<String>,
    hooks: Vec<String>,
}

/// Startup option entry: `{name, default, description, type}`.
#[derive(Debug, Serialize)]
struct ManifestOption {
    name: String,
    default: String,
    description: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Method entry advertised in `rpcmethods`.
#[derive(Debug, Serialize)]
struct ManifestMethod {
    name: String,
    usage: String,
    description: String,
    long_description: String,
}

impl Manifest {
    /// Derives the manifest from the current registry contents.
    ///
    /// Options and methods appear in registration order; subscription and
    /// hook topics in the registry's key order. No side effects, callable
    /// at any time, before or after init.
    pub(crate) fn from_registry(registry: &PluginRegistry) -> Self {
        Self {
            options: registry.options().iter().map(ManifestOption::from).collect(),
            rpcmethods: registry.methods().iter().map(ManifestMethod::from).collect(),
            subscriptions: registry
                .subscription_topics()
                .map(str::to_owned)
                .collect(),
            hooks: registry.hook_topics().map(str::to_owned).collect(),
        }
    }
}

impl From<&PluginOption> for ManifestOption {
    fn from(option: &PluginOption) -> Self {
        Self {
            name: option.name().to_owned(),
            default: option.default_value().to_owned(),
            description: option.description().to_owned(),
            kind: option.kind().as_str().to_owned(),
        }
    }
}

impl From<&RpcMethod> for ManifestMethod {
    fn from(method: &RpcMethod) -> Self {
        Self {
            name: method.name().to_owned(),
            usage: method.usage().to_owned(),
            description: method.description().to_owned(),
            long_description: method.long_description().to_owned(),
        }
    }
}
