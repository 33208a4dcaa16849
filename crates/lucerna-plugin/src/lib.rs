//! Plugin protocol engine for the Lightning daemon.
//!
//! A Lightning plugin is a separate executable the daemon spawns as a
//! child process and drives over the plugin's standard streams with
//! line-delimited JSON-RPC. This crate implements the plugin side of that
//! protocol: the `getmanifest`/`init` handshake, the registries for
//! methods, startup options, notification subscriptions and hooks, and
//! the blocking read-dispatch-write loop that owns the process lifetime.
//!
//! A plugin is assembled with [`Plugin::builder`]. Registrations are
//! frozen at [`PluginBuilder::build`]; the engine then advertises them to
//! the daemon when it asks for the manifest, binds daemon-supplied option
//! values during `init`, and dispatches every subsequent line to the
//! matching handler. Handlers reach back into the daemon through the
//! [`lucerna_rpc::DaemonRpc`] client the engine constructs from the
//! `init` configuration.
//!
//! Everything is single-threaded and synchronous: one line in, at most
//! one line out, and a handler runs to completion before the next line is
//! read. A handler that blocks stalls the plugin's responsiveness to the
//! daemon, including unrelated notifications.
//!
//! # Example
//!
//! ```rust,no_run
//! use lucerna_plugin::{Plugin, PluginError, RpcMethod};
//! use serde_json::json;
//!
//! let mut plugin = Plugin::builder()
//!     .rpc_method(
//!         RpcMethod::new("bye", |_ctx, _params| Ok(json!("Bye bye world!")))
//!             .with_description("launch me so that I can say bye"),
//!     )?
//!     .build();
//! plugin.run_stdio()?;
//! # Ok::<(), PluginError>(())
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod method;
pub mod options;
pub mod protocol;
mod registry;

#[cfg(test)]
mod tests;

pub use self::context::{Context, MethodHandler, NotificationHandler};
pub use self::engine::{Plugin, PluginBuilder};
pub use self::error::PluginError;
pub use self::manifest::Manifest;
pub use self::method::RpcMethod;
pub use self::options::{OptionKind, PluginOption};
