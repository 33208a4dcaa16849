//! The plugin protocol engine: handshake, classification, dispatch.
//!
//! [`Plugin`] owns the registry, the engine state machine and the blocking
//! read-dispatch-write loop that drives the whole process. A plugin is
//! assembled through [`Plugin::builder`], which collects method, option,
//! subscription and hook registrations and then freezes them: after
//! [`PluginBuilder::build`] there is no way to register anything further,
//! so the loop never observes a half-populated registry.
//!
//! The engine has two states. It starts uninitialised; the daemon's `init`
//! request constructs the outbound [`DaemonRpc`] client and binds option
//! values, and the engine stays initialised for the rest of the process
//! lifetime. The state is carried by the `Option` around the client
//! itself, so a handler that needs the daemon before init gets a typed
//! error instead of a dangling connection.
//!
//! The reserved `getmanifest` and `init` methods are synthesised here and
//! never pass through the user registry.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use lucerna_rpc::DaemonRpc;

use crate::context::Context;
use crate::error::PluginError;
use crate::manifest::Manifest;
use crate::method::RpcMethod;
use crate::options::PluginOption;
use crate::protocol::{self, InboundMessage};
use crate::registry::PluginRegistry;

/// Tracing target for dispatch-loop events.
const ENGINE_TARGET: &str = "lucerna_plugin::engine";

/// Collects registrations before the engine is constructed.
///
/// Obtained from [`Plugin::builder`]. Registration methods that can fail
/// (duplicate or reserved names) return `Result<Self, _>` so declarations
/// chain with `?`; the infallible ones return `Self` directly.
///
/// # Example
///
/// ```
/// use lucerna_plugin::{OptionKind, Plugin, PluginError, PluginOption, RpcMethod};
/// use serde_json::json;
///
/// let plugin = Plugin::builder()
///     .option(PluginOption::new("greeting", "hi", "greeting text", OptionKind::String))?
///     .rpc_method(RpcMethod::new("bye", |_ctx, _params| Ok(json!("Bye bye world!"))))?
///     .subscribe("connect", |_ctx, _params| {})
///     .hook("peer_connected", |_ctx, _params| Ok(json!({"result": "continue"})))
///     .build();
/// assert!(!plugin.is_initialised());
/// # Ok::<(), PluginError>(())
/// ```
#[derive(Debug, Default)]
pub struct PluginBuilder {
    registry: PluginRegistry,
}

impl PluginBuilder {
    /// Registers an RPC method the daemon will forward calls for.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateMethod`],
    /// [`PluginError::ReservedName`] or [`PluginError::EmptyMethodName`]
    /// when the method's name is unusable.
    pub fn rpc_method(mut self, method: RpcMethod) -> Result<Self, PluginError> {
        self.registry.register_method(method)?;
        Ok(self)
    }

    /// Declares a startup option advertised to the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateOption`] when an option with the
    /// same name is already declared.
    pub fn option(mut self, option: PluginOption) -> Result<Self, PluginError> {
        self.registry.register_option(option)?;
        Ok(self)
    }

    /// Subscribes to a daemon notification topic.
    ///
    /// Re-subscribing to the same topic replaces the previous handler.
    #[must_use]
    pub fn subscribe(
        mut self,
        topic: impl Into<String>,
        handler: impl Fn(&Context<'_>, &Value) + 'static,
    ) -> Self {
        self.registry.subscribe(topic, Box::new(handler));
        self
    }

    /// Subscribes to a daemon hook topic.
    ///
    /// The handler's return value is sent back as the hook response and
    /// steers the daemon's behaviour. Re-subscribing to the same topic
    /// replaces the previous handler.
    #[must_use]
    pub fn hook(
        mut self,
        topic: impl Into<String>,
        handler: impl Fn(&Context<'_>, &Value) -> Result<Value, PluginError> + 'static,
    ) -> Self {
        self.registry.hook(topic, Box::new(handler));
        self
    }

    /// Freezes the registrations and constructs the engine.
    #[must_use]
    pub fn build(self) -> Plugin {
        Plugin {
            registry: self.registry,
            rpc: None,
        }
    }
}

/// The protocol engine driving one plugin process.
///
/// Created through [`Plugin::builder`]; [`Plugin::run`] then owns the
/// process lifetime, reading one line at a time from the daemon and
/// writing at most one response line per request. Everything is
/// single-threaded and synchronous: a handler runs to completion before
/// the next line is read.
pub struct Plugin {
    registry: PluginRegistry,
    // Doubles as the engine state: None until init has been processed.
    rpc: Option<DaemonRpc>,
}

impl Plugin {
    /// Starts collecting registrations for a new plugin.
    #[must_use]
    pub fn builder() -> PluginBuilder {
        PluginBuilder::default()
    }

    /// Returns whether the daemon's `init` request has been processed.
    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.rpc.is_some()
    }

    /// Returns the outbound daemon client.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotInitialised`] before the daemon's `init`
    /// request has been processed.
    pub fn rpc(&self) -> Result<&DaemonRpc, PluginError> {
        self.rpc.as_ref().ok_or(PluginError::NotInitialised)
    }

    /// Derives the capability manifest advertised to the daemon from the
    /// current registrations.
    ///
    /// No side effects; callable at any time, before or after init. The
    /// dispatch loop serves exactly this document for `getmanifest`.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest::from_registry(&self.registry)
    }

    /// Returns the daemon-supplied value of the named option.
    ///
    /// Yields `None` before init, for unknown names, and for options the
    /// daemon sent no value for.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&Value> {
        self.registry
            .options()
            .iter()
            .find(|option| option.name() == name)
            .and_then(PluginOption::value)
    }

    /// Runs the dispatch loop over the process's standard streams.
    ///
    /// Convenience wrapper around [`Plugin::run`]; this is what a plugin
    /// binary calls after assembling the engine. Returns only when the
    /// daemon closes the plugin's stdin.
    ///
    /// # Errors
    ///
    /// Propagates any fatal fault from [`Plugin::run`].
    pub fn run_stdio(&mut self) -> Result<(), PluginError> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run(stdin.lock(), &mut stdout.lock())
    }

    /// Runs the dispatch loop until `reader` reaches end of stream.
    ///
    /// One iteration per input line: parse, classify, invoke, and write
    /// exactly one response line for requests (none for notifications).
    /// Lines that fail to parse or lack the message envelope are dropped
    /// silently, as are requests matching no registered name. A handler
    /// failure aborts only its own iteration; it is logged and the loop
    /// moves to the next line. End of stream terminates cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] when reading from `reader` or writing a
    /// response to `writer` fails. These are the only faults that stop the
    /// loop.
    pub fn run(
        &mut self,
        reader: impl BufRead,
        writer: &mut impl Write,
    ) -> Result<(), PluginError> {
        for line in reader.lines() {
            let line = line.map_err(|err| PluginError::Io {
                source: Arc::new(err),
            })?;
            self.dispatch_line(&line, writer)?;
        }
        debug!(target: ENGINE_TARGET, "daemon closed the input stream, shutting down");
        Ok(())
    }

    /// Classifies and dispatches one input line.
    fn dispatch_line(
        &mut self,
        line: &str,
        writer: &mut impl Write,
    ) -> Result<(), PluginError> {
        let Some(message) = InboundMessage::parse(line) else {
            return Ok(());
        };
        match message.id {
            None => {
                self.dispatch_notification(&message.method, &message.params);
                Ok(())
            }
            Some(ref id) => self.dispatch_request(&message.method, &message.params, id, writer),
        }
    }

    /// Invokes the subscription handler for a notification, if any.
    ///
    /// Unknown topics are dropped; notifications never produce output.
    fn dispatch_notification(&self, topic: &str, params: &Value) {
        if let Some(handler) = self.registry.subscription(topic) {
            debug!(target: ENGINE_TARGET, topic, "dispatching notification");
            let ctx = Context::new(self.rpc.as_ref(), self.registry.options());
            handler(&ctx, params);
        }
    }

    /// Resolves a request against hooks, the reserved handshake methods,
    /// and the user method registry, in that order.
    ///
    /// A request matching none of them is dropped without a response,
    /// mirroring the daemon's own permissive peer behaviour.
    fn dispatch_request(
        &mut self,
        method: &str,
        params: &Value,
        id: &str,
        writer: &mut impl Write,
    ) -> Result<(), PluginError> {
        if let Some(handler) = self.registry.hook_handler(method) {
            debug!(target: ENGINE_TARGET, topic = method, id, "dispatching hook");
            let ctx = Context::new(self.rpc.as_ref(), self.registry.options());
            return match handler(&ctx, params) {
                Ok(result) => write_success(writer, id, &result),
                Err(err) => {
                    warn!(
                        target: ENGINE_TARGET,
                        topic = method,
                        id,
                        %err,
                        "hook handler failed, dropping request"
                    );
                    Ok(())
                }
            };
        }

        if method == protocol::GETMANIFEST {
            debug!(target: ENGINE_TARGET, id, "serving manifest");
            let value = serde_json::to_value(self.manifest()).map_err(|err| PluginError::Io {
                source: Arc::new(err.into()),
            })?;
            return write_success(writer, id, &value);
        }

        if method == protocol::INIT {
            return match self.handle_init(params) {
                Ok(result) => {
                    debug!(target: ENGINE_TARGET, id, "init complete");
                    write_success(writer, id, &result)
                }
                Err(err) => {
                    warn!(target: ENGINE_TARGET, id, %err, "init rejected");
                    write_error(writer, id, protocol::INVALID_PARAMS, &err.to_string())
                }
            };
        }

        if let Some(descriptor) = self.registry.method(method) {
            debug!(target: ENGINE_TARGET, method, id, "dispatching method call");
            let ctx = Context::new(self.rpc.as_ref(), self.registry.options());
            return match descriptor.invoke(&ctx, params) {
                Ok(result) => write_success(writer, id, &result),
                Err(err) => {
                    warn!(
                        target: ENGINE_TARGET,
                        method,
                        id,
                        %err,
                        "method handler failed, dropping request"
                    );
                    Ok(())
                }
            };
        }

        Ok(())
    }

    /// Consumes the daemon's runtime configuration.
    ///
    /// Builds the control socket path from `lightning-dir` and `rpc-file`,
    /// constructs the outbound client, and binds any supplied option
    /// values to their descriptors. Options the daemon sent no value for
    /// stay unset; the daemon applies declared defaults before sending
    /// init, so the engine performs no substitution of its own.
    fn handle_init(&mut self, params: &Value) -> Result<Value, PluginError> {
        let config = params
            .get("configuration")
            .ok_or_else(|| PluginError::Configuration {
                message: String::from("missing 'configuration' object"),
            })?;
        let lightning_dir = require_string_field(config, "lightning-dir")?;
        let rpc_file = require_string_field(config, "rpc-file")?;
        let socket_path = Path::new(lightning_dir).join(rpc_file);

        if let Some(supplied) = params.get("options").and_then(Value::as_object) {
            for option in self.registry.options_mut() {
                if let Some(value) = supplied.get(option.name()) {
                    option.bind(value.clone());
                }
            }
        }

        self.rpc = Some(DaemonRpc::new(socket_path));
        Ok(Value::Object(Map::new()))
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("registry", &self.registry)
            .field("initialised", &self.is_initialised())
            .finish()
    }
}

/// Extracts a mandatory string field from the init configuration.
fn require_string_field<'a>(config: &'a Value, field: &str) -> Result<&'a str, PluginError> {
    config
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| PluginError::Configuration {
            message: format!("missing or non-string '{field}'"),
        })
}

/// Writes a success response, promoting stream failure to a fatal fault.
fn write_success(writer: &mut impl Write, id: &str, result: &Value) -> Result<(), PluginError> {
    protocol::write_success(writer, id, result).map_err(|err| PluginError::Io {
        source: Arc::new(err),
    })
}

/// Writes an error response, promoting stream failure to a fatal fault.
fn write_error(
    writer: &mut impl Write,
    id: &str,
    code: i64,
    message: &str,
) -> Result<(), PluginError> {
    protocol::write_error(writer, id, code, message).map_err(|err| PluginError::Io {
        source: Arc::new(err),
    })
}
