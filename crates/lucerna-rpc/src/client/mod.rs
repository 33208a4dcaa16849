//! The daemon RPC client and its typed command layer.
//!
//! [`DaemonRpc::call`] is the generic entry point: it marshals one JSON-RPC
//! 2.0 request line onto the control socket and returns the `result` member
//! of the response. The remaining methods are thin per-command wrappers
//! that build the params object for the daemon commands a plugin most often
//! needs, omitting optional arguments the caller left unset.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::RpcError;
use crate::transport;

/// Tracing target for daemon RPC exchanges.
const RPC_TARGET: &str = "lucerna_rpc::client";

/// Protocol version tag carried by every request.
const JSONRPC_VERSION: &str = "2.0";

/// Port used for `connect` when the caller supplies a host without one.
const DEFAULT_PEER_PORT: u16 = 9735;

/// JSON-RPC 2.0 request line sent to the daemon.
#[derive(Debug, Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response line read back from the daemon.
#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

/// JSON-RPC 2.0 error member.
#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Optional arguments for [`DaemonRpc::pay`].
///
/// Groups the payment knobs into a single parameter object so the call
/// site only spells out what it overrides. Unset fields are omitted from
/// the request and the daemon applies its own defaults.
#[derive(Debug, Clone, Default)]
pub struct PayOptions {
    /// Amount in millisatoshi; only valid when the invoice carries none.
    pub msat: Option<u64>,
    /// Unique label recorded against the payment.
    pub label: Option<String>,
    /// Percentage of yearly stuck funds tolerated when routing.
    pub riskfactor: Option<u64>,
    /// Ceiling on fees as a percentage of the amount.
    pub max_fee_percent: Option<f64>,
    /// Seconds to keep retrying new routes.
    pub retry_for_secs: Option<u64>,
    /// Maximum route delay in blocks.
    pub max_delay: Option<u64>,
    /// Amounts below this value in millisatoshi are exempt from the fee cap.
    pub exempt_fee_msat: Option<u64>,
}

/// Optional arguments for [`DaemonRpc::get_route`].
///
/// Same parameter-object convention as [`PayOptions`]: unset fields are
/// omitted and the daemon falls back to its defaults.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Blocks to spare between the route source and the destination.
    pub cltv: Option<u32>,
    /// Route source peer; defaults to this node.
    pub from_id: Option<String>,
    /// Fee distortion applied between source and destination.
    pub fuzz_percent: Option<f64>,
    /// Short channel ids to exclude from the route.
    pub exclude: Vec<String>,
    /// Maximum number of channels in the route.
    pub max_hops: Option<u32>,
}

/// Client for the daemon's Unix-domain control socket.
///
/// Construction only records the socket path; a connection is dialled per
/// call and dropped once the response line has been read. The client is
/// intended to be owned by a single thread (the plugin dispatch loop), so
/// the request-id counter is a plain [`Cell`].
///
/// # Example
///
/// ```rust,no_run
/// use lucerna_rpc::DaemonRpc;
/// use serde_json::json;
///
/// let rpc = DaemonRpc::new("/home/user/.lightning/lightning-rpc");
/// let peers = rpc.list_peers(None, None)?;
/// let raw = rpc.call("listpeers", json!({}))?;
/// # Ok::<(), lucerna_rpc::RpcError>(())
/// ```
#[derive(Debug)]
pub struct DaemonRpc {
    socket_path: PathBuf,
    next_id: Cell<u64>,
}

impl DaemonRpc {
    /// Creates a client bound to the control socket at `socket_path`.
    ///
    /// No connection is attempted until the first call.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            next_id: Cell::new(1),
        }
    }

    /// Returns the control socket path this client dials.
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends `method` to the daemon and returns the response `result`.
    ///
    /// Parameters are normalised before sending: arrays and empty values
    /// pass through verbatim, any other value is wrapped in a
    /// single-element array, matching the daemon connector convention.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Connect`] when the socket cannot be reached,
    /// [`RpcError::Daemon`] when the daemon answers with an `error` member,
    /// and [`RpcError::Io`], [`RpcError::ConnectionClosed`] or
    /// [`RpcError::MalformedResponse`] for transport and decode failures.
    pub fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));

        let request = Request {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params: normalise_params(params),
        };
        let line =
            serde_json::to_string(&request).map_err(|err| RpcError::SerializeRequest {
                method: method.to_owned(),
                source: Arc::new(err),
            })?;

        let mut stream =
            transport::connect(&self.socket_path).map_err(|err| RpcError::Connect {
                path: self.socket_path.clone(),
                source: Arc::new(err),
            })?;

        debug!(target: RPC_TARGET, method, id, "sending daemon request");

        transport::write_line(&mut stream, &line).map_err(|err| RpcError::Io {
            source: Arc::new(err),
        })?;

        let reply = transport::read_line(&stream)
            .map_err(|err| RpcError::Io {
                source: Arc::new(err),
            })?
            .ok_or_else(|| RpcError::ConnectionClosed {
                method: method.to_owned(),
            })?;

        let response: Response =
            serde_json::from_str(reply.trim()).map_err(|err| RpcError::MalformedResponse {
                message: err.to_string(),
                source: Some(Arc::new(err)),
            })?;

        if let Some(error) = response.error {
            return Err(RpcError::Daemon {
                method: method.to_owned(),
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::MalformedResponse {
                message: String::from("response carried neither result nor error"),
                source: None,
            })
    }

    /// Shows summary information about this node.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn get_info(&self) -> Result<Value, RpcError> {
        self.call("getinfo", Value::Object(Map::new()))
    }

    /// Returns feerate estimates in the given `style` (`perkw` or `perkb`).
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn feerates(&self, style: &str) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("style".into(), Value::from(style));
        self.call("feerates", Value::Object(params))
    }

    /// Connects to the peer `id`, optionally at an explicit `host`.
    ///
    /// When `host` is given without a `port`, the standard Lightning port
    /// 9735 is used.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn connect(
        &self,
        id: &str,
        host: Option<&str>,
        port: Option<u16>,
    ) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("id".into(), Value::from(id));
        if let Some(host) = host {
            params.insert("host".into(), Value::from(host));
            params.insert(
                "port".into(),
                Value::from(port.unwrap_or(DEFAULT_PEER_PORT)),
            );
        }
        self.call("connect", Value::Object(params))
    }

    /// Disconnects from the peer `id`; with `force`, even across an open
    /// channel.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn disconnect(&self, id: &str, force: bool) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("id".into(), Value::from(id));
        params.insert("force".into(), Value::from(force));
        self.call("disconnect", Value::Object(params))
    }

    /// Sends peer `id` a ping of `len` bytes asking for `pongbytes` back.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn ping(
        &self,
        id: &str,
        len: Option<u64>,
        pongbytes: Option<u64>,
    ) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("id".into(), Value::from(id));
        if let Some(len) = len {
            params.insert("len".into(), Value::from(len));
        }
        if let Some(pongbytes) = pongbytes {
            params.insert("pongbytes".into(), Value::from(pongbytes));
        }
        self.call("ping", Value::Object(params))
    }

    /// Requests a fresh on-chain address of the given `address_type`
    /// (`bech32` or `p2sh-segwit`).
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn new_addr(&self, address_type: &str) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("addresstype".into(), Value::from(address_type));
        self.call("newaddr", Value::Object(params))
    }

    /// Creates an invoice for `msat` millisatoshi under the unique `label`.
    ///
    /// `expiry_secs`, `fallbacks` and `preimage` are forwarded only when
    /// set; the daemon fills in its defaults otherwise.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn invoice(
        &self,
        msat: u64,
        label: &str,
        description: &str,
        expiry_secs: Option<u64>,
        fallbacks: &[String],
        preimage: Option<&str>,
    ) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("msatoshi".into(), Value::from(msat));
        params.insert("label".into(), Value::from(label));
        params.insert("description".into(), Value::from(description));
        if let Some(expiry_secs) = expiry_secs {
            params.insert("expiry".into(), Value::from(expiry_secs));
        }
        if !fallbacks.is_empty() {
            params.insert("fallbacks".into(), Value::from(fallbacks.to_vec()));
        }
        if let Some(preimage) = preimage {
            params.insert("preimage".into(), Value::from(preimage));
        }
        self.call("invoice", Value::Object(params))
    }

    /// Deletes the unpaid invoice `label` in the given `status`.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn del_invoice(&self, label: &str, status: &str) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("label".into(), Value::from(label));
        params.insert("status".into(), Value::from(status));
        self.call("delinvoice", Value::Object(params))
    }

    /// Lists invoices, or only the one carrying `label` when given.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn list_invoices(&self, label: Option<&str>) -> Result<Value, RpcError> {
        let mut params = Map::new();
        if let Some(label) = label {
            params.insert("label".into(), Value::from(label));
        }
        self.call("listinvoices", Value::Object(params))
    }

    /// Blocks until the invoice `label` is paid or expires.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn wait_invoice(&self, label: &str) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("label".into(), Value::from(label));
        self.call("waitinvoice", Value::Object(params))
    }

    /// Pays the invoice `bolt11`, applying any overrides in `options`.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`]; routing
    /// failures surface as [`RpcError::Daemon`] with the daemon's pay
    /// error codes.
    pub fn pay(&self, bolt11: &str, options: &PayOptions) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("bolt11".into(), Value::from(bolt11));
        if let Some(msat) = options.msat {
            params.insert("msat".into(), Value::from(msat));
        }
        if let Some(label) = options.label.as_deref() {
            params.insert("label".into(), Value::from(label));
        }
        if let Some(riskfactor) = options.riskfactor {
            params.insert("riskfactor".into(), Value::from(riskfactor));
        }
        if let Some(max_fee_percent) = options.max_fee_percent {
            params.insert("maxfeepercent".into(), Value::from(max_fee_percent));
        }
        if let Some(retry_for_secs) = options.retry_for_secs {
            params.insert("retry_for".into(), Value::from(retry_for_secs));
        }
        if let Some(max_delay) = options.max_delay {
            params.insert("maxdelay".into(), Value::from(max_delay));
        }
        if let Some(exempt_fee_msat) = options.exempt_fee_msat {
            params.insert("exemptfee".into(), Value::from(exempt_fee_msat));
        }
        self.call("pay", Value::Object(params))
    }

    /// Lists payment results, or only those for `bolt11` when given.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn list_pays(&self, bolt11: Option<&str>) -> Result<Value, RpcError> {
        let mut params = Map::new();
        if let Some(bolt11) = bolt11 {
            params.insert("bolt11".into(), Value::from(bolt11));
        }
        self.call("listpays", Value::Object(params))
    }

    /// Lists connected peers, optionally filtered to `id`; with `level`
    /// set, peer logs are included.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn list_peers(
        &self,
        id: Option<&str>,
        level: Option<&str>,
    ) -> Result<Value, RpcError> {
        let mut params = Map::new();
        if let Some(id) = id {
            params.insert("id".into(), Value::from(id));
        }
        if let Some(level) = level {
            params.insert("level".into(), Value::from(level));
        }
        self.call("listpeers", Value::Object(params))
    }

    /// Shows the funds available in the internal wallet.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn list_funds(&self) -> Result<Value, RpcError> {
        self.call("listfunds", Value::Object(Map::new()))
    }

    /// Lists known channels, optionally narrowed by `short_channel_id` or
    /// `source` node.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn list_channels(
        &self,
        short_channel_id: Option<&str>,
        source: Option<&str>,
    ) -> Result<Value, RpcError> {
        let mut params = Map::new();
        if let Some(short_channel_id) = short_channel_id {
            params.insert("short_channel_id".into(), Value::from(short_channel_id));
        }
        if let Some(source) = source {
            params.insert("source".into(), Value::from(source));
        }
        self.call("listchannels", Value::Object(params))
    }

    /// Computes a payment route to `id` for `msat` millisatoshi at the
    /// given `riskfactor`, applying any overrides in `options`.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn get_route(
        &self,
        id: &str,
        msat: u64,
        riskfactor: u64,
        options: &RouteOptions,
    ) -> Result<Value, RpcError> {
        let mut params = Map::new();
        params.insert("id".into(), Value::from(id));
        params.insert("msatoshi".into(), Value::from(msat));
        params.insert("riskfactor".into(), Value::from(riskfactor));
        if let Some(cltv) = options.cltv {
            params.insert("cltv".into(), Value::from(cltv));
        }
        if let Some(from_id) = options.from_id.as_deref() {
            params.insert("fromid".into(), Value::from(from_id));
        }
        if let Some(fuzz_percent) = options.fuzz_percent {
            params.insert("fuzzpercent".into(), Value::from(fuzz_percent));
        }
        if !options.exclude.is_empty() {
            params.insert("exclude".into(), Value::from(options.exclude.clone()));
        }
        if let Some(max_hops) = options.max_hops {
            params.insert("maxhops".into(), Value::from(max_hops));
        }
        self.call("getroute", Value::Object(params))
    }

    /// Shuts down the daemon.
    ///
    /// # Errors
    ///
    /// Propagates any [`RpcError`] from [`DaemonRpc::call`].
    pub fn stop(&self) -> Result<Value, RpcError> {
        self.call("stop", Value::Object(Map::new()))
    }
}

/// Normalises call parameters the way the daemon connector expects.
///
/// Arrays and empty values pass through verbatim; any other non-empty
/// value is wrapped in a single-element array.
fn normalise_params(params: Value) -> Value {
    match params {
        Value::Null | Value::Array(_) => params,
        Value::Object(ref map) if map.is_empty() => params,
        other => Value::Array(vec![other]),
    }
}
