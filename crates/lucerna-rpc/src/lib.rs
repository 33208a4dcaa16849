//! JSON-RPC client for the Lightning daemon's control socket.
//!
//! A plugin process talks to the daemon over two channels: the stdio pipe
//! the daemon drives (handled by `lucerna-plugin`), and the daemon's own
//! Unix-domain control socket, which the plugin dials whenever one of its
//! handlers needs to call back into the daemon. This crate implements the
//! second channel: [`DaemonRpc`] dials the socket, exchanges one
//! line-delimited JSON-RPC 2.0 request/response pair per call, and exposes
//! a typed wrapper method for each common daemon command.
//!
//! The client is deliberately stateless beyond the socket path and a
//! request-id counter: a fresh connection is established per call and
//! dropped once the response line has been read.
//!
//! # Example
//!
//! ```rust,no_run
//! use lucerna_rpc::DaemonRpc;
//!
//! let rpc = DaemonRpc::new("/home/user/.lightning/lightning-rpc");
//! let info = rpc.get_info()?;
//! let alias = info.get("alias").and_then(|v| v.as_str());
//! # Ok::<(), lucerna_rpc::RpcError>(())
//! ```

pub mod client;
pub mod error;
mod transport;

pub use self::client::{DaemonRpc, PayOptions, RouteOptions};
pub use self::error::RpcError;
