//! Domain errors raised by daemon RPC calls.
//!
//! All errors use `thiserror`-derived enums with structured context so
//! callers can branch on the failure programmatically. I/O and JSON error
//! sources are wrapped in `Arc` so the variants stay cloneable.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from calls over the daemon control socket.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// The control socket could not be reached.
    #[error("failed to connect to daemon socket '{path}': {source}")]
    Connect {
        /// Socket path that was dialled.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// An I/O error occurred while exchanging the request and response.
    #[error("I/O error on daemon socket: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The request could not be serialised to JSON.
    #[error("failed to serialise request for '{method}': {source}")]
    SerializeRequest {
        /// Method the request was built for.
        method: String,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The daemon closed the connection before answering.
    #[error("daemon closed the connection before responding to '{method}'")]
    ConnectionClosed {
        /// Method that was in flight.
        method: String,
    },

    /// The daemon answered with something that is not a JSON-RPC response.
    #[error("daemon sent a malformed response: {message}")]
    MalformedResponse {
        /// Description of the parse failure.
        message: String,
        /// Optional underlying JSON error.
        #[source]
        source: Option<Arc<serde_json::Error>>,
    },

    /// The daemon reported an RPC-layer failure for the call.
    #[error("daemon returned error {code} for '{method}': {message}")]
    Daemon {
        /// Method the failure relates to.
        method: String,
        /// JSON-RPC error code reported by the daemon.
        code: i64,
        /// Human-readable message reported by the daemon.
        message: String,
    },
}
