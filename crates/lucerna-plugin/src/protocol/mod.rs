//! Wire protocol types for the daemon-facing stdio channel.
//!
//! The daemon drives the plugin with one JSON object per line on stdin and
//! reads one JSON object per line on stdout. No batching, no length
//! prefixes. A line that fails to parse, or parses to something without
//! `method`, `params` and the version tag, is protocol noise and is
//! dropped without a trace; the peer contract is permissive and the engine
//! mirrors that.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version tag carried by every message in either direction.
pub const JSONRPC_VERSION: &str = "2.0";

/// Reserved method name for the capability handshake.
pub const GETMANIFEST: &str = "getmanifest";

/// Reserved method name for the configuration handshake.
pub const INIT: &str = "init";

/// JSON-RPC error code reported when `init` params are malformed.
pub(crate) const INVALID_PARAMS: i64 = -32602;

/// Returns whether `name` is synthesised by the engine itself.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name == GETMANIFEST || name == INIT
}

/// A parsed inbound message from the daemon.
///
/// Presence of `id` is the sole discriminator between a request (response
/// required) and a notification (fire-and-forget).
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Version tag; its presence is checked, its value is not.
    pub jsonrpc: String,
    /// Method or notification topic name.
    pub method: String,
    /// Request parameters, forwarded verbatim to the handler.
    pub params: Value,
    /// Request id; absent for notifications.
    #[serde(default)]
    pub id: Option<String>,
}

impl InboundMessage {
    /// Parses one input line, returning `None` for protocol noise.
    ///
    /// Noise covers malformed JSON and messages missing `method`, `params`
    /// or the version tag. Noise is not an error: the caller discards the
    /// line and moves on.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        serde_json::from_str(line).ok()
    }
}

/// Success response line written back to the daemon.
#[derive(Debug, Serialize)]
struct SuccessResponse<'a> {
    jsonrpc: &'static str,
    result: &'a Value,
    id: &'a str,
}

/// Error response line written back to the daemon.
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    jsonrpc: &'static str,
    error: ErrorBody<'a>,
    id: &'a str,
}

/// The `error` member of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: i64,
    message: &'a str,
}

/// Writes a single-line success response keyed to `id` and flushes.
///
/// The daemon reads responses line by line and expects no buffering
/// delay, so every response is flushed as soon as it is written.
///
/// # Errors
///
/// Returns the underlying I/O error when the output stream fails.
pub fn write_success(writer: &mut impl Write, id: &str, result: &Value) -> io::Result<()> {
    let response = SuccessResponse {
        jsonrpc: JSONRPC_VERSION,
        result,
        id,
    };
    write_line(writer, &serde_json::to_string(&response)?)
}

/// Writes a single-line error response keyed to `id` and flushes.
///
/// # Errors
///
/// Returns the underlying I/O error when the output stream fails.
pub fn write_error(
    writer: &mut impl Write,
    id: &str,
    code: i64,
    message: &str,
) -> io::Result<()> {
    let response = ErrorResponse {
        jsonrpc: JSONRPC_VERSION,
        error: ErrorBody { code, message },
        id,
    };
    write_line(writer, &serde_json::to_string(&response)?)
}

fn write_line(writer: &mut impl Write, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
