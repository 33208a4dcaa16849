//! Unix-socket transport for the daemon control socket.
//!
//! The daemon speaks line-delimited JSON-RPC on a Unix domain socket. The
//! helpers here establish a connection with a bounded timeout and move
//! single newline-terminated lines across it.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use socket2::{Domain, SockAddr, Socket, Type};

/// Timeout applied when dialling the control socket.
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects to the daemon control socket at `path`.
pub(crate) fn connect(path: &Path) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, CONNECT_TIMEOUT)?;
    Ok(UnixStream::from(std::os::fd::OwnedFd::from(socket)))
}

/// Writes `line` followed by a newline and flushes the stream.
pub(crate) fn write_line(stream: &mut impl Write, line: &str) -> io::Result<()> {
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()
}

/// Reads one newline-terminated line, returning `None` at end of stream.
pub(crate) fn read_line(stream: impl Read) -> io::Result<Option<String>> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
