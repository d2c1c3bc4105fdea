//! Socket connectivity probing.

use std::io;
use std::os::unix::net::UnixStream;

use camino::Utf8Path;

use super::error::LifecycleError;

/// Checks whether something is listening on the daemon socket.
pub(super) fn socket_is_reachable(socket: &Utf8Path) -> Result<bool, LifecycleError> {
    match UnixStream::connect(socket.as_std_path()) {
        Ok(_) => Ok(true),
        Err(error) if is_socket_available(&error) => Ok(false),
        Err(source) => Err(LifecycleError::SocketProbe {
            socket: socket.to_string(),
            source,
        }),
    }
}

/// Returns `true` for errors meaning no process is listening.
///
/// `ConnectionRefused` covers a stale socket file left behind by a dead
/// daemon, `NotFound` a socket that was never created.
fn is_socket_available(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotFound
            | io::ErrorKind::AddrNotAvailable
    )
}
