//! Waiting for a freshly spawned daemon to accept connections.

use std::process::Child;
use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8Path;

use super::error::LifecycleError;
use super::socket::socket_is_reachable;

pub(super) const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Polls the socket until it is reachable, the child fails, or time runs out.
///
/// A child exiting successfully has daemonised; polling continues on the
/// socket alone.
pub(super) fn wait_for_socket(
    socket: &Utf8Path,
    child: &mut Child,
    timeout: Duration,
) -> Result<(), LifecycleError> {
    let deadline = Instant::now() + timeout;
    let mut daemonised = false;
    while Instant::now() < deadline {
        if !daemonised {
            if let Some(status) = child
                .try_wait()
                .map_err(|source| LifecycleError::MonitorChild { source })?
            {
                if !status.success() {
                    return Err(LifecycleError::StartupFailed {
                        exit_status: status.code(),
                    });
                }
                daemonised = true;
            }
        }
        if socket_is_reachable(socket)? {
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
    Err(LifecycleError::StartupTimeout {
        socket: socket.to_string(),
        timeout_ms: timeout.as_millis(),
    })
}
