//! Error types for daemon lifecycle operations.

use std::io;

use thiserror::Error;

/// Errors raised while making sure the daemon is running.
#[derive(Debug, Error)]
pub(crate) enum LifecycleError {
    #[error("failed to probe daemon socket {socket}: {source}")]
    SocketProbe {
        socket: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn nsgod binary '{binary}': {source}")]
    LaunchDaemon {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("daemon exited before its socket became reachable (status: {exit_status:?})")]
    StartupFailed { exit_status: Option<i32> },
    #[error("timed out waiting for daemon socket {socket} after {timeout_ms} ms")]
    StartupTimeout { socket: String, timeout_ms: u128 },
    #[error("failed to monitor daemon launch: {source}")]
    MonitorChild {
        #[source]
        source: io::Error,
    },
    #[error("failed to write lifecycle output: {0}")]
    Io(#[source] io::Error),
}
