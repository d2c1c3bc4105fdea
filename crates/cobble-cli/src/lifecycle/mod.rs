//! Launching the process manager before `start` talks to it.
//!
//! - [`socket`] probes whether the daemon socket accepts connections.
//! - [`spawning`] starts the daemon binary from the installation.
//! - [`monitoring`] waits for a freshly spawned daemon to come up.

mod error;
mod monitoring;
mod socket;
mod spawning;

use std::time::Duration;

use cobble_config::InstallLayout;

use crate::console::{Console, Stream};

pub(crate) use error::LifecycleError;

use monitoring::wait_for_socket;
use socket::socket_is_reachable;
use spawning::spawn_daemon;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Makes sure the daemon answers on its socket.
pub(crate) trait DaemonLauncher {
    fn ensure_running(
        &self,
        layout: &InstallLayout,
        console: &Console,
    ) -> Result<(), LifecycleError>;
}

/// Launches `<install>/nsgod` when nothing listens on its socket.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemLauncher;

impl DaemonLauncher for SystemLauncher {
    fn ensure_running(
        &self,
        layout: &InstallLayout,
        console: &Console,
    ) -> Result<(), LifecycleError> {
        let socket = layout.daemon_socket();
        if socket_is_reachable(&socket)? {
            tracing::debug!(%socket, "daemon already running");
            return Ok(());
        }
        console
            .line(Stream::Stderr, format_args!("Waiting for nsgod to start..."))
            .map_err(LifecycleError::Io)?;
        let binary = layout.daemon_binary();
        let mut child = spawn_daemon(&binary)?;
        tracing::info!(%binary, pid = child.id(), "spawned daemon");
        wait_for_socket(&socket, &mut child, STARTUP_TIMEOUT)
    }
}
